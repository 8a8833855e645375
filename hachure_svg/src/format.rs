// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number, color and path formatting for SVG attributes.

use core::fmt::Write as _;

use hachure_device::{ColorIndex, LineCap, LineJoin};
use kurbo::{Affine, BezPath, PathEl, QuadBez};

/// Formats a coordinate: integers print without a fraction, everything else
/// is rounded to four decimals with trailing zeros trimmed.
pub(crate) fn fmt_num(v: f64) -> String {
    fmt_fixed(v, 4)
}

/// Like [`fmt_num`] with six decimals, for matrix coefficients and scales.
pub(crate) fn fmt_coeff(v: f64) -> String {
    fmt_fixed(v, 6)
}

fn fmt_fixed(v: f64, decimals: i32) -> String {
    if !v.is_finite() {
        // Non-finite values would make the attribute unparsable.
        return "0".to_owned();
    }
    let scale = 10_f64.powi(decimals);
    let rounded = (v * scale).round() / scale;
    if !rounded.is_finite() {
        // Too large to scale; such values have no fraction left to round.
        return format!("{v}");
    }
    if rounded == 0.0 {
        return "0".to_owned();
    }
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "integral values below 1e15 fit in i64"
        )]
        let i = rounded as i64;
        return format!("{i}");
    }
    #[allow(clippy::cast_sign_loss, reason = "decimals is a small positive constant")]
    let mut s = format!("{rounded:.prec$}", prec = decimals as usize);
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// `#rrggbb` for a color, `none` for no paint.
pub(crate) fn paint_attr(color: Option<ColorIndex>) -> String {
    match color {
        Some(index) => index.to_string(),
        None => "none".to_owned(),
    }
}

pub(crate) fn affine_to_svg_matrix(xf: Affine) -> String {
    // kurbo::Affine stores [a, b, c, d, e, f] corresponding to:
    // [ a c e ]
    // [ b d f ]
    // [ 0 0 1 ]
    let c = xf.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_coeff(c[0]),
        fmt_coeff(c[1]),
        fmt_coeff(c[2]),
        fmt_coeff(c[3]),
        fmt_num(c[4]),
        fmt_num(c[5]),
    )
}

pub(crate) fn stroke_cap_svg(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Round => "round",
        LineCap::Square => "square",
        // Triangle and unknown caps have no SVG equivalent.
        LineCap::Butt | LineCap::Triangle | LineCap::Unknown => "butt",
    }
}

pub(crate) fn stroke_join_svg(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Round => "round",
        LineJoin::Bevel => "bevel",
        LineJoin::Miter | LineJoin::None | LineJoin::Triangle | LineJoin::Unknown => "miter",
    }
}

/// A comma separated number list, as used by `stroke-dasharray`.
pub(crate) fn num_list(values: &[f64]) -> String {
    let mut out = String::new();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&fmt_num(*v));
    }
    out
}

/// Path data in the same command forms the path hooks stream: `M`, `L`,
/// `C` and `z`, with quadratics raised to cubics.
pub(crate) fn bez_path_to_svg_d(path: &BezPath) -> String {
    let mut d = String::new();
    let mut current = kurbo::Point::ZERO;
    let mut start = current;
    for el in path.elements() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match *el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
                write!(d, "M{},{}", fmt_num(p.x), fmt_num(p.y))
            }
            PathEl::LineTo(p) => {
                current = p;
                write!(d, "L{},{}", fmt_num(p.x), fmt_num(p.y))
            }
            PathEl::QuadTo(p1, p2) => {
                let cubic = QuadBez::new(current, p1, p2).raise();
                current = p2;
                write!(
                    d,
                    "C{},{} {},{} {},{}",
                    fmt_num(cubic.p1.x),
                    fmt_num(cubic.p1.y),
                    fmt_num(cubic.p2.x),
                    fmt_num(cubic.p2.y),
                    fmt_num(p2.x),
                    fmt_num(p2.y)
                )
            }
            PathEl::CurveTo(p1, p2, p3) => {
                current = p3;
                write!(
                    d,
                    "C{},{} {},{} {},{}",
                    fmt_num(p1.x),
                    fmt_num(p1.y),
                    fmt_num(p2.x),
                    fmt_num(p2.y),
                    fmt_num(p3.x),
                    fmt_num(p3.y)
                )
            }
            PathEl::ClosePath => {
                current = start;
                d.write_str("z")
            }
        };
    }
    d
}
