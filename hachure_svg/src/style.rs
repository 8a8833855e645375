// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The graphics state written into style groups.

use core::fmt::Write as _;

use hachure_device::{ColorIndex, LineCap, LineJoin};

use crate::format::{fmt_num, num_list, paint_attr, stroke_cap_svg, stroke_join_svg};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StyleState {
    pub(crate) fill: Option<ColorIndex>,
    pub(crate) stroke: Option<ColorIndex>,
    pub(crate) line_width: f64,
    pub(crate) cap: LineCap,
    pub(crate) join: LineJoin,
    pub(crate) miter_limit: f64,
    pub(crate) dash: Vec<f64>,
    pub(crate) dash_offset: f64,
    /// Changed since the last style group was written.
    pub(crate) dirty: bool,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            line_width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            dirty: false,
        }
    }
}

/// Stores `value` in `slot`, marking the state dirty if it changed.
pub(crate) fn update<T: PartialEq>(slot: &mut T, value: T, dirty: &mut bool) {
    if *slot != value {
        *slot = value;
        *dirty = true;
    }
}

impl StyleState {
    /// Attributes of a style group. Only values that differ from the SVG
    /// defaults are written, apart from the paints which are always present.
    pub(crate) fn group_attrs(&self) -> String {
        let mut attrs = format!(
            " fill='{}' stroke='{}'",
            paint_attr(self.fill),
            paint_attr(self.stroke)
        );
        if self.line_width != 1.0 {
            let _ = write!(attrs, " stroke-width='{}'", fmt_num(self.line_width));
        }
        if self.cap != LineCap::Butt {
            let _ = write!(attrs, " stroke-linecap='{}'", stroke_cap_svg(self.cap));
        }
        if self.join != LineJoin::Miter {
            let _ = write!(attrs, " stroke-linejoin='{}'", stroke_join_svg(self.join));
        }
        if self.miter_limit != 4.0 {
            let _ = write!(attrs, " stroke-miterlimit='{}'", fmt_num(self.miter_limit));
        }
        if self.dash.iter().any(|len| *len != 0.0) {
            let _ = write!(attrs, " stroke-dasharray='{}'", num_list(&self.dash));
            if self.dash_offset != 0.0 {
                let _ = write!(attrs, " stroke-dashoffset='{}'", fmt_num(self.dash_offset));
            }
        }
        attrs
    }
}
