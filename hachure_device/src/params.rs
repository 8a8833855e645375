// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device parameters and their get/put negotiation.

use std::collections::BTreeMap;

use kurbo::Rect;

use crate::{DeviceError, DeviceResult};

/// A typed parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Real number.
    Float(f64),
    /// Array of numbers.
    FloatArray(Vec<f64>),
    /// String.
    String(String),
    /// Explicit null.
    Null,
}

/// An ordered set of named parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    entries: BTreeMap<String, ParamValue>,
}

impl ParamList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.entries.insert(key.into(), value)
    }

    /// Builder form of [`ParamList::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.set(key, value);
        self
    }

    /// Looks up `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parameter names understood by [`VectorParams`].
pub mod keys {
    /// Output file name. `%d` is replaced by the page number.
    pub const OUTPUT_FILE: &str = "OutputFile";
    /// Device resolution in dots per inch, `[x, y]`.
    pub const HW_RESOLUTION: &str = "HWResolution";
    /// Page size in points, `[width, height]`.
    pub const PAGE_SIZE: &str = "PageSize";
    /// Bits per pixel of raster fallback images.
    pub const RASTER_DEPTH: &str = "RasterDepth";
}

/// Parameters shared by vector output devices.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorParams {
    /// Output file name template. `None` keeps documents in memory.
    pub output_file: Option<String>,
    /// Resolution in dots per inch.
    pub hw_resolution: [f64; 2],
    /// Page size in points.
    pub media_size: [f64; 2],
    /// Bits per pixel of raster fallback images: 1, 8, 24 or 32.
    pub raster_depth: u8,
}

impl Default for VectorParams {
    fn default() -> Self {
        Self {
            output_file: None,
            hw_resolution: [300.0, 300.0],
            media_size: [612.0, 792.0],
            raster_depth: 32,
        }
    }
}

const RASTER_DEPTHS: [u8; 4] = [1, 8, 24, 32];

impl VectorParams {
    /// Sets the output file template.
    #[must_use]
    pub fn with_output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = Some(name.into());
        self
    }

    /// Sets the resolution.
    #[must_use]
    pub fn with_resolution(mut self, x_dpi: f64, y_dpi: f64) -> Self {
        self.hw_resolution = [x_dpi, y_dpi];
        self
    }

    /// Sets the page size in points.
    #[must_use]
    pub fn with_media_size(mut self, width: f64, height: f64) -> Self {
        self.media_size = [width, height];
        self
    }

    /// Sets the raster fallback depth.
    #[must_use]
    pub fn with_raster_depth(mut self, depth: u8) -> Self {
        self.raster_depth = depth;
        self
    }

    /// Page width in device pixels.
    pub fn width_px(&self) -> u32 {
        to_pixels(self.media_size[0], self.hw_resolution[0])
    }

    /// Page height in device pixels.
    pub fn height_px(&self) -> u32 {
        to_pixels(self.media_size[1], self.hw_resolution[1])
    }

    /// The page in device pixels.
    pub fn page_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width_px()), f64::from(self.height_px()))
    }

    /// Returns `true` when each page goes to its own file.
    pub fn separate_pages(&self) -> bool {
        self.output_file
            .as_deref()
            .is_some_and(|name| page_field(name).is_some())
    }

    /// The file name for `page` (1-based), or `None` for in-memory output.
    pub fn output_file_for_page(&self, page: u32) -> Option<String> {
        self.output_file
            .as_deref()
            .map(|name| format_page_name(name, page))
    }

    /// Reports the current values into `list`.
    pub fn get_params(&self, list: &mut ParamList) {
        list.set(
            keys::OUTPUT_FILE,
            ParamValue::String(self.output_file.clone().unwrap_or_default()),
        );
        list.set(
            keys::HW_RESOLUTION,
            ParamValue::FloatArray(self.hw_resolution.to_vec()),
        );
        list.set(
            keys::PAGE_SIZE,
            ParamValue::FloatArray(self.media_size.to_vec()),
        );
        list.set(
            keys::RASTER_DEPTH,
            ParamValue::Int(i64::from(self.raster_depth)),
        );
    }

    /// Applies the values in `list`. Every recognized value is checked before
    /// any of them is applied, so a failed call leaves `self` unchanged.
    /// Unrecognized keys are ignored.
    pub fn put_params(&mut self, list: &ParamList) -> DeviceResult<()> {
        let mut next = self.clone();
        if let Some(value) = list.get(keys::OUTPUT_FILE) {
            next.output_file = match value {
                ParamValue::String(name) if name.is_empty() => None,
                ParamValue::String(name) => Some(name.clone()),
                ParamValue::Null => None,
                _ => return Err(type_check(keys::OUTPUT_FILE, "a string")),
            };
        }
        if let Some(value) = list.get(keys::HW_RESOLUTION) {
            next.hw_resolution = positive_pair(keys::HW_RESOLUTION, value)?;
        }
        if let Some(value) = list.get(keys::PAGE_SIZE) {
            next.media_size = positive_pair(keys::PAGE_SIZE, value)?;
        }
        if let Some(value) = list.get(keys::RASTER_DEPTH) {
            let ParamValue::Int(depth) = value else {
                return Err(type_check(keys::RASTER_DEPTH, "an integer"));
            };
            next.raster_depth = u8::try_from(*depth)
                .ok()
                .filter(|d| RASTER_DEPTHS.contains(d))
                .ok_or_else(|| DeviceError::range_check(format!("raster depth {depth}")))?;
        }
        if next != *self {
            log::debug!("vector params updated: {next:?}");
        }
        *self = next;
        Ok(())
    }
}

fn type_check(key: &str, expected: &'static str) -> DeviceError {
    DeviceError::TypeCheck {
        key: key.to_owned(),
        expected,
    }
}

fn positive_pair(key: &str, value: &ParamValue) -> DeviceResult<[f64; 2]> {
    let ParamValue::FloatArray(values) = value else {
        return Err(type_check(key, "an array of two numbers"));
    };
    match values.as_slice() {
        [x, y] if x.is_finite() && y.is_finite() && *x > 0.0 && *y > 0.0 => Ok([*x, *y]),
        [_, _] => Err(DeviceError::range_check(format!("{key} {values:?}"))),
        _ => Err(type_check(key, "an array of two numbers")),
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "page sizes are positive and far below u32::MAX pixels"
)]
fn to_pixels(points: f64, dpi: f64) -> u32 {
    (points * dpi / 72.0).round().max(0.0) as u32
}

/// Finds the `%d` / `%0Nd` field in a file name template, returning its byte
/// range and zero-padded width.
fn page_field(template: &str) -> Option<(usize, usize, usize)> {
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if bytes.get(i + 1) == Some(&b'%') {
                i += 2;
                continue;
            }
            let digits = bytes[i + 1..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count();
            if bytes.get(i + 1 + digits) == Some(&b'd') {
                let width = template[i + 1..i + 1 + digits].parse().unwrap_or(0);
                return Some((i, i + 2 + digits, width));
            }
        }
        i += 1;
    }
    None
}

fn format_page_name(template: &str, page: u32) -> String {
    let Some((start, end, width)) = page_field(template) else {
        return template.replace("%%", "%");
    };
    format!(
        "{}{page:0width$}{}",
        template[..start].replace("%%", "%"),
        template[end..].replace("%%", "%"),
    )
}
