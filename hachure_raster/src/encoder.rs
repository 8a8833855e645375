// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scanline PNG encoding of device pixel rows.

use std::fmt;

use hachure_device::IndexedBase;
use png::{BitDepth, ColorType, PixelDimensions, Unit};

use crate::RasterError;

const INCHES_PER_METER: f64 = 39.370_078_740_157_48;

/// Layout of the rows handed to [`PngEncoder::write_row`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelDepth {
    /// One bit per pixel, `1` means ink (black).
    Mono1,
    /// One gray byte per pixel.
    Gray8,
    /// One palette index byte per pixel.
    Indexed8,
    /// RGB, one byte per channel.
    Rgb24,
    /// RGB plus an inverted alpha byte: `0` is opaque.
    Rgba32,
    /// RGB, two big-endian bytes per channel.
    Rgb48,
}

impl PixelDepth {
    /// Picks the layout for a device depth in bits per pixel. An 8-bit depth
    /// is indexed when a palette accompanies it.
    pub fn from_bits(bits: u8, indexed: bool) -> Result<Self, RasterError> {
        Ok(match bits {
            1 => Self::Mono1,
            8 if indexed => Self::Indexed8,
            8 => Self::Gray8,
            24 => Self::Rgb24,
            32 => Self::Rgba32,
            48 => Self::Rgb48,
            other => return Err(RasterError::UnsupportedDepth(other)),
        })
    }

    /// Bits per pixel.
    pub fn bits(self) -> u8 {
        match self {
            Self::Mono1 => 1,
            Self::Gray8 | Self::Indexed8 => 8,
            Self::Rgb24 => 24,
            Self::Rgba32 => 32,
            Self::Rgb48 => 48,
        }
    }

    /// Bytes in one row of `width` pixels.
    pub fn row_bytes(self, width: u32) -> usize {
        (width as usize * usize::from(self.bits())).div_ceil(8)
    }

    fn png_format(self) -> (ColorType, BitDepth) {
        match self {
            Self::Mono1 => (ColorType::Grayscale, BitDepth::One),
            Self::Gray8 => (ColorType::Grayscale, BitDepth::Eight),
            Self::Indexed8 => (ColorType::Indexed, BitDepth::Eight),
            Self::Rgb24 => (ColorType::Rgb, BitDepth::Eight),
            Self::Rgba32 => (ColorType::Rgba, BitDepth::Eight),
            Self::Rgb48 => (ColorType::Rgb, BitDepth::Sixteen),
        }
    }
}

/// RGB palette entries for an indexed image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    rgb: Vec<u8>,
}

impl Palette {
    /// Builds a palette from an indexed color space lookup table.
    ///
    /// Gray entries are replicated into RGB, RGB entries are copied, and RGBA
    /// entries are composited against white.
    pub fn from_table(base: IndexedBase, hival: u8, table: &[u8]) -> Result<Self, RasterError> {
        let entries = usize::from(hival) + 1;
        let stride = base.components();
        let Some(table) = table.get(..entries * stride) else {
            return Err(RasterError::Palette {
                len: table.len(),
                entries,
            });
        };
        let mut rgb = Vec::with_capacity(entries * 3);
        for entry in table.chunks_exact(stride) {
            match *entry {
                [gray] => rgb.extend_from_slice(&[gray, gray, gray]),
                [r, g, b] => rgb.extend_from_slice(&[r, g, b]),
                [r, g, b, a] => rgb.extend_from_slice(&[
                    over_white(r, a),
                    over_white(g, a),
                    over_white(b, a),
                ]),
                _ => unreachable!("chunks_exact yields {stride}-byte entries"),
            }
        }
        Ok(Self { rgb })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.rgb.len() / 3
    }

    /// Returns `true` when the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }

    /// The RGB triple of entry `index`.
    pub fn get(&self, index: usize) -> Option<[u8; 3]> {
        let entry = self.rgb.get(index * 3..index * 3 + 3)?;
        Some([entry[0], entry[1], entry[2]])
    }

    /// The index of the entry closest to white, used to pad unfinished
    /// images. Ties go to the lowest index.
    pub fn lightest(&self) -> u8 {
        let mut best = (0, 0);
        for index in 0..self.len().min(256) {
            let Some([r, g, b]) = self.get(index) else {
                break;
            };
            let sum = u32::from(r) + u32::from(g) + u32::from(b);
            if sum > best.1 {
                best = (index, sum);
            }
        }
        u8::try_from(best.0).unwrap_or(u8::MAX)
    }
}

/// Composites a straight-alpha channel value over white.
#[allow(clippy::cast_possible_truncation, reason = "the blend stays within 0..=255")]
pub(crate) fn over_white(c: u8, a: u8) -> u8 {
    let (c, a) = (u32::from(c), u32::from(a));
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Encodes rows of device pixels into a PNG file.
///
/// Rows are written top to bottom with [`PngEncoder::write_row`];
/// [`PngEncoder::close`] returns the finished file. The device conventions
/// for 1-bit (ink is `1`) and 32-bit (alpha is inverted) rows are undone
/// here so the PNG holds ordinary gray and RGBA samples.
pub struct PngEncoder {
    width: u32,
    height: u32,
    depth: PixelDepth,
    resolution: [f64; 2],
    palette: Option<Palette>,
    data: Vec<u8>,
    rows_written: u32,
}

impl fmt::Debug for PngEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PngEncoder")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .field("resolution", &self.resolution)
            .field("palette", &self.palette.as_ref().map(Palette::len))
            .field("rows_written", &self.rows_written)
            .finish_non_exhaustive()
    }
}

impl PngEncoder {
    /// Starts an image. `bits` is the device depth in bits per pixel and
    /// `resolution` is in dots per inch.
    pub fn open(
        width: u32,
        height: u32,
        bits: u8,
        resolution: [f64; 2],
        palette: Option<Palette>,
    ) -> Result<Self, RasterError> {
        let depth = PixelDepth::from_bits(bits, palette.is_some())?;
        if width == 0 || height == 0 {
            return Err(RasterError::Empty { width, height });
        }
        let size = depth
            .row_bytes(width)
            .checked_mul(height as usize)
            .ok_or(RasterError::OutOfMemory(usize::MAX))?;
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| RasterError::OutOfMemory(size))?;
        Ok(Self {
            width,
            height,
            depth,
            resolution,
            palette: palette.filter(|_| depth == PixelDepth::Indexed8),
            data,
            rows_written: 0,
        })
    }

    /// The row layout this encoder expects.
    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Bytes expected by each [`PngEncoder::write_row`] call.
    pub fn row_bytes(&self) -> usize {
        self.depth.row_bytes(self.width)
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> u32 {
        self.rows_written
    }

    /// Appends the next row.
    pub fn write_row(&mut self, row: &[u8]) -> Result<(), RasterError> {
        let expected = self.row_bytes();
        if row.len() != expected {
            return Err(RasterError::RowLength {
                actual: row.len(),
                expected,
            });
        }
        if self.rows_written >= self.height {
            return Err(RasterError::TooManyRows(self.height));
        }
        let start = self.data.len();
        self.data.extend_from_slice(row);
        let written = &mut self.data[start..];
        match self.depth {
            PixelDepth::Mono1 => written.iter_mut().for_each(|b| *b = !*b),
            PixelDepth::Rgba32 => written
                .chunks_exact_mut(4)
                .for_each(|px| px[3] = 255 - px[3]),
            _ => {}
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Finishes the image and returns the PNG file.
    pub fn close(self) -> Result<Vec<u8>, RasterError> {
        if self.rows_written != self.height {
            return Err(RasterError::Incomplete {
                written: self.rows_written,
                height: self.height,
            });
        }
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            let (color, bit_depth) = self.depth.png_format();
            encoder.set_color(color);
            encoder.set_depth(bit_depth);
            if let Some(palette) = &self.palette {
                encoder.set_palette(palette.rgb.as_slice());
            }
            encoder.set_pixel_dims(Some(PixelDimensions {
                xppu: dots_per_meter(self.resolution[0]),
                yppu: dots_per_meter(self.resolution[1]),
                unit: Unit::Meter,
            }));
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
            writer.finish()?;
        }
        log::trace!(
            "encoded {}x{} {:?} image into {} bytes",
            self.width,
            self.height,
            self.depth,
            out.len()
        );
        Ok(out)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "device resolutions are small positive numbers"
)]
fn dots_per_meter(dpi: f64) -> u32 {
    (dpi * INCHES_PER_METER).round().max(0.0) as u32
}
