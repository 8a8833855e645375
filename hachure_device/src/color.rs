// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing colors and their classification.
//!
//! The host hands every fill and stroke a [`DrawingColor`]. Devices only draw
//! [`ColorClass::Pure`] colors as vector content; everything else either draws
//! nothing ([`ColorClass::Null`]) or goes through a raster fallback.

use core::fmt;
use std::sync::Arc;

use kurbo::Affine;
use peniko::{Brush, Color, Gradient};
use smallvec::SmallVec;

/// A 24-bit device color index laid out as `0xRRGGBB`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorIndex(u32);

impl ColorIndex {
    /// Opaque black.
    pub const BLACK: Self = Self(0x00_00_00);
    /// Opaque white.
    pub const WHITE: Self = Self(0xff_ff_ff);

    /// Builds an index from 8-bit channels.
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Builds an index from a packed `0xRRGGBB` value. Bits above 24 are dropped.
    pub const fn from_u32(value: u32) -> Self {
        Self(value & 0xff_ff_ff)
    }

    /// Returns the packed `0xRRGGBB` value.
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Returns the `[r, g, b]` channels.
    #[allow(clippy::cast_possible_truncation, reason = "each channel is masked to 8 bits")]
    pub const fn to_rgb8(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Converts to an opaque [`Color`].
    pub fn to_color(self) -> Color {
        let [r, g, b] = self.to_rgb8();
        Color::from_rgba8(r, g, b, 0xff)
    }

    /// Converts from a [`Color`], discarding alpha.
    pub fn from_color(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::from_rgb8(rgba.r, rgba.g, rgba.b)
    }
}

impl fmt::Display for ColorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// A straight-alpha RGBA8 tile used by colored halftones and tiling patterns.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Arc<[u8]>,
}

impl Tile {
    /// Creates a tile, returning `None` when the pixel buffer does not match
    /// the dimensions or the tile is empty.
    pub fn new(width: u32, height: u32, pixels: impl Into<Arc<[u8]>>) -> Option<Self> {
        let pixels = pixels.into();
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-color tile.
    pub fn solid(width: u32, height: u32, color: ColorIndex) -> Option<Self> {
        let [r, g, b] = color.to_rgb8();
        let count = (width as usize).checked_mul(height as usize)?;
        let pixels: Vec<u8> = core::iter::repeat_n([r, g, b, 0xff], count)
            .flatten()
            .collect();
        Self::new(width, height, pixels)
    }
}

/// A binary threshold cell: one bit per device pixel, `1` selects the
/// foreground color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HalftoneCell {
    /// Cell width in device pixels.
    pub width: u32,
    /// Cell height in device pixels.
    pub height: u32,
    /// Packed rows, most significant bit first, each row padded to a byte.
    pub bits: Arc<[u8]>,
    /// Device-space offset of the cell origin.
    pub phase: (i32, i32),
}

impl HalftoneCell {
    /// Bytes per packed row.
    pub fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Returns whether the bit at `(x, y)` selects the foreground.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        let index = y as usize * self.row_bytes() + (x as usize / 8);
        self.bits
            .get(index)
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }
}

/// A color as handed to a drawing callback.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum DrawingColor {
    /// A solid device color.
    Pure(ColorIndex),
    /// Draws nothing.
    Null,
    /// An N-component color with a solid alternate for devices that cannot
    /// represent the tints.
    DeviceN {
        /// Component tints in `0..=1`.
        tints: SmallVec<[f32; 4]>,
        /// Device color used when the tints cannot be represented.
        alternate: ColorIndex,
    },
    /// A two-color threshold halftone.
    BinaryHalftone {
        /// The threshold cell.
        cell: HalftoneCell,
        /// `[background, foreground]`.
        colors: [ColorIndex; 2],
    },
    /// A pre-rendered multi-level halftone cell.
    ColoredHalftone {
        /// The device-space cell.
        cell: Tile,
    },
    /// A smooth shading.
    Shading {
        /// Gradient in shading space.
        gradient: Gradient,
        /// Shading space to device space.
        transform: Affine,
    },
    /// A tiling pattern.
    Tiling {
        /// One pattern cell.
        tile: Tile,
        /// Pattern space to device space.
        transform: Affine,
        /// Underlying color of an uncolored pattern.
        underlying: Option<ColorIndex>,
    },
    /// Any other paint the host could describe.
    Other(Brush),
}

/// The representation kind of a [`DrawingColor`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColorClass {
    /// A solid color drawable as vector content.
    Pure,
    /// Draws nothing.
    Null,
    /// A DeviceN color.
    DeviceN,
    /// A two-color halftone.
    BinaryHalftone,
    /// A multi-level halftone.
    ColoredHalftone,
    /// A smooth shading pattern.
    ShadingPattern,
    /// A tiling pattern.
    TilingPattern,
    /// Unrecognized paint.
    Unknown,
}

impl ColorClass {
    /// Returns `true` when the color can be written as native vector paint.
    pub fn is_vector(self) -> bool {
        self == Self::Pure
    }

    /// Returns `false` only for colors that draw nothing.
    pub fn paints(self) -> bool {
        self != Self::Null
    }
}

/// Classifies a drawing color.
///
/// Checks run in a fixed order: pure, null, DeviceN, binary halftone, colored
/// halftone, shading pattern, tiling pattern. Anything else is
/// [`ColorClass::Unknown`].
pub fn classify(color: &DrawingColor) -> ColorClass {
    match color {
        DrawingColor::Pure(_) => ColorClass::Pure,
        DrawingColor::Null => ColorClass::Null,
        DrawingColor::DeviceN { .. } => ColorClass::DeviceN,
        DrawingColor::BinaryHalftone { .. } => ColorClass::BinaryHalftone,
        DrawingColor::ColoredHalftone { .. } => ColorClass::ColoredHalftone,
        DrawingColor::Shading { .. } => ColorClass::ShadingPattern,
        DrawingColor::Tiling { .. } => ColorClass::TilingPattern,
        DrawingColor::Other(_) => ColorClass::Unknown,
    }
}

impl DrawingColor {
    /// Shorthand for [`classify`].
    pub fn class(&self) -> ColorClass {
        classify(self)
    }

    /// Returns the color index of a pure color.
    pub fn pure(&self) -> Option<ColorIndex> {
        match self {
            Self::Pure(index) => Some(*index),
            _ => None,
        }
    }
}

impl From<ColorIndex> for DrawingColor {
    fn from(index: ColorIndex) -> Self {
        Self::Pure(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_hex() {
        for value in [0x00_00_00, 0xff_ff_ff, 0x7f_7f_7f, 0xff_00_00, 0x00_ff_00, 0x00_00_ff] {
            let index = ColorIndex::from_u32(value);
            let hex = index.to_string();
            assert_eq!(hex.len(), 7, "hex form is #rrggbb");
            let parsed = u32::from_str_radix(&hex[1..], 16).unwrap();
            assert_eq!(parsed, value, "round trip of {hex}");
        }
    }

    #[test]
    fn index_formats_lowercase() {
        assert_eq!(ColorIndex::from_rgb8(0xab, 0xcd, 0xef).to_string(), "#abcdef");
        assert_eq!(ColorIndex::BLACK.to_string(), "#000000");
    }

    #[test]
    fn index_drops_high_bits() {
        assert_eq!(ColorIndex::from_u32(0xff12_3456).to_u32(), 0x12_3456);
    }

    #[test]
    fn color_conversion_is_bit_exact() {
        let index = ColorIndex::from_rgb8(1, 128, 254);
        assert_eq!(ColorIndex::from_color(index.to_color()), index);
        assert_eq!(ColorIndex::from_color(Color::WHITE), ColorIndex::WHITE);
    }

    #[test]
    fn classification_follows_variant() {
        let cell = HalftoneCell {
            width: 2,
            height: 2,
            bits: Arc::from([0b1000_0000_u8, 0b0100_0000].as_slice()),
            phase: (0, 0),
        };
        let tile = Tile::solid(2, 2, ColorIndex::WHITE).unwrap();
        let cases = [
            (DrawingColor::Pure(ColorIndex::BLACK), ColorClass::Pure),
            (DrawingColor::Null, ColorClass::Null),
            (
                DrawingColor::DeviceN {
                    tints: SmallVec::from_slice(&[0.5, 0.25]),
                    alternate: ColorIndex::BLACK,
                },
                ColorClass::DeviceN,
            ),
            (
                DrawingColor::BinaryHalftone {
                    cell,
                    colors: [ColorIndex::WHITE, ColorIndex::BLACK],
                },
                ColorClass::BinaryHalftone,
            ),
            (
                DrawingColor::ColoredHalftone { cell: tile.clone() },
                ColorClass::ColoredHalftone,
            ),
            (
                DrawingColor::Shading {
                    gradient: Gradient::new_linear((0.0, 0.0), (1.0, 0.0)),
                    transform: Affine::IDENTITY,
                },
                ColorClass::ShadingPattern,
            ),
            (
                DrawingColor::Other(Brush::Solid(Color::from_rgba8(255, 0, 0, 255))),
                ColorClass::Unknown,
            ),
        ];
        for (color, expected) in cases {
            assert_eq!(classify(&color), expected, "classify {color:?}");
        }
    }

    #[test]
    fn uncolored_tiling_is_still_a_pattern() {
        let color = DrawingColor::Tiling {
            tile: Tile::solid(4, 4, ColorIndex::BLACK).unwrap(),
            transform: Affine::IDENTITY,
            underlying: Some(ColorIndex::from_u32(0x336699)),
        };
        assert_eq!(color.class(), ColorClass::TilingPattern);
        assert!(!color.class().is_vector(), "patterns are never vector paint");
        assert!(color.class().paints(), "patterns paint");
        assert_eq!(color.pure(), None);
    }

    #[test]
    fn halftone_bits_are_msb_first() {
        let cell = HalftoneCell {
            width: 10,
            height: 1,
            bits: Arc::from([0b1000_0001_u8, 0b0100_0000].as_slice()),
            phase: (0, 0),
        };
        assert_eq!(cell.row_bytes(), 2);
        assert!(cell.is_set(0, 0), "first bit");
        assert!(cell.is_set(7, 0), "last bit of first byte");
        assert!(cell.is_set(9, 0), "second bit of second byte");
        assert!(!cell.is_set(8, 0), "unset bit");
        assert!(!cell.is_set(0, 3), "out of range rows read as unset");
    }

    #[test]
    fn tile_rejects_mismatched_buffers() {
        assert!(Tile::new(2, 2, vec![0_u8; 15]).is_none(), "short buffer");
        assert!(Tile::new(0, 2, Vec::<u8>::new()).is_none(), "empty tile");
        assert!(Tile::new(1, 1, vec![0_u8; 4]).is_some(), "exact buffer");
    }
}
