// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampled image descriptions.

use kurbo::Affine;

/// Base space of an indexed color space lookup table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexedBase {
    /// One gray byte per entry.
    Gray,
    /// Three RGB bytes per entry.
    Rgb,
    /// Three color bytes and one alpha byte per entry.
    Rgba,
}

impl IndexedBase {
    /// Bytes per lookup table entry.
    pub fn components(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Color space of image samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// One gray component.
    DeviceGray,
    /// Red, green and blue components.
    DeviceRgb,
    /// Cyan, magenta, yellow and black components.
    DeviceCmyk,
    /// One index component looked up in `table`.
    Indexed {
        /// Space the table entries are expressed in.
        base: IndexedBase,
        /// Highest valid index.
        hival: u8,
        /// `(hival + 1) * base.components()` bytes.
        table: Vec<u8>,
    },
    /// Named separations. Devices are not expected to represent these.
    DeviceN {
        /// Number of colorants.
        components: u8,
    },
}

impl ColorSpace {
    /// Components per sample.
    pub fn components(&self) -> usize {
        match self {
            Self::DeviceGray | Self::Indexed { .. } => 1,
            Self::DeviceRgb => 3,
            Self::DeviceCmyk => 4,
            Self::DeviceN { components } => usize::from(*components),
        }
    }
}

/// How components are laid out across data planes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// All components interleaved in one plane.
    #[default]
    Chunky,
    /// One plane per component.
    ComponentPlanar,
}

/// Description of a sampled image handed to `begin_typed_image`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDesc {
    /// Width in samples.
    pub width: u32,
    /// Height in samples.
    pub height: u32,
    /// Color space of the samples.
    pub color_space: ColorSpace,
    /// Bits per component: 1, 2, 4, 8 or 16.
    pub bits_per_component: u8,
    /// Maps user space to image space, where the image occupies
    /// `[0, width] x [0, height]`.
    pub image_matrix: Affine,
    /// Sample values run from maximum to minimum (`Decode [1 0]`).
    pub decode_inverted: bool,
    /// Samples are a stencil mask rather than colors.
    pub image_mask: bool,
    /// Plane layout.
    pub format: ImageFormat,
}

impl ImageDesc {
    /// An 8-bit chunky image with an identity decode.
    pub fn new(width: u32, height: u32, color_space: ColorSpace) -> Self {
        Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            image_matrix: Affine::IDENTITY,
            decode_inverted: false,
            image_mask: false,
            format: ImageFormat::Chunky,
        }
    }

    /// Number of data planes the host will send.
    pub fn num_planes(&self) -> usize {
        match self.format {
            ImageFormat::Chunky => 1,
            ImageFormat::ComponentPlanar => self.color_space.components(),
        }
    }

    /// Bytes in one row of one plane.
    pub fn plane_row_bytes(&self) -> usize {
        let per_plane = match self.format {
            ImageFormat::Chunky => self.color_space.components(),
            ImageFormat::ComponentPlanar => 1,
        };
        let bits = self.width as usize * per_plane * usize::from(self.bits_per_component);
        bits.div_ceil(8)
    }
}

/// One plane of image data.
#[derive(Copy, Clone, Debug)]
pub struct ImagePlane<'a> {
    /// Sample bytes, `raster` bytes per row.
    pub data: &'a [u8],
    /// Stride between rows.
    pub raster: usize,
}

impl<'a> ImagePlane<'a> {
    /// Creates a plane with the given stride.
    pub fn new(data: &'a [u8], raster: usize) -> Self {
        Self { data, raster }
    }

    /// The bytes of row `index`, trimmed to `len`.
    pub fn row(&self, index: usize, len: usize) -> Option<&'a [u8]> {
        let start = index.checked_mul(self.raster)?;
        self.data.get(start..start.checked_add(len)?)
    }
}

/// Progress reported by `image_plane_data`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageProgress {
    /// Rows consumed from this call.
    pub rows_used: u32,
    /// All rows of the image have been received.
    pub done: bool,
}
