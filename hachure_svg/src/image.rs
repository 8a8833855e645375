// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampled images, converted row by row into embedded PNGs.

use hachure_device::{
    ClipPath, ColorSpace, DeviceError, DeviceResult, ImageDesc, ImageFormat, ImagePlane,
    ImageProgress,
};
use hachure_raster::{Palette, PixelDepth, PngEncoder};
use kurbo::Affine;

/// An image in progress, returned by
/// [`Device::begin_typed_image`](hachure_device::Device::begin_typed_image).
///
/// Rows are converted and encoded as they arrive, so the source samples are
/// never held in full.
#[derive(Debug)]
pub struct SvgImageEnum {
    width: u32,
    height: u32,
    placement: Affine,
    clip: Option<ClipPath>,
    converter: RowConverter,
    encoder: PngEncoder,
    row: Vec<u8>,
    pad: u8,
}

/// A finished image ready to be written.
#[derive(Debug)]
pub(crate) struct PlacedImage {
    pub(crate) placement: Affine,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) png: Vec<u8>,
    pub(crate) clip: Option<ClipPath>,
}

impl SvgImageEnum {
    pub(crate) fn begin(
        desc: &ImageDesc,
        ctm: Affine,
        clip: Option<ClipPath>,
        resolution: [f64; 2],
    ) -> DeviceResult<Self> {
        if desc.image_mask {
            return Err(DeviceError::Unsupported("image masks"));
        }
        if desc.width == 0 || desc.height == 0 {
            return Err(DeviceError::RangeCheck(format!(
                "image size {}x{}",
                desc.width, desc.height
            )));
        }
        if !is_invertible(desc.image_matrix) || !is_invertible(ctm) {
            return Err(DeviceError::Unsupported("degenerate image transforms"));
        }
        let converter = RowConverter::new(desc)?;
        let palette = match &desc.color_space {
            ColorSpace::Indexed { base, hival, table } => {
                Some(Palette::from_table(*base, *hival, table)?)
            }
            _ => None,
        };
        let pad = match (converter.depth, &palette) {
            (PixelDepth::Indexed8, Some(palette)) => palette.lightest(),
            (PixelDepth::Mono1 | PixelDepth::Indexed8, _) => 0x00,
            _ => 0xff,
        };
        let encoder = PngEncoder::open(
            desc.width,
            desc.height,
            converter.depth.bits(),
            resolution,
            palette,
        )?;
        log::debug!(
            "begin {}x{} image, {} bpc {:?} as {:?}",
            desc.width,
            desc.height,
            desc.bits_per_component,
            desc.color_space,
            converter.depth
        );
        Ok(Self {
            width: desc.width,
            height: desc.height,
            placement: ctm * desc.image_matrix.inverse(),
            clip,
            row: Vec::with_capacity(encoder.row_bytes()),
            converter,
            encoder,
            pad,
        })
    }

    /// Width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Rows received so far.
    pub fn rows_received(&self) -> u32 {
        self.encoder.rows_written()
    }

    /// Maps image space, `[0, width] x [0, height]`, to device space.
    pub fn placement(&self) -> Affine {
        self.placement
    }

    pub(crate) fn write_rows(
        &mut self,
        planes: &[ImagePlane<'_>],
        height: u32,
    ) -> DeviceResult<ImageProgress> {
        if planes.len() != self.converter.planes {
            return Err(DeviceError::RangeCheck(format!(
                "{} image planes, expected {}",
                planes.len(),
                self.converter.planes
            )));
        }
        let remaining = self.height - self.encoder.rows_written();
        let rows = height.min(remaining);
        let len = self.converter.plane_row_bytes;
        let mut sources = Vec::with_capacity(planes.len());
        for index in 0..rows as usize {
            sources.clear();
            for plane in planes {
                let row = plane
                    .row(index, len)
                    .ok_or_else(|| DeviceError::RangeCheck(format!("image row {index} is short")))?;
                sources.push(row);
            }
            self.converter.convert(&sources, &mut self.row);
            self.encoder.write_row(&self.row)?;
        }
        Ok(ImageProgress {
            rows_used: rows,
            done: self.encoder.rows_written() == self.height,
        })
    }

    /// Encodes the image, padding missing rows with white.
    pub(crate) fn finish(mut self) -> DeviceResult<PlacedImage> {
        let missing = self.height - self.encoder.rows_written();
        if missing > 0 {
            log::warn!("image ended {missing} rows short of {}", self.height);
            self.row.clear();
            self.row.resize(self.encoder.row_bytes(), self.pad);
            for _ in 0..missing {
                self.encoder.write_row(&self.row)?;
            }
        }
        Ok(PlacedImage {
            placement: self.placement,
            width: self.width,
            height: self.height,
            png: self.encoder.close()?,
            clip: self.clip,
        })
    }
}

fn is_invertible(xf: Affine) -> bool {
    let det = xf.determinant();
    det.is_finite() && det != 0.0
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Samples {
    Gray,
    Rgb,
    Cmyk,
    Indexed { hival: u8 },
}

/// Turns source rows into encoder rows.
#[derive(Clone, Debug)]
struct RowConverter {
    samples: Samples,
    depth: PixelDepth,
    bpc: u8,
    invert: bool,
    planar: bool,
    components: usize,
    planes: usize,
    plane_row_bytes: usize,
    width: usize,
}

impl RowConverter {
    fn new(desc: &ImageDesc) -> DeviceResult<Self> {
        let bpc = desc.bits_per_component;
        let samples = match desc.color_space {
            ColorSpace::DeviceGray => Samples::Gray,
            ColorSpace::DeviceRgb => Samples::Rgb,
            ColorSpace::DeviceCmyk => Samples::Cmyk,
            ColorSpace::Indexed { hival, .. } => Samples::Indexed { hival },
            ColorSpace::DeviceN { .. } => return Err(DeviceError::Unsupported("DeviceN images")),
        };
        let valid_bpc = match samples {
            Samples::Indexed { .. } => matches!(bpc, 1 | 2 | 4 | 8),
            _ => matches!(bpc, 1 | 2 | 4 | 8 | 16),
        };
        if !valid_bpc {
            return Err(DeviceError::RangeCheck(format!(
                "{bpc} bits per component"
            )));
        }
        let depth = match samples {
            Samples::Gray if bpc == 1 => PixelDepth::Mono1,
            Samples::Gray => PixelDepth::Gray8,
            Samples::Rgb if bpc == 16 => PixelDepth::Rgb48,
            Samples::Rgb | Samples::Cmyk => PixelDepth::Rgb24,
            Samples::Indexed { .. } => PixelDepth::Indexed8,
        };
        Ok(Self {
            samples,
            depth,
            bpc,
            invert: desc.decode_inverted,
            planar: desc.format == ImageFormat::ComponentPlanar,
            components: desc.color_space.components(),
            planes: desc.num_planes(),
            plane_row_bytes: desc.plane_row_bytes(),
            width: desc.width as usize,
        })
    }

    /// Raw value of component `c` of sample `x`.
    fn raw(&self, planes: &[&[u8]], x: usize, c: usize) -> u16 {
        let (plane, index) = if self.planar {
            (planes.get(c), x)
        } else {
            (planes.first(), x * self.components + c)
        };
        plane.map_or(0, |plane| read_sample(plane, index, self.bpc))
    }

    /// Component scaled to eight bits with the decode applied.
    fn level(&self, planes: &[&[u8]], x: usize, c: usize) -> u8 {
        let raw = u32::from(self.raw(planes, x, c));
        let level = match self.bpc {
            16 => raw >> 8,
            8 => raw,
            bits => raw * 255 / ((1 << bits) - 1),
        };
        let level = u8::try_from(level).unwrap_or(u8::MAX);
        if self.invert { 255 - level } else { level }
    }

    fn index(&self, planes: &[&[u8]], x: usize, hival: u8) -> u8 {
        let raw = self.raw(planes, x, 0);
        let raw = if self.invert {
            ((1_u16 << self.bpc) - 1) - raw
        } else {
            raw
        };
        u8::try_from(raw).unwrap_or(u8::MAX).min(hival)
    }

    fn convert(&self, planes: &[&[u8]], out: &mut Vec<u8>) {
        out.clear();
        match (self.depth, self.samples) {
            (PixelDepth::Mono1, _) => {
                out.resize(self.width.div_ceil(8), 0);
                for x in 0..self.width {
                    let ink = (self.raw(planes, x, 0) == 0) != self.invert;
                    if ink {
                        out[x / 8] |= 0x80 >> (x % 8);
                    }
                }
            }
            (PixelDepth::Indexed8, Samples::Indexed { hival }) => {
                out.extend((0..self.width).map(|x| self.index(planes, x, hival)));
            }
            (PixelDepth::Rgb48, _) => {
                for x in 0..self.width {
                    for c in 0..3 {
                        let raw = self.raw(planes, x, c);
                        let raw = if self.invert { u16::MAX - raw } else { raw };
                        out.extend_from_slice(&raw.to_be_bytes());
                    }
                }
            }
            (_, Samples::Cmyk) => {
                for x in 0..self.width {
                    let k = u16::from(self.level(planes, x, 3));
                    for c in 0..3 {
                        let ink = (u16::from(self.level(planes, x, c)) + k).min(255);
                        out.push(u8::try_from(255 - ink).unwrap_or(0));
                    }
                }
            }
            _ => {
                let channels = self.components.min(3);
                for x in 0..self.width {
                    out.extend((0..channels).map(|c| self.level(planes, x, c)));
                }
            }
        }
    }
}

/// Reads sample `index` of `bpc` bits from a packed, big-endian row.
fn read_sample(row: &[u8], index: usize, bpc: u8) -> u16 {
    match bpc {
        16 => {
            let at = index * 2;
            match row.get(at..at + 2) {
                Some(&[hi, lo]) => u16::from_be_bytes([hi, lo]),
                _ => 0,
            }
        }
        8 => row.get(index).copied().map_or(0, u16::from),
        bits => {
            let bits = usize::from(bits);
            let bit = index * bits;
            let Some(&byte) = row.get(bit / 8) else {
                return 0;
            };
            let shift = 8 - bits - bit % 8;
            u16::from(byte >> shift) & ((1 << bits) - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hachure_device::IndexedBase;

    fn convert(desc: &ImageDesc, rows: &[&[u8]]) -> Vec<u8> {
        let converter = RowConverter::new(desc).unwrap();
        let mut out = Vec::new();
        converter.convert(rows, &mut out);
        out
    }

    #[test]
    fn packed_samples() {
        let row = [0b1011_0010, 0xff];
        assert_eq!(read_sample(&row, 0, 1), 1);
        assert_eq!(read_sample(&row, 1, 1), 0);
        assert_eq!(read_sample(&row, 1, 2), 0b11);
        assert_eq!(read_sample(&row, 1, 4), 0b0010);
        assert_eq!(read_sample(&row, 0, 16), 0xb2ff);
        assert_eq!(read_sample(&row, 9, 8), 0, "past the end");
    }

    #[test]
    fn one_bit_gray_marks_black_as_ink() {
        let mut desc = ImageDesc::new(10, 1, ColorSpace::DeviceGray);
        desc.bits_per_component = 1;
        assert_eq!(convert(&desc, &[&[0b0000_1111, 0b0100_0000]]), [0b1111_0000, 0b1000_0000]);
        desc.decode_inverted = true;
        assert_eq!(convert(&desc, &[&[0b0000_1111, 0b0100_0000]]), [0b0000_1111, 0b0100_0000]);
    }

    #[test]
    fn low_bit_gray_is_scaled() {
        let mut desc = ImageDesc::new(4, 1, ColorSpace::DeviceGray);
        desc.bits_per_component = 2;
        assert_eq!(convert(&desc, &[&[0b00_01_10_11]]), [0, 85, 170, 255]);
        desc.decode_inverted = true;
        assert_eq!(convert(&desc, &[&[0b00_01_10_11]]), [255, 170, 85, 0]);
    }

    #[test]
    fn cmyk_becomes_rgb() {
        let desc = ImageDesc::new(2, 1, ColorSpace::DeviceCmyk);
        let row = [255, 0, 0, 0, 0, 0, 0, 128];
        assert_eq!(convert(&desc, &[&row]), [0, 255, 255, 127, 127, 127]);
    }

    #[test]
    fn planar_rgb_is_interleaved() {
        let mut desc = ImageDesc::new(2, 1, ColorSpace::DeviceRgb);
        desc.format = ImageFormat::ComponentPlanar;
        let out = convert(&desc, &[&[1, 2], &[3, 4], &[5, 6]]);
        assert_eq!(out, [1, 3, 5, 2, 4, 6]);
    }

    #[test]
    fn sixteen_bit_rgb_keeps_precision() {
        let mut desc = ImageDesc::new(1, 1, ColorSpace::DeviceRgb);
        desc.bits_per_component = 16;
        let converter = RowConverter::new(&desc).unwrap();
        assert_eq!(converter.depth, PixelDepth::Rgb48);
        desc.decode_inverted = true;
        assert_eq!(convert(&desc, &[&[0x12, 0x34, 0, 0, 0xff, 0xff]]), [0xed, 0xcb, 0xff, 0xff, 0, 0]);
    }

    #[test]
    fn indices_are_clamped() {
        let mut desc = ImageDesc::new(
            3,
            1,
            ColorSpace::Indexed {
                base: IndexedBase::Gray,
                hival: 2,
                table: vec![0, 128, 255],
            },
        );
        desc.bits_per_component = 4;
        assert_eq!(convert(&desc, &[&[0x01, 0xf0]]), [0, 1, 2]);
        desc.decode_inverted = true;
        assert_eq!(convert(&desc, &[&[0x0f, 0xe0]]), [2, 0, 1]);
    }

    #[test]
    fn unsupported_images() {
        let mut mask = ImageDesc::new(1, 1, ColorSpace::DeviceGray);
        mask.image_mask = true;
        let err = SvgImageEnum::begin(&mask, Affine::IDENTITY, None, [72.0; 2]).unwrap_err();
        assert!(err.is_unsupported());

        let separations = ImageDesc::new(1, 1, ColorSpace::DeviceN { components: 2 });
        let err = SvgImageEnum::begin(&separations, Affine::IDENTITY, None, [72.0; 2]).unwrap_err();
        assert!(err.is_unsupported());

        let flat = ImageDesc {
            image_matrix: Affine::scale_non_uniform(1.0, 0.0),
            ..ImageDesc::new(1, 1, ColorSpace::DeviceGray)
        };
        let err = SvgImageEnum::begin(&flat, Affine::IDENTITY, None, [72.0; 2]).unwrap_err();
        assert!(err.is_unsupported());

        let mut odd = ImageDesc::new(1, 1, ColorSpace::DeviceGray);
        odd.bits_per_component = 3;
        let err = SvgImageEnum::begin(&odd, Affine::IDENTITY, None, [72.0; 2]).unwrap_err();
        assert!(matches!(err, DeviceError::RangeCheck(_)), "{err:?}");

        let empty = ImageDesc::new(0, 4, ColorSpace::DeviceGray);
        let err = SvgImageEnum::begin(&empty, Affine::IDENTITY, None, [72.0; 2]).unwrap_err();
        assert!(matches!(err, DeviceError::RangeCheck(_)), "{err:?}");
    }

    #[test]
    fn rows_arrive_in_batches() {
        let desc = ImageDesc::new(2, 3, ColorSpace::DeviceGray);
        let mut image = SvgImageEnum::begin(&desc, Affine::IDENTITY, None, [72.0; 2]).unwrap();
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let progress = image.write_rows(&[ImagePlane::new(&data, 2)], 2).unwrap();
        assert_eq!(progress, ImageProgress { rows_used: 2, done: false });
        let progress = image.write_rows(&[ImagePlane::new(&data, 2)], 4).unwrap();
        assert_eq!(progress, ImageProgress { rows_used: 1, done: true }, "extra rows are ignored");
        assert_eq!(image.rows_received(), 3);
        let err = image.write_rows(&[], 1).unwrap_err();
        assert!(matches!(err, DeviceError::RangeCheck(_)));
    }

    #[test]
    fn short_images_are_padded() {
        let desc = ImageDesc::new(2, 3, ColorSpace::DeviceRgb);
        let mut image = SvgImageEnum::begin(&desc, Affine::IDENTITY, None, [72.0; 2]).unwrap();
        image
            .write_rows(&[ImagePlane::new(&[0; 6], 6)], 1)
            .unwrap();
        let placed = image.finish().unwrap();
        assert_eq!((placed.width, placed.height), (2, 3));
        assert!(placed.png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn indexed_padding_uses_the_lightest_entry() {
        let desc = ImageDesc::new(
            2,
            2,
            ColorSpace::Indexed {
                base: IndexedBase::Rgb,
                hival: 2,
                table: vec![0, 0, 0, 255, 255, 255, 90, 90, 90],
            },
        );
        let image = SvgImageEnum::begin(&desc, Affine::IDENTITY, None, [72.0; 2]).unwrap();
        assert_eq!(image.pad, 1);

        let mut mono = ImageDesc::new(8, 1, ColorSpace::DeviceGray);
        mono.bits_per_component = 1;
        let image = SvgImageEnum::begin(&mono, Affine::IDENTITY, None, [72.0; 2]).unwrap();
        assert_eq!(image.pad, 0x00, "one-bit rows carry ink as set bits");
    }

    #[test]
    fn placement_maps_image_space_to_device() {
        let desc = ImageDesc {
            image_matrix: Affine::scale(0.5),
            ..ImageDesc::new(4, 4, ColorSpace::DeviceGray)
        };
        let image =
            SvgImageEnum::begin(&desc, Affine::translate((10.0, 20.0)), None, [72.0; 2]).unwrap();
        assert_eq!(image.placement(), Affine::new([2.0, 0.0, 0.0, 2.0, 10.0, 20.0]));
    }
}
