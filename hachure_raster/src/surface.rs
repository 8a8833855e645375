// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen rendering of single drawables into a bounding-box bitmap.

use core::fmt;

use hachure_device::{ClipPath, DrawingColor, FillRule, StrokeParams};
use kurbo::{Affine, BezPath, Point, Rect};
use vello_cpu::{Pixmap, RenderContext, RenderMode, RenderSettings};

use crate::encoder::{PngEncoder, over_white};
use crate::paint::apply_paint;
use crate::RasterError;

/// An integer device-pixel rectangle, `x0..x1` by `y0..y1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelBounds {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge, exclusive.
    pub x1: i32,
    /// Bottom edge, exclusive.
    pub y1: i32,
}

impl PixelBounds {
    /// The smallest pixel rectangle containing `rect`, or `None` when `rect`
    /// is empty or not finite.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "coordinates are clamped to the i32 range first"
    )]
    pub fn round_out(rect: Rect) -> Option<Self> {
        let rect = rect.abs();
        let finite = [rect.x0, rect.y0, rect.x1, rect.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return None;
        }
        let clamp = |v: f64| v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32;
        let bounds = Self {
            x0: clamp(rect.x0.floor()),
            y0: clamp(rect.y0.floor()),
            x1: clamp(rect.x1.ceil()),
            y1: clamp(rect.y1.ceil()),
        };
        (bounds.x1 > bounds.x0 && bounds.y1 > bounds.y0).then_some(bounds)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.x1.abs_diff(self.x0)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.y1.abs_diff(self.y0)
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(f64::from(self.x0), f64::from(self.y0))
    }
}

/// Pixel format of an offscreen surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceFormat {
    /// One bit per pixel, `1` is ink.
    Mono1,
    /// 8-bit gray, composited over white.
    Gray8,
    /// RGB composited over white.
    Rgb24,
    /// RGB plus inverted alpha (`0` is opaque).
    Rgba32,
}

impl SurfaceFormat {
    /// The format for a device raster depth.
    pub fn from_depth(bits: u8) -> Result<Self, RasterError> {
        Ok(match bits {
            1 => Self::Mono1,
            8 => Self::Gray8,
            24 => Self::Rgb24,
            32 => Self::Rgba32,
            other => return Err(RasterError::UnsupportedDepth(other)),
        })
    }

    /// Bits per pixel.
    pub fn depth(self) -> u8 {
        match self {
            Self::Mono1 => 1,
            Self::Gray8 => 8,
            Self::Rgb24 => 24,
            Self::Rgba32 => 32,
        }
    }

    /// Bytes in one row of `width` pixels.
    pub fn row_bytes(self, width: u32) -> usize {
        (width as usize * usize::from(self.depth())).div_ceil(8)
    }
}

/// A bitmap covering one drawable's bounding box.
///
/// Geometry is given in device space; the surface maps `bounds.origin()` to
/// its own `(0, 0)` through the render transform, so callers never adjust
/// their paths.
pub struct OffscreenSurface {
    bounds: PixelBounds,
    format: SurfaceFormat,
    ctx: RenderContext,
}

impl fmt::Debug for OffscreenSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffscreenSurface")
            .field("bounds", &self.bounds)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl OffscreenSurface {
    /// Creates a transparent surface.
    pub fn new(bounds: PixelBounds, format: SurfaceFormat) -> Result<Self, RasterError> {
        let (width, height) = (bounds.width(), bounds.height());
        if width == 0 || height == 0 {
            return Err(RasterError::Empty { width, height });
        }
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(RasterError::TooLarge { width, height });
        };
        let settings = RenderSettings {
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        log::debug!("offscreen surface {width}x{height} at ({}, {}) {format:?}", bounds.x0, bounds.y0);
        Ok(Self {
            bounds,
            format,
            ctx: RenderContext::new_with(w, h, settings),
        })
    }

    /// The device-space area this surface covers.
    pub fn bounds(&self) -> PixelBounds {
        self.bounds
    }

    /// Pixel format of the harvested rows.
    pub fn format(&self) -> SurfaceFormat {
        self.format
    }

    fn device_to_surface(&self) -> Affine {
        Affine::translate(-self.bounds.origin().to_vec2())
    }

    /// Fills a device-space path.
    pub fn fill_path(
        &mut self,
        path: &BezPath,
        rule: FillRule,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) {
        self.with_clip(clip, |ctx| {
            if apply_paint(ctx, color) {
                ctx.set_fill_rule(rule);
                ctx.fill_path(path);
            }
        });
    }

    /// Strokes a device-space path.
    pub fn stroke_path(
        &mut self,
        path: &BezPath,
        params: &StrokeParams,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) {
        self.with_clip(clip, |ctx| {
            if apply_paint(ctx, color) {
                ctx.set_stroke(params.to_kurbo());
                ctx.stroke_path(path);
            }
        });
    }

    fn with_clip(&mut self, clip: Option<&ClipPath>, draw: impl FnOnce(&mut RenderContext)) {
        let regions = clip.map(ClipPath::regions).unwrap_or_default();
        self.ctx.set_transform(self.device_to_surface());
        for region in regions {
            self.ctx.set_fill_rule(region.fill_rule);
            self.ctx.push_clip_layer(&region.path);
        }
        draw(&mut self.ctx);
        for _ in regions {
            self.ctx.pop_layer();
        }
    }

    /// Renders and converts the surface into rows of its pixel format.
    pub fn finish(mut self) -> RasterImage {
        let (width, height) = (self.bounds.width(), self.bounds.height());
        #[allow(
            clippy::cast_possible_truncation,
            reason = "dimensions were checked against u16 in `new`"
        )]
        let mut pixmap = Pixmap::new(width as u16, height as u16);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let pixels = pixmap.take_unpremultiplied();

        let row_bytes = self.format.row_bytes(width);
        let mut rows = vec![0_u8; row_bytes * height as usize];
        for (y, row) in rows.chunks_exact_mut(row_bytes).enumerate() {
            let src = &pixels[y * width as usize..][..width as usize];
            for (x, p) in src.iter().enumerate() {
                let rgb = [over_white(p.r, p.a), over_white(p.g, p.a), over_white(p.b, p.a)];
                match self.format {
                    SurfaceFormat::Rgba32 => {
                        row[x * 4..x * 4 + 4].copy_from_slice(&[p.r, p.g, p.b, 255 - p.a]);
                    }
                    SurfaceFormat::Rgb24 => row[x * 3..x * 3 + 3].copy_from_slice(&rgb),
                    SurfaceFormat::Gray8 => row[x] = luminance(rgb),
                    SurfaceFormat::Mono1 => {
                        if luminance(rgb) < 128 {
                            row[x / 8] |= 0x80 >> (x % 8);
                        }
                    }
                }
            }
        }
        RasterImage {
            bounds: self.bounds,
            format: self.format,
            row_bytes,
            rows,
        }
    }
}

#[allow(clippy::cast_possible_truncation, reason = "weights sum to 100")]
fn luminance([r, g, b]: [u8; 3]) -> u8 {
    ((u32::from(r) * 30 + u32::from(g) * 59 + u32::from(b) * 11 + 50) / 100) as u8
}

/// Harvested rows of an [`OffscreenSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    bounds: PixelBounds,
    format: SurfaceFormat,
    row_bytes: usize,
    rows: Vec<u8>,
}

impl RasterImage {
    /// The device-space area covered.
    pub fn bounds(&self) -> PixelBounds {
        self.bounds
    }

    /// Pixel format of the rows.
    pub fn format(&self) -> SurfaceFormat {
        self.format
    }

    /// Row `y`, top to bottom.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let start = (y as usize).checked_mul(self.row_bytes)?;
        self.rows.get(start..start + self.row_bytes)
    }

    /// Encodes the rows as a PNG file.
    pub fn encode_png(&self, resolution: [f64; 2]) -> Result<Vec<u8>, RasterError> {
        let mut encoder = PngEncoder::open(
            self.bounds.width(),
            self.bounds.height(),
            self.format.depth(),
            resolution,
            None,
        )?;
        for row in self.rows.chunks_exact(self.row_bytes) {
            encoder.write_row(row)?;
        }
        encoder.close()
    }
}
