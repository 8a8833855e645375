// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping drawing colors onto `vello_cpu` paints.

use hachure_device::{ColorIndex, DrawingColor, HalftoneCell, Tile};
use kurbo::Affine;
use peniko::{
    Blob, Brush, Extend, ImageAlphaType, ImageData, ImageFormat, ImageQuality, ImageSampler,
};
use vello_cpu::{Image as CpuImage, ImageSource, RenderContext};

/// Sets the paint and paint transform for `color`. Returns `false` when the
/// color paints nothing.
pub(crate) fn apply_paint(ctx: &mut RenderContext, color: &DrawingColor) -> bool {
    let mut paint_transform = Affine::IDENTITY;
    match color {
        DrawingColor::Pure(index) | DrawingColor::DeviceN { alternate: index, .. } => {
            ctx.set_paint(index.to_color());
        }
        DrawingColor::Null => return false,
        DrawingColor::BinaryHalftone { cell, colors } => {
            ctx.set_paint(halftone_paint(cell, *colors));
            paint_transform = Affine::translate((f64::from(cell.phase.0), f64::from(cell.phase.1)));
        }
        DrawingColor::ColoredHalftone { cell } => {
            ctx.set_paint(repeating_image(cell.width, cell.height, cell.pixels.to_vec()));
        }
        DrawingColor::Shading {
            gradient,
            transform,
        } => {
            ctx.set_paint(gradient.clone());
            paint_transform = *transform;
        }
        DrawingColor::Tiling {
            tile,
            transform,
            underlying,
        } => {
            let pixels = match underlying {
                Some(index) => recolor(tile, *index),
                None => tile.pixels.to_vec(),
            };
            ctx.set_paint(repeating_image(tile.width, tile.height, pixels));
            paint_transform = *transform;
        }
        DrawingColor::Other(brush) => match brush.clone() {
            Brush::Solid(color) => ctx.set_paint(color),
            Brush::Gradient(gradient) => ctx.set_paint(gradient),
            Brush::Image(image_brush) => {
                let source = ImageSource::from_peniko_image_data(&image_brush.image);
                ctx.set_paint(CpuImage {
                    image: source,
                    sampler: image_brush.sampler,
                });
            }
        },
        other => {
            log::warn!("no raster paint for {other:?}, using black");
            ctx.set_paint(ColorIndex::BLACK.to_color());
        }
    }
    ctx.set_paint_transform(paint_transform);
    true
}

fn halftone_paint(cell: &HalftoneCell, [background, foreground]: [ColorIndex; 2]) -> CpuImage {
    let (bg, fg) = (background.to_rgb8(), foreground.to_rgb8());
    let mut pixels = Vec::with_capacity(cell.width as usize * cell.height as usize * 4);
    for y in 0..cell.height {
        for x in 0..cell.width {
            let [r, g, b] = if cell.is_set(x, y) { fg } else { bg };
            pixels.extend_from_slice(&[r, g, b, 0xff]);
        }
    }
    repeating_image(cell.width, cell.height, pixels)
}

/// Uncolored patterns carry only coverage; the underlying color supplies RGB.
fn recolor(tile: &Tile, index: ColorIndex) -> Vec<u8> {
    let [r, g, b] = index.to_rgb8();
    tile.pixels
        .chunks_exact(4)
        .flat_map(|px| [r, g, b, px[3]])
        .collect()
}

fn repeating_image(width: u32, height: u32, rgba: Vec<u8>) -> CpuImage {
    let image_data = ImageData {
        data: Blob::from(rgba),
        format: ImageFormat::Rgba8,
        alpha_type: ImageAlphaType::Alpha,
        width,
        height,
    };
    CpuImage {
        image: ImageSource::from_peniko_image_data(&image_data),
        sampler: ImageSampler {
            x_extend: Extend::Repeat,
            y_extend: Extend::Repeat,
            quality: ImageQuality::Low,
            alpha: 1.0,
        },
    }
}
