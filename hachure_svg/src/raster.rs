// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster fallback for paints SVG cannot express natively.

use hachure_device::{ClipPath, DeviceResult, DrawingColor, FillRule, StrokeParams};
use hachure_raster::data_uri::PNG_DATA_URI_PREFIX;
use hachure_raster::{OffscreenSurface, PixelBounds, SurfaceFormat};
use kurbo::{Affine, BezPath, Shape};

use crate::device::SvgDevice;
use crate::format::affine_to_svg_matrix;

/// The operation to render offscreen.
#[derive(Copy, Clone, Debug)]
pub(crate) enum RasterOp<'a> {
    Fill(FillRule),
    Stroke(&'a StrokeParams),
}

impl SvgDevice {
    /// Renders a fill or stroke into a bitmap covering its visible bounding
    /// box and embeds the bitmap at that position.
    pub(crate) fn raster_drawable(
        &mut self,
        path: &BezPath,
        op: RasterOp<'_>,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<()> {
        if path.elements().is_empty() {
            return Ok(());
        }
        let clip = self.effective_clip(clip);
        let mut area = path.bounding_box();
        if let RasterOp::Stroke(params) = op {
            let outset = params.outset();
            area = area.inflate(outset, outset);
        }
        if let Some(clip_box) = clip.as_ref().and_then(ClipPath::bounding_box) {
            area = area.intersect(clip_box);
        }
        area = area.intersect(self.params().page_rect());
        let Some(bounds) = PixelBounds::round_out(area) else {
            log::debug!("raster drawable is outside the page");
            return Ok(());
        };

        let format = SurfaceFormat::from_depth(self.params().raster_depth)?;
        let mut surface = OffscreenSurface::new(bounds, format)?;
        match op {
            RasterOp::Fill(rule) => surface.fill_path(path, rule, color, clip.as_ref()),
            RasterOp::Stroke(params) => surface.stroke_path(path, params, color, clip.as_ref()),
        }
        let png = surface.finish().encode_png(self.params().hw_resolution)?;

        self.ensure_page()?;
        self.active_clip = clip;
        let placement = Affine::translate(bounds.origin().to_vec2());
        self.scoped(|dev| dev.write_placed_image(placement, bounds.width(), bounds.height(), &png))
    }

    /// Writes a `width` x `height` PNG whose pixel grid `placement` maps into
    /// device space. The pending clip is mapped into the image's space.
    pub(crate) fn write_placed_image(
        &mut self,
        placement: Affine,
        width: u32,
        height: u32,
        png: &[u8],
    ) -> DeviceResult<()> {
        self.open_group(&format!(" transform='{}'", affine_to_svg_matrix(placement)))?;
        let clip_id = self.open_active_clip(placement.inverse())?;
        let w = self.writer_mut()?;
        write!(
            w,
            "<image x='0' y='0' width='{width}' height='{height}' preserveAspectRatio='none'"
        )?;
        if let Some(id) = clip_id {
            write!(w, " clip-path='url(#clip{id})'")?;
        }
        w.write_str(" xlink:href='")?;
        w.write_str(PNG_DATA_URI_PREFIX)?;
        w.write_base64(png)?;
        w.write_str("'/>\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hachure_device::{
        ClipRegion, ColorIndex, Device, FillParams, LineJoin, Tile, VectorParams,
    };
    use kurbo::Rect;

    fn device(depth: u8) -> SvgDevice {
        SvgDevice::new(
            VectorParams::default()
                .with_resolution(72.0, 72.0)
                .with_media_size(200.0, 100.0)
                .with_raster_depth(depth),
        )
    }

    fn tiling() -> DrawingColor {
        DrawingColor::Tiling {
            tile: Tile::solid(4, 4, ColorIndex::from_u32(0x3366cc)).unwrap(),
            transform: Affine::IDENTITY,
            underlying: None,
        }
    }

    fn text(dev: &mut SvgDevice) -> String {
        String::from_utf8(dev.take_documents().remove(0)).unwrap()
    }

    #[test]
    fn fills_are_placed_at_their_bounding_box() {
        let mut dev = device(32);
        dev.open().unwrap();
        let path = Rect::new(10.5, 20.0, 40.0, 35.2).to_path(0.1);
        dev.fill_path(&path, &FillParams::default(), &tiling(), None).unwrap();
        dev.close().unwrap();
        let text = text(&mut dev);
        assert!(text.contains("<g transform='matrix(1 0 0 1 10 20)'>"), "{text}");
        assert!(
            text.contains("<image x='0' y='0' width='30' height='16' preserveAspectRatio='none' xlink:href='data:image/png;base64,"),
            "{text}"
        );
    }

    #[test]
    fn strokes_grow_by_the_outset() {
        let mut dev = device(24);
        dev.open().unwrap();
        let mut path = BezPath::new();
        path.move_to((50.0, 50.0));
        path.line_to((60.0, 50.0));
        let params = StrokeParams {
            width: 4.0,
            join: LineJoin::Round,
            ..StrokeParams::default()
        };
        dev.stroke_path(&path, &params, &tiling(), None).unwrap();
        dev.close().unwrap();
        let text = text(&mut dev);
        assert!(text.contains("matrix(1 0 0 1 48 48)"), "{text}");
        assert!(text.contains("width='14' height='4'"), "{text}");
    }

    #[test]
    fn clips_shrink_and_follow_the_image() {
        let mut dev = device(32);
        dev.open().unwrap();
        let path = Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1);
        let clip = ClipPath::Single(ClipRegion::rect(Rect::new(20.0, 30.0, 50.0, 60.0)));
        dev.fill_path(&path, &FillParams::default(), &tiling(), Some(&clip))
            .unwrap();
        dev.close().unwrap();
        let text = text(&mut dev);
        assert!(text.contains("matrix(1 0 0 1 20 30)"), "{text}");
        assert!(text.contains("width='30' height='30'"), "{text}");
        assert!(
            text.contains("<clipPath id='clip1'><path d='M0,0 L30,0 L30,30 L0,30 z'/></clipPath>"),
            "clip is in image space: {text}"
        );
        assert!(text.contains("preserveAspectRatio='none' clip-path='url(#clip1)'"), "{text}");
    }

    #[test]
    fn offpage_drawables_start_no_page() {
        let mut dev = device(32);
        dev.open().unwrap();
        let path = Rect::new(300.0, 10.0, 320.0, 20.0).to_path(0.1);
        dev.fill_path(&path, &FillParams::default(), &tiling(), None).unwrap();
        dev.close().unwrap();
        assert!(!text(&mut dev).contains("<page>"));
    }
}
