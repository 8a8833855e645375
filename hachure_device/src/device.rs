// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host callback trait and the vector path hooks.

use kurbo::{Affine, BezPath, PathEl, Point, QuadBez, Rect};

use crate::{
    ClipPath, ColorIndex, DeviceError, DeviceResult, DrawingColor, FillRule, ImageDesc,
    ImagePlane, ImageProgress, LineCap, LineJoin, ParamList, PathType, StrokeParams,
    path_as_rect,
};

/// Parameters of a fill.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FillParams {
    /// Inside test.
    pub rule: FillRule,
    /// Curve flattening tolerance in device pixels. Devices that keep curves
    /// may ignore it.
    pub flatness: f64,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            rule: FillRule::NonZero,
            flatness: 0.25,
        }
    }
}

impl FillParams {
    /// Fill parameters with the given rule.
    pub fn with_rule(rule: FillRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }
}

/// One method per host callback.
///
/// All geometry is in device pixels. Requests a device does not handle return
/// [`DeviceError::Unsupported`], which tells the host to use its default
/// implementation.
pub trait Device {
    /// State carried between `begin_typed_image` and `end_image`.
    type ImageEnum;

    /// Opens the device.
    fn open(&mut self) -> DeviceResult<()>;

    /// Closes the device. Closing twice is harmless.
    fn close(&mut self) -> DeviceResult<()>;

    /// Ends the current page.
    fn output_page(&mut self, num_copies: u32, flush: bool) -> DeviceResult<()> {
        let _ = (num_copies, flush);
        Err(DeviceError::Unsupported("output_page"))
    }

    /// Reports device parameters.
    fn get_params(&self, list: &mut ParamList) -> DeviceResult<()> {
        let _ = list;
        Err(DeviceError::Unsupported("get_params"))
    }

    /// Applies device parameters.
    fn put_params(&mut self, list: &ParamList) -> DeviceResult<()> {
        let _ = list;
        Err(DeviceError::Unsupported("put_params"))
    }

    /// Fills a path.
    fn fill_path(
        &mut self,
        path: &BezPath,
        params: &FillParams,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<()> {
        let _ = (path, params, color, clip);
        Err(DeviceError::Unsupported("fill_path"))
    }

    /// Strokes a path.
    fn stroke_path(
        &mut self,
        path: &BezPath,
        params: &StrokeParams,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<()> {
        let _ = (path, params, color, clip);
        Err(DeviceError::Unsupported("stroke_path"))
    }

    /// Fills a device rectangle with a solid color.
    fn fill_rectangle(&mut self, rect: Rect, color: ColorIndex) -> DeviceResult<()> {
        let _ = (rect, color);
        Err(DeviceError::Unsupported("fill_rectangle"))
    }

    /// Fills the whole page.
    fn fill_page(&mut self, color: &DrawingColor) -> DeviceResult<()> {
        let _ = color;
        Err(DeviceError::Unsupported("fill_page"))
    }

    /// Starts a sampled image drawn through `ctm`.
    fn begin_typed_image(
        &mut self,
        image: &ImageDesc,
        ctm: Affine,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<Self::ImageEnum> {
        let _ = (image, ctm, clip);
        Err(DeviceError::Unsupported("begin_typed_image"))
    }

    /// Passes up to `height` rows of image data, one slice per plane.
    fn image_plane_data(
        &mut self,
        info: &mut Self::ImageEnum,
        planes: &[ImagePlane<'_>],
        height: u32,
    ) -> DeviceResult<ImageProgress> {
        let _ = (info, planes, height);
        Err(DeviceError::Unsupported("image_plane_data"))
    }

    /// Finishes an image. When `draw_last` is false the image is discarded.
    fn end_image(&mut self, info: Self::ImageEnum, draw_last: bool) -> DeviceResult<()> {
        let _ = (info, draw_last);
        Err(DeviceError::Unsupported("end_image"))
    }
}

/// Hooks a vector device implements so that paths can be walked generically.
///
/// Every path-construction hook receives the [`PathType`] of the walk so that
/// implementations can skip paths that do not draw.
pub trait VectorDevice {
    /// Starts a page.
    fn begin_page(&mut self) -> DeviceResult<()>;
    /// Sets the stroke width.
    fn set_line_width(&mut self, width: f64) -> DeviceResult<()>;
    /// Sets the cap style.
    fn set_line_cap(&mut self, cap: LineCap) -> DeviceResult<()>;
    /// Sets the join style.
    fn set_line_join(&mut self, join: LineJoin) -> DeviceResult<()>;
    /// Sets the miter limit.
    fn set_miter_limit(&mut self, limit: f64) -> DeviceResult<()>;
    /// Sets the dash pattern. An empty pattern is solid.
    fn set_dash(&mut self, pattern: &[f64], offset: f64) -> DeviceResult<()>;
    /// Sets the fill paint.
    fn set_fill_color(&mut self, color: &DrawingColor) -> DeviceResult<()>;
    /// Sets the stroke paint.
    fn set_stroke_color(&mut self, color: &DrawingColor) -> DeviceResult<()>;

    /// Draws an axis-aligned rectangle.
    fn do_rect(&mut self, rect: Rect, ty: PathType) -> DeviceResult<()>;
    /// Starts a path.
    fn begin_path(&mut self, ty: PathType) -> DeviceResult<()>;
    /// Starts a subpath at `to`.
    fn move_to(&mut self, from: Point, to: Point, ty: PathType) -> DeviceResult<()>;
    /// Appends a line.
    fn line_to(&mut self, from: Point, to: Point, ty: PathType) -> DeviceResult<()>;
    /// Appends a cubic curve.
    fn curve_to(
        &mut self,
        from: Point,
        c1: Point,
        c2: Point,
        to: Point,
        ty: PathType,
    ) -> DeviceResult<()>;
    /// Closes the current subpath back to `start`.
    fn close_path(&mut self, current: Point, start: Point, ty: PathType) -> DeviceResult<()>;
    /// Finishes the path.
    fn end_path(&mut self, ty: PathType) -> DeviceResult<()>;

    /// Walks `path` through the hooks.
    ///
    /// Axis-aligned rectangles go to [`VectorDevice::do_rect`]. Quadratic
    /// segments are raised to cubics.
    fn do_path(&mut self, path: &BezPath, ty: PathType) -> DeviceResult<()> {
        if let Some(rect) = path_as_rect(path) {
            return self.do_rect(rect, ty);
        }
        self.begin_path(ty)?;
        let mut current = Point::ZERO;
        let mut start = Point::ZERO;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    self.move_to(current, p, ty)?;
                    start = p;
                    current = p;
                }
                PathEl::LineTo(p) => {
                    self.line_to(current, p, ty)?;
                    current = p;
                }
                PathEl::QuadTo(p1, p2) => {
                    let cubic = QuadBez::new(current, p1, p2).raise();
                    self.curve_to(current, cubic.p1, cubic.p2, cubic.p3, ty)?;
                    current = p2;
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    self.curve_to(current, p1, p2, p3, ty)?;
                    current = p3;
                }
                PathEl::ClosePath => {
                    self.close_path(current, start, ty)?;
                    current = start;
                }
            }
        }
        self.end_path(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl VectorDevice for Trace {
        fn begin_page(&mut self) -> DeviceResult<()> {
            Ok(())
        }
        fn set_line_width(&mut self, _: f64) -> DeviceResult<()> {
            Ok(())
        }
        fn set_line_cap(&mut self, _: LineCap) -> DeviceResult<()> {
            Ok(())
        }
        fn set_line_join(&mut self, _: LineJoin) -> DeviceResult<()> {
            Ok(())
        }
        fn set_miter_limit(&mut self, _: f64) -> DeviceResult<()> {
            Ok(())
        }
        fn set_dash(&mut self, _: &[f64], _: f64) -> DeviceResult<()> {
            Ok(())
        }
        fn set_fill_color(&mut self, _: &DrawingColor) -> DeviceResult<()> {
            Ok(())
        }
        fn set_stroke_color(&mut self, _: &DrawingColor) -> DeviceResult<()> {
            Ok(())
        }
        fn do_rect(&mut self, rect: Rect, _: PathType) -> DeviceResult<()> {
            self.0.push(format!("rect {} {} {} {}", rect.x0, rect.y0, rect.x1, rect.y1));
            Ok(())
        }
        fn begin_path(&mut self, _: PathType) -> DeviceResult<()> {
            self.0.push("begin".into());
            Ok(())
        }
        fn move_to(&mut self, _: Point, to: Point, _: PathType) -> DeviceResult<()> {
            self.0.push(format!("M {} {}", to.x, to.y));
            Ok(())
        }
        fn line_to(&mut self, _: Point, to: Point, _: PathType) -> DeviceResult<()> {
            self.0.push(format!("L {} {}", to.x, to.y));
            Ok(())
        }
        fn curve_to(
            &mut self,
            from: Point,
            c1: Point,
            c2: Point,
            to: Point,
            _: PathType,
        ) -> DeviceResult<()> {
            self.0.push(format!(
                "C {} {} {} {} {} {} from {} {}",
                c1.x, c1.y, c2.x, c2.y, to.x, to.y, from.x, from.y
            ));
            Ok(())
        }
        fn close_path(&mut self, current: Point, start: Point, _: PathType) -> DeviceResult<()> {
            self.0.push(format!("z {} {} -> {} {}", current.x, current.y, start.x, start.y));
            Ok(())
        }
        fn end_path(&mut self, _: PathType) -> DeviceResult<()> {
            self.0.push("end".into());
            Ok(())
        }
    }

    #[test]
    fn rects_take_the_fast_path() {
        let mut trace = Trace::default();
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        trace
            .do_path(&kurbo::Shape::to_path(&rect, 0.1), PathType::FILL)
            .unwrap();
        assert_eq!(trace.0, ["rect 1 2 3 4"]);
    }

    #[test]
    fn walks_segments_in_order() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.quad_to((3.0, 3.0), (6.0, 0.0));
        path.line_to((6.0, 6.0));
        path.close_path();
        let mut trace = Trace::default();
        trace.do_path(&path, PathType::STROKE).unwrap();
        assert_eq!(
            trace.0,
            [
                "begin",
                "M 0 0",
                "C 2 2 4 2 6 0 from 0 0",
                "L 6 6",
                "z 6 6 -> 0 0",
                "end",
            ]
        );
    }

    struct Bare;

    impl Device for Bare {
        type ImageEnum = ();

        fn open(&mut self) -> DeviceResult<()> {
            Ok(())
        }

        fn close(&mut self) -> DeviceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn unimplemented_callbacks_hand_off() {
        let mut dev = Bare;
        let err = dev
            .fill_page(&DrawingColor::Pure(ColorIndex::WHITE))
            .unwrap_err();
        assert!(err.is_unsupported(), "{err:?}");
        let err = dev
            .begin_typed_image(
                &ImageDesc::new(1, 1, crate::ColorSpace::DeviceGray),
                Affine::IDENTITY,
                None,
            )
            .unwrap_err();
        assert!(err.is_unsupported(), "{err:?}");
    }
}
