// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The SVG output device.

use core::fmt;

use hachure_device::{
    ClipPath, ColorClass, ColorIndex, Device, DeviceError, DeviceResult, DrawingColor,
    FillParams, FillRule, ImageDesc, ImagePlane, ImageProgress, LineCap, LineJoin, ParamList,
    ParamValue, PathType, StrokeParams, VectorDevice, VectorParams, classify,
};
use kurbo::{Affine, BezPath, Point, Rect};

use crate::clip::{ClipIds, open_clip};
use crate::format::{fmt_coeff, fmt_num, paint_attr};
use crate::groups::{GroupMark, GroupStack};
use crate::image::SvgImageEnum;
use crate::raster::RasterOp;
use crate::style::{StyleState, update};
use crate::writer::{DocumentWriter, Sink, write_footer, write_header};

/// Name of the page counter reported by [`Device::get_params`].
pub const PAGE_COUNT: &str = "PageCount";

/// Writes the drawing operations it receives as an SVG document.
///
/// Solid fills and strokes become `<path>` and `<rect>` elements inside
/// style groups. Every other paint, and every sampled image, is rendered
/// offscreen and embedded as a base64 PNG `<image>`.
///
/// Output goes to the file named by [`VectorParams::output_file`] (one file
/// per page when the name contains `%d`) or, when no file is set, to
/// in-memory documents available from [`SvgDevice::documents`].
pub struct SvgDevice {
    params: VectorParams,
    writer: Option<DocumentWriter<Sink>>,
    documents: Vec<Vec<u8>>,
    is_open: bool,
    page_open: bool,
    page_count: u32,
    documents_written: u32,
    groups: GroupStack,
    style_group_open: bool,
    style: StyleState,
    clip_ids: ClipIds,
    /// Clip for the drawable being written; taken when its definitions are
    /// emitted.
    pub(crate) active_clip: Option<ClipPath>,
    /// Clip id the current drawable references on its own element.
    clip_ref: Option<u32>,
    path_started: bool,
}

impl fmt::Debug for SvgDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvgDevice")
            .field("params", &self.params)
            .field("is_open", &self.is_open)
            .field("page_open", &self.page_open)
            .field("page_count", &self.page_count)
            .field("group_depth", &self.groups.depth())
            .field("style", &self.style)
            .field("clip_ids", &self.clip_ids.issued())
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}

impl Default for SvgDevice {
    fn default() -> Self {
        Self::new(VectorParams::default())
    }
}

impl SvgDevice {
    /// Creates a closed device.
    pub fn new(params: VectorParams) -> Self {
        Self {
            params,
            writer: None,
            documents: Vec::new(),
            is_open: false,
            page_open: false,
            page_count: 0,
            documents_written: 0,
            groups: GroupStack::default(),
            style_group_open: false,
            style: StyleState::default(),
            clip_ids: ClipIds::default(),
            active_clip: None,
            clip_ref: None,
            path_started: false,
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &VectorParams {
        &self.params
    }

    /// Pages completed by [`Device::output_page`] since the device was opened.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Returns `true` between [`Device::open`] and [`Device::close`].
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Finished in-memory documents, oldest first.
    pub fn documents(&self) -> &[Vec<u8>] {
        &self.documents
    }

    /// Removes and returns the finished in-memory documents.
    pub fn take_documents(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.documents)
    }

    /// Number of open `<g>` elements.
    pub fn group_depth(&self) -> usize {
        self.groups.depth()
    }

    fn check_open(&self) -> DeviceResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(DeviceError::Undefined("device is not open"))
        }
    }

    pub(crate) fn writer_mut(&mut self) -> DeviceResult<&mut DocumentWriter<Sink>> {
        self.writer
            .as_mut()
            .ok_or(DeviceError::Undefined("no document is being written"))
    }

    pub(crate) fn open_group(&mut self, attrs: &str) -> DeviceResult<()> {
        let w = self
            .writer
            .as_mut()
            .ok_or(DeviceError::Undefined("no document is being written"))?;
        self.groups.open(w, attrs)?;
        Ok(())
    }

    /// Closes groups back to `mark`.
    pub(crate) fn close_groups_to(&mut self, mark: GroupMark) -> DeviceResult<()> {
        if let Some(w) = self.writer.as_mut() {
            self.groups.close_to(w, mark)?;
        }
        if self.groups.depth() <= 1 {
            self.style_group_open = false;
        }
        Ok(())
    }

    /// Runs `f` and then closes every group it opened, on success and on
    /// error alike. The pending clip is cleared in both cases.
    pub(crate) fn scoped<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> DeviceResult<R>,
    ) -> DeviceResult<R> {
        let mark = self.groups.mark();
        let result = f(self);
        self.active_clip = None;
        self.clip_ref = None;
        let closed = self.close_groups_to(mark);
        let value = result?;
        closed?;
        Ok(value)
    }

    fn start_document(&mut self) -> DeviceResult<()> {
        let name = self.params.output_file_for_page(self.page_count + 1);
        let mut w = DocumentWriter::new(Sink::create(name.as_deref())?);
        write_header(&mut w, &self.params)?;
        self.writer = Some(w);
        self.clip_ids = ClipIds::default();
        self.groups = GroupStack::default();
        self.style_group_open = false;
        Ok(())
    }

    fn end_page(&mut self) -> DeviceResult<()> {
        self.close_groups_to(GroupMark::ROOT)?;
        self.writer_mut()?.write_str("</page>\n")?;
        self.page_open = false;
        Ok(())
    }

    fn finish_document(&mut self) -> DeviceResult<()> {
        if self.writer.is_none() {
            return Ok(());
        }
        if self.page_open {
            self.end_page()?;
        }
        let Some(mut w) = self.writer.take() else {
            return Ok(());
        };
        write_footer(&mut w)?;
        w.flush()?;
        self.documents_written += 1;
        match w.into_inner() {
            Sink::Memory(bytes) => self.documents.push(bytes),
            Sink::File(file) => {
                file.into_inner().map_err(|err| DeviceError::Io(err.into_error()))?;
            }
        }
        Ok(())
    }

    /// Makes sure a document and a page are open for the next drawable.
    pub(crate) fn ensure_page(&mut self) -> DeviceResult<()> {
        self.check_open()?;
        if self.writer.is_none() {
            self.start_document()?;
        }
        if !self.page_open {
            self.begin_page()?;
        }
        Ok(())
    }

    /// Writes a new style group if the style changed since the last one.
    fn flush_style(&mut self) -> DeviceResult<()> {
        if !self.style.dirty {
            return Ok(());
        }
        if self.style_group_open {
            let w = self
                .writer
                .as_mut()
                .ok_or(DeviceError::Undefined("no document is being written"))?;
            self.groups.close_one(w)?;
            self.style_group_open = false;
        }
        let attrs = self.style.group_attrs();
        self.open_group(&attrs)?;
        self.style_group_open = true;
        self.style.dirty = false;
        Ok(())
    }

    /// Drops clips that leave the page untouched.
    pub(crate) fn effective_clip(&self, clip: Option<&ClipPath>) -> Option<ClipPath> {
        clip.filter(|clip| !clip.covers(self.params.page_rect()))
            .cloned()
    }

    /// Emits the pending clip in the coordinate system `to_local` maps device
    /// space into, returning the id the drawable references.
    pub(crate) fn open_active_clip(&mut self, to_local: Affine) -> DeviceResult<Option<u32>> {
        let Some(clip) = self.active_clip.take() else {
            return Ok(None);
        };
        let clip = if to_local == Affine::IDENTITY {
            clip
        } else {
            clip.transformed(to_local)
        };
        let w = self
            .writer
            .as_mut()
            .ok_or(DeviceError::Undefined("no document is being written"))?;
        let id = open_clip(w, &mut self.groups, &mut self.clip_ids, &clip)?;
        self.clip_ref = id;
        Ok(id)
    }

    fn vector_drawable(
        &mut self,
        path: &BezPath,
        ty: PathType,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<()> {
        if path.elements().is_empty() {
            return Ok(());
        }
        self.ensure_page()?;
        self.flush_style()?;
        self.active_clip = self.effective_clip(clip);
        self.scoped(|dev| dev.do_path(path, ty))
    }

    fn apply_stroke_params(&mut self, params: &StrokeParams) -> DeviceResult<()> {
        self.set_line_width(params.width)?;
        self.set_line_cap(params.cap)?;
        self.set_line_join(params.join)?;
        self.set_miter_limit(params.miter_limit)?;
        let pattern = if params.dash.is_solid() {
            &[][..]
        } else {
            params.dash.pattern.as_slice()
        };
        self.set_dash(pattern, params.dash.offset)
    }

    /// Writes the per-drawable paint, fill rule and clip reference.
    fn write_drawable_attrs(&mut self, ty: PathType) -> DeviceResult<()> {
        let fill = ty.contains(PathType::FILL).then_some(self.style.fill).flatten();
        let stroke = ty
            .contains(PathType::STROKE)
            .then_some(self.style.stroke)
            .flatten();
        let clip_ref = self.clip_ref;
        let w = self.writer_mut()?;
        write!(w, " fill='{}' stroke='{}'", paint_attr(fill), paint_attr(stroke))?;
        if ty.contains(PathType::FILL) && ty.fill_rule() == FillRule::EvenOdd {
            w.write_str(" fill-rule='evenodd'")?;
        }
        if let Some(id) = clip_ref {
            write!(w, " clip-path='url(#clip{id})'")?;
        }
        Ok(())
    }

    fn write_segment(&mut self, args: fmt::Arguments<'_>) -> DeviceResult<()> {
        let separator = if self.path_started { " " } else { "" };
        self.path_started = true;
        let w = self.writer_mut()?;
        w.write_str(separator)?;
        w.write_fmt(args)?;
        Ok(())
    }
}

impl VectorDevice for SvgDevice {
    fn begin_page(&mut self) -> DeviceResult<()> {
        let [x_dpi, y_dpi] = self.params.hw_resolution;
        log::debug!("begin page {}", self.page_count + 1);
        self.writer_mut()?.write_str("<page>\n")?;
        self.page_open = true;
        self.open_group(&format!(
            " transform='scale({},{})' clip-path='url(#pageclip)'",
            fmt_coeff(72.0 / x_dpi),
            fmt_coeff(72.0 / y_dpi)
        ))?;
        self.style_group_open = false;
        self.style.dirty = true;
        Ok(())
    }

    fn set_line_width(&mut self, width: f64) -> DeviceResult<()> {
        update(&mut self.style.line_width, width, &mut self.style.dirty);
        Ok(())
    }

    fn set_line_cap(&mut self, cap: LineCap) -> DeviceResult<()> {
        update(&mut self.style.cap, cap, &mut self.style.dirty);
        Ok(())
    }

    fn set_line_join(&mut self, join: LineJoin) -> DeviceResult<()> {
        update(&mut self.style.join, join, &mut self.style.dirty);
        Ok(())
    }

    fn set_miter_limit(&mut self, limit: f64) -> DeviceResult<()> {
        if limit.is_nan() || limit < 1.0 {
            return Err(DeviceError::RangeCheck(format!("miter limit {limit}")));
        }
        update(&mut self.style.miter_limit, limit, &mut self.style.dirty);
        Ok(())
    }

    fn set_dash(&mut self, pattern: &[f64], offset: f64) -> DeviceResult<()> {
        if pattern.iter().any(|len| len.is_nan() || *len < 0.0) {
            return Err(DeviceError::RangeCheck(format!("dash pattern {pattern:?}")));
        }
        update(&mut self.style.dash, pattern.to_vec(), &mut self.style.dirty);
        update(&mut self.style.dash_offset, offset, &mut self.style.dirty);
        Ok(())
    }

    fn set_fill_color(&mut self, color: &DrawingColor) -> DeviceResult<()> {
        update(&mut self.style.fill, color.pure(), &mut self.style.dirty);
        Ok(())
    }

    fn set_stroke_color(&mut self, color: &DrawingColor) -> DeviceResult<()> {
        update(&mut self.style.stroke, color.pure(), &mut self.style.dirty);
        Ok(())
    }

    fn do_rect(&mut self, rect: Rect, ty: PathType) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.ensure_page()?;
        self.open_active_clip(Affine::IDENTITY)?;
        let rect = rect.abs();
        let w = self.writer_mut()?;
        write!(
            w,
            "<rect x='{}' y='{}' width='{}' height='{}'",
            fmt_num(rect.x0),
            fmt_num(rect.y0),
            fmt_num(rect.width()),
            fmt_num(rect.height())
        )?;
        self.write_drawable_attrs(ty)?;
        self.writer_mut()?.write_str("/>\n")?;
        Ok(())
    }

    fn begin_path(&mut self, ty: PathType) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.ensure_page()?;
        self.open_active_clip(Affine::IDENTITY)?;
        self.path_started = false;
        self.writer_mut()?.write_str("<path d='")?;
        Ok(())
    }

    fn move_to(&mut self, _from: Point, to: Point, ty: PathType) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.write_segment(format_args!("M{},{}", fmt_num(to.x), fmt_num(to.y)))
    }

    fn line_to(&mut self, _from: Point, to: Point, ty: PathType) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.write_segment(format_args!("L{},{}", fmt_num(to.x), fmt_num(to.y)))
    }

    fn curve_to(
        &mut self,
        _from: Point,
        c1: Point,
        c2: Point,
        to: Point,
        ty: PathType,
    ) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.write_segment(format_args!(
            "C{},{} {},{} {},{}",
            fmt_num(c1.x),
            fmt_num(c1.y),
            fmt_num(c2.x),
            fmt_num(c2.y),
            fmt_num(to.x),
            fmt_num(to.y)
        ))
    }

    fn close_path(&mut self, _current: Point, _start: Point, ty: PathType) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.write_segment(format_args!("z"))
    }

    fn end_path(&mut self, ty: PathType) -> DeviceResult<()> {
        if !ty.draws() {
            return Ok(());
        }
        self.writer_mut()?.write_str("'")?;
        self.write_drawable_attrs(ty)?;
        self.writer_mut()?.write_str("/>\n")?;
        Ok(())
    }
}

impl Device for SvgDevice {
    type ImageEnum = SvgImageEnum;

    fn open(&mut self) -> DeviceResult<()> {
        if self.is_open {
            return Ok(());
        }
        self.writer = None;
        self.is_open = true;
        self.page_open = false;
        self.page_count = 0;
        self.documents_written = 0;
        self.style = StyleState::default();
        if !self.params.separate_pages() {
            self.start_document()?;
        }
        log::debug!("opened SVG device {:?}", self.params);
        Ok(())
    }

    fn close(&mut self) -> DeviceResult<()> {
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;
        if self.writer.is_none() && self.documents_written == 0 {
            self.start_document()?;
        }
        self.finish_document()?;
        log::debug!(
            "closed SVG device after {} pages in {} documents",
            self.page_count,
            self.documents_written
        );
        Ok(())
    }

    fn output_page(&mut self, num_copies: u32, flush: bool) -> DeviceResult<()> {
        self.ensure_page()?;
        if num_copies > 1 {
            log::debug!("ignoring request for {num_copies} copies");
        }
        self.end_page()?;
        self.page_count += 1;
        if self.params.separate_pages() {
            self.finish_document()?;
        } else if flush {
            self.writer_mut()?.flush()?;
        }
        Ok(())
    }

    fn get_params(&self, list: &mut ParamList) -> DeviceResult<()> {
        self.params.get_params(list);
        list.set(PAGE_COUNT, ParamValue::Int(i64::from(self.page_count)));
        Ok(())
    }

    fn put_params(&mut self, list: &ParamList) -> DeviceResult<()> {
        let mut next = self.params.clone();
        next.put_params(list)?;
        let reopen = self.is_open && next.output_file != self.params.output_file;
        if reopen {
            self.close()?;
        }
        self.params = next;
        if reopen {
            self.open()?;
        }
        Ok(())
    }

    fn fill_path(
        &mut self,
        path: &BezPath,
        params: &FillParams,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<()> {
        self.check_open()?;
        match classify(color) {
            ColorClass::Null => Ok(()),
            ColorClass::Pure => {
                self.set_fill_color(color)?;
                self.vector_drawable(path, PathType::fill(params.rule), clip)
            }
            class => {
                if class == ColorClass::Unknown {
                    log::warn!("unrecognized fill color, rasterizing");
                }
                self.raster_drawable(path, RasterOp::Fill(params.rule), color, clip)
            }
        }
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        params: &StrokeParams,
        color: &DrawingColor,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<()> {
        self.check_open()?;
        match classify(color) {
            ColorClass::Null => Ok(()),
            ColorClass::Pure => {
                self.set_stroke_color(color)?;
                self.apply_stroke_params(params)?;
                self.vector_drawable(path, PathType::STROKE, clip)
            }
            class => {
                if class == ColorClass::Unknown {
                    log::warn!("unrecognized stroke color, rasterizing");
                }
                self.raster_drawable(path, RasterOp::Stroke(params), color, clip)
            }
        }
    }

    fn fill_rectangle(&mut self, rect: Rect, color: ColorIndex) -> DeviceResult<()> {
        self.check_open()?;
        if rect.abs().area() == 0.0 {
            return Ok(());
        }
        self.set_fill_color(&DrawingColor::Pure(color))?;
        self.ensure_page()?;
        self.flush_style()?;
        self.scoped(|dev| dev.do_rect(rect, PathType::FILL))
    }

    fn fill_page(&mut self, _color: &DrawingColor) -> DeviceResult<()> {
        // The page background stays transparent.
        log::debug!("ignoring fill_page");
        Ok(())
    }

    fn begin_typed_image(
        &mut self,
        image: &ImageDesc,
        ctm: Affine,
        clip: Option<&ClipPath>,
    ) -> DeviceResult<SvgImageEnum> {
        self.check_open()?;
        let clip = self.effective_clip(clip);
        SvgImageEnum::begin(image, ctm, clip, self.params.hw_resolution)
    }

    fn image_plane_data(
        &mut self,
        info: &mut SvgImageEnum,
        planes: &[ImagePlane<'_>],
        height: u32,
    ) -> DeviceResult<ImageProgress> {
        info.write_rows(planes, height)
    }

    fn end_image(&mut self, info: SvgImageEnum, draw_last: bool) -> DeviceResult<()> {
        if !draw_last {
            log::debug!("discarding unfinished image");
            return Ok(());
        }
        let placed = info.finish()?;
        self.ensure_page()?;
        self.active_clip = placed.clip;
        self.scoped(|dev| {
            dev.write_placed_image(placed.placement, placed.width, placed.height, &placed.png)
        })
    }
}
