// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=hachure_raster --heading-base-level=0

//! Hachure Raster: the raster side of a vector device.
//!
//! Content a vector output format cannot express directly (patterns,
//! shadings, halftones, sampled images) is rendered into a small bitmap and
//! embedded as a PNG. This crate provides the three pieces of that path:
//!
//! - [`OffscreenSurface`]: a bounding-box sized [`vello_cpu`] render target
//!   that draws one device-space fill or stroke with any
//!   [`DrawingColor`](hachure_device::DrawingColor) and clip, then yields
//!   rows in the device's [`SurfaceFormat`].
//! - [`PngEncoder`]: a scanline PNG writer for 1, 8 (gray or indexed), 24,
//!   32 and 48 bit rows, including palette construction from indexed color
//!   spaces.
//! - [`data_uri`]: base64 encoding for `data:image/png;base64,` URIs.
//!
//! ```
//! use hachure_device::{ColorIndex, DrawingColor, FillRule};
//! use hachure_raster::{OffscreenSurface, PixelBounds, SurfaceFormat};
//! use kurbo::{Rect, Shape};
//!
//! let bounds = PixelBounds::round_out(Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();
//! let mut surface = OffscreenSurface::new(bounds, SurfaceFormat::Rgba32).unwrap();
//! surface.fill_path(
//!     &Rect::new(10.0, 10.0, 20.0, 20.0).to_path(0.1),
//!     FillRule::NonZero,
//!     &DrawingColor::Pure(ColorIndex::BLACK),
//!     None,
//! );
//! let png = surface.finish().encode_png([72.0, 72.0]).unwrap();
//! let uri = hachure_raster::data_uri::png_data_uri(&png);
//! assert!(uri.starts_with("data:image/png;base64,"));
//! ```

pub mod data_uri;
mod encoder;
mod error;
mod paint;
mod surface;

pub use encoder::{Palette, PixelDepth, PngEncoder};
pub use error::RasterError;
pub use surface::{OffscreenSurface, PixelBounds, RasterImage, SurfaceFormat};
