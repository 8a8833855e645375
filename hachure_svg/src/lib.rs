// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=hachure_svg --heading-base-level=0

//! Hachure SVG: a streaming SVG output device.
//!
//! [`SvgDevice`] implements [`Device`](hachure_device::Device) and
//! [`VectorDevice`](hachure_device::VectorDevice). Markup is written as the
//! host draws and nothing is buffered beyond the element being written:
//!
//! - Solid fills and strokes become `<rect>` and `<path>` elements. Line
//!   style and paint are written once per run of drawables in a style group
//!   and only rewritten when they change.
//! - Clips become inline `<clipPath>` definitions. An intersection of several
//!   regions nests one clipping group per region.
//! - Patterns, shadings, halftones, separations and sampled images are
//!   rendered offscreen with [`hachure_raster`] and embedded as base64 PNG
//!   `<image>` elements.
//!
//! Each page is a `<page>` inside a `<pageSet>`, scaled from device pixels to
//! points and clipped to the media box. When the output file name contains a
//! `%d` field every page gets its own document.
//!
//! ```
//! use hachure_device::{ColorIndex, Device, VectorParams};
//! use hachure_svg::SvgDevice;
//! use kurbo::Rect;
//!
//! let params = VectorParams::default()
//!     .with_resolution(72.0, 72.0)
//!     .with_media_size(100.0, 100.0);
//! let mut device = SvgDevice::new(params);
//! device.open().unwrap();
//! device
//!     .fill_rectangle(Rect::new(10.0, 10.0, 50.0, 30.0), ColorIndex::BLACK)
//!     .unwrap();
//! device.output_page(1, true).unwrap();
//! device.close().unwrap();
//!
//! let svg = String::from_utf8(device.take_documents().remove(0)).unwrap();
//! assert!(svg.contains("<rect x='10' y='10' width='40' height='20'"));
//! ```

mod clip;
mod device;
mod format;
mod groups;
mod image;
mod raster;
mod style;
mod writer;

pub use device::{PAGE_COUNT, SvgDevice};
pub use image::SvgImageEnum;
