// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=hachure_device --heading-base-level=0

//! Hachure Device: the boundary between a host imaging engine and an output
//! device.
//!
//! The host interprets a page description and calls into a device once per
//! drawing operation. This crate defines what those calls carry and the
//! traits a device implements:
//!
//! - [`Device`]: one method per host callback (open/close, pages, parameters,
//!   fills, strokes, images). Methods a device does not handle return
//!   [`DeviceError::Unsupported`] so the host can fall back to its default.
//! - [`VectorDevice`]: state setters and path-construction hooks, plus a
//!   provided [`VectorDevice::do_path`] walker that turns a [`kurbo::BezPath`]
//!   into hook calls.
//! - [`DrawingColor`] and [`classify`]: the paint of a drawing call and the
//!   [`ColorClass`] that decides whether it can be drawn as vector content.
//! - [`ClipPath`], [`PathType`], [`StrokeParams`], [`ImageDesc`] and
//!   [`VectorParams`].
//!
//! All geometry handed to a device is in device pixels.

mod color;
mod device;
mod error;
mod image;
mod params;
mod path;
mod stroke;

pub use color::{ColorClass, ColorIndex, DrawingColor, HalftoneCell, Tile, classify};
pub use device::{Device, FillParams, VectorDevice};
pub use error::{DeviceError, DeviceResult};
pub use image::{ColorSpace, ImageDesc, ImageFormat, ImagePlane, ImageProgress, IndexedBase};
pub use params::{ParamList, ParamValue, VectorParams, keys};
pub use path::{ClipPath, ClipRegion, FillRule, PathType, path_as_rect};
pub use stroke::{Dash, LineCap, LineJoin, StrokeParams};

pub use kurbo;
pub use peniko;
