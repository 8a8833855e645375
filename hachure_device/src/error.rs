// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported across the device boundary.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Result alias used by every device callback.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors a device callback can report to the host.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeviceError {
    /// The output stream failed.
    #[error("output stream error")]
    Io(#[from] io::Error),
    /// A value was outside the range the device accepts.
    #[error("value out of range: {0}")]
    RangeCheck(String),
    /// A parameter had the wrong type.
    #[error("parameter `{key}` has the wrong type, expected {expected}")]
    TypeCheck {
        /// Parameter name.
        key: String,
        /// Human readable description of the expected type.
        expected: &'static str,
    },
    /// Rasterization or image encoding failed.
    #[error("raster fallback failed")]
    Raster(#[source] Box<dyn StdError + Send + Sync + 'static>),
    /// The device does not implement this request; the host should use its
    /// default implementation instead.
    #[error("{0} is not handled by this device")]
    Unsupported(&'static str),
    /// The request is not valid in the device's current state.
    #[error("undefined: {0}")]
    Undefined(&'static str),
}

impl DeviceError {
    /// Returns `true` when the host should fall back to its own default
    /// implementation of the request.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub(crate) fn range_check(what: impl Into<String>) -> Self {
        Self::RangeCheck(what.into())
    }
}
