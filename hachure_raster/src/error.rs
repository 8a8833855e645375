// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io;

use hachure_device::DeviceError;
use thiserror::Error;

/// Errors from offscreen rendering and PNG encoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RasterError {
    /// The pixel depth has no PNG representation.
    #[error("unsupported pixel depth {0}")]
    UnsupportedDepth(u8),
    /// A surface or image has a zero dimension.
    #[error("empty {width}x{height} raster")]
    Empty {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A surface is larger than the renderer can address.
    #[error("{width}x{height} surface exceeds the renderer limit")]
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A row buffer could not be allocated.
    #[error("out of memory allocating {0} bytes")]
    OutOfMemory(usize),
    /// A row had the wrong number of bytes.
    #[error("row has {actual} bytes, expected {expected}")]
    RowLength {
        /// Bytes supplied.
        actual: usize,
        /// Bytes required by the width and depth.
        expected: usize,
    },
    /// More rows were written than the image height.
    #[error("image already has all {0} rows")]
    TooManyRows(u32),
    /// The encoder was closed before every row was written.
    #[error("image closed after {written} of {height} rows")]
    Incomplete {
        /// Rows written.
        written: u32,
        /// Rows expected.
        height: u32,
    },
    /// An indexed color table is malformed.
    #[error("palette table of {len} bytes does not hold {entries} entries")]
    Palette {
        /// Table length in bytes.
        len: usize,
        /// Entries the color space declares.
        entries: usize,
    },
    /// The PNG encoder failed.
    #[error(transparent)]
    Encoding(#[from] png::EncodingError),
    /// Writing encoded data failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<RasterError> for DeviceError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::Io(err) => Self::Io(err),
            other => Self::Raster(Box::new(other)),
        }
    }
}
