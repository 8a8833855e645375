// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Base64 `data:` URIs for embedded images.

use std::io::{self, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;

/// Prefix of an embedded PNG.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Number of `=` characters terminating the encoding of `len` bytes.
pub fn padding(len: usize) -> usize {
    (3 - len % 3) % 3
}

/// Length of the base64 encoding of `len` bytes.
pub fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Encodes `bytes` as standard padded base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Streams the base64 encoding of `bytes` into `out` without building the
/// whole string first.
pub fn write_base64<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    let mut encoder = EncoderWriter::new(out, &STANDARD);
    encoder.write_all(bytes)?;
    encoder.finish()?;
    Ok(())
}

/// A complete `data:image/png;base64,…` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + encoded_len(png.len()));
    uri.push_str(PNG_DATA_URI_PREFIX);
    STANDARD.encode_string(png, &mut uri);
    uri
}
