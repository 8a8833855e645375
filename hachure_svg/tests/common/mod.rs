// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for SVG device integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]
#![allow(dead_code, reason = "Not every test binary uses every helper.")]

use std::collections::HashSet;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hachure_device::VectorParams;
use hachure_svg::SvgDevice;
use roxmltree::{Document, Node};

pub(crate) const XLINK: &str = "http://www.w3.org/1999/xlink";

/// A device drawing at 72 dpi, so device pixels are points.
pub(crate) fn device(width: f64, height: f64) -> SvgDevice {
    SvgDevice::new(
        VectorParams::default()
            .with_resolution(72.0, 72.0)
            .with_media_size(width, height),
    )
}

/// The single in-memory document written by `device`.
pub(crate) fn only_document(device: &mut SvgDevice) -> String {
    let mut docs = device.take_documents();
    assert_eq!(docs.len(), 1, "expected exactly one document");
    String::from_utf8(docs.remove(0)).expect("documents are UTF-8")
}

pub(crate) fn parse(text: &str) -> Document<'_> {
    Document::parse(text).unwrap_or_else(|err| panic!("invalid XML ({err}):\n{text}"))
}

pub(crate) fn elements<'a, 'input>(
    doc: &'a Document<'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants().filter(move |n| n.tag_name().name() == name)
}

/// Checks that clip ids are unique and that every reference resolves.
pub(crate) fn assert_clip_references(doc: &Document<'_>) {
    let mut ids = HashSet::new();
    for def in elements(doc, "clipPath") {
        let id = def.attribute("id").expect("clipPath has an id");
        assert!(ids.insert(id.to_owned()), "clip id {id} is repeated");
    }
    for node in doc.descendants().filter(|n| n.is_element()) {
        if let Some(reference) = node.attribute("clip-path") {
            let id = reference
                .strip_prefix("url(#")
                .and_then(|r| r.strip_suffix(')'))
                .expect("clip-path is a url reference");
            assert!(ids.contains(id), "clip-path refers to missing {id}");
        }
    }
}

/// A decoded embedded PNG.
#[derive(Debug)]
pub(crate) struct Embedded {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) color: png::ColorType,
    pub(crate) pixels: Vec<u8>,
    pub(crate) pixel_dims: Option<png::PixelDimensions>,
}

/// Decodes the PNG behind an `<image>` element, expanding palettes and
/// low bit depths to eight bits per channel.
pub(crate) fn decode_image(image: Node<'_, '_>) -> Embedded {
    let href = image
        .attribute((XLINK, "href"))
        .expect("image has an xlink:href");
    let data = href
        .strip_prefix("data:image/png;base64,")
        .expect("image is an inline PNG");
    let bytes = STANDARD.decode(data).expect("valid base64");
    let mut decoder = png::Decoder::new(bytes.as_slice());
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info().expect("valid PNG header");
    let mut pixels = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut pixels).expect("valid PNG data");
    pixels.truncate(frame.buffer_size());
    Embedded {
        width: frame.width,
        height: frame.height,
        color: frame.color_type,
        pixels,
        pixel_dims: reader.info().pixel_dims,
    }
}

/// Parses `matrix(a b c d e f)`.
pub(crate) fn parse_matrix(transform: &str) -> [f64; 6] {
    let inner = transform
        .strip_prefix("matrix(")
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or_else(|| panic!("not a matrix: {transform}"));
    let values: Vec<f64> = inner
        .split(' ')
        .map(|v| v.parse().expect("numeric coefficient"))
        .collect();
    values.try_into().expect("six coefficients")
}
