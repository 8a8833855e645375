// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forward-only document output.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use hachure_device::VectorParams;
use hachure_raster::data_uri;

use crate::format::fmt_num;

const XML_DECL: &str = "<?xml version=\"1.0\" standalone=\"no\"?>\n";

/// Where a document goes.
#[derive(Debug)]
pub(crate) enum Sink {
    File(BufWriter<File>),
    Memory(Vec<u8>),
}

impl Sink {
    /// A file sink for `name`, or an in-memory sink when there is no name.
    pub(crate) fn create(name: Option<&str>) -> io::Result<Self> {
        Ok(match name {
            Some(name) => {
                log::debug!("writing SVG document to {name}");
                Self::File(BufWriter::new(File::create(name)?))
            }
            None => Self::Memory(Vec::new()),
        })
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.write(buf),
            Self::Memory(bytes) => bytes.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(file) => file.flush(),
            Self::Memory(_) => Ok(()),
        }
    }
}

/// Streams markup to an output without buffering whole elements.
#[derive(Debug)]
pub(crate) struct DocumentWriter<W> {
    inner: W,
}

impl<W: Write> DocumentWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self { inner }
    }

    pub(crate) fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.inner.write_all(s.as_bytes())
    }

    /// Lets `write!` and `writeln!` target the writer directly.
    pub(crate) fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.inner.write_fmt(args)
    }

    /// Writes the base64 encoding of `bytes`.
    pub(crate) fn write_base64(&mut self, bytes: &[u8]) -> io::Result<()> {
        data_uri::write_base64(&mut self.inner, bytes)
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }
}

/// Writes everything up to and including `<pageSet>`.
pub(crate) fn write_header<W: Write>(
    w: &mut DocumentWriter<W>,
    params: &VectorParams,
) -> io::Result<()> {
    let [width_pt, height_pt] = params.media_size.map(fmt_num);
    w.write_str(XML_DECL)?;
    writeln!(
        w,
        "<svg xmlns='http://www.w3.org/2000/svg' version='1.1' \
         xmlns:xlink='http://www.w3.org/1999/xlink'\n\t\
         width='{width_pt}pt' height='{height_pt}pt' viewBox='0 0 {width_pt} {height_pt}'>"
    )?;
    writeln!(
        w,
        "<defs><clipPath id='pageclip'><rect x='0' y='0' width='{}' height='{}'/></clipPath></defs>",
        params.width_px(),
        params.height_px()
    )?;
    w.write_str("<pageSet>\n")
}

/// Closes `<pageSet>` and `<svg>`.
pub(crate) fn write_footer<W: Write>(w: &mut DocumentWriter<W>) -> io::Result<()> {
    w.write_str("</pageSet>\n</svg>\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_declares_size_and_page_clip() {
        let params = VectorParams::default()
            .with_resolution(144.0, 144.0)
            .with_media_size(100.0, 50.0);
        let mut w = DocumentWriter::new(Vec::new());
        write_header(&mut w, &params).unwrap();
        write_footer(&mut w).unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" standalone=\"no\"?>\n<svg "));
        assert!(text.contains("\n\twidth='100pt' height='50pt' viewBox='0 0 100 50'>"));
        assert!(text.contains("<rect x='0' y='0' width='200' height='100'/>"));
        assert!(text.ends_with("<pageSet>\n</pageSet>\n</svg>\n"));
    }

    #[test]
    fn base64_is_streamed() {
        let mut w = DocumentWriter::new(Vec::new());
        w.write_str("x='").unwrap();
        w.write_base64(b"Man").unwrap();
        w.write_str("'").unwrap();
        assert_eq!(w.into_inner(), b"x='TWFu'");
    }
}
