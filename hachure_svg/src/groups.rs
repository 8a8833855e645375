// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nesting of `<g>` elements.

use std::io::{self, Write};

use crate::writer::DocumentWriter;

/// A saved group depth to close back to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct GroupMark(usize);

impl GroupMark {
    /// No groups open.
    pub(crate) const ROOT: Self = Self(0);
}

/// Counts open `<g>` elements so that every one is closed exactly once.
///
/// The depth only changes after the corresponding tag was written, so it
/// always matches the bytes in the output.
#[derive(Debug, Default)]
pub(crate) struct GroupStack {
    depth: usize,
}

impl GroupStack {
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn mark(&self) -> GroupMark {
        GroupMark(self.depth)
    }

    /// Opens `<g` + `attrs` + `>`. `attrs` starts with a space when non-empty.
    pub(crate) fn open<W: Write>(&mut self, w: &mut DocumentWriter<W>, attrs: &str) -> io::Result<()> {
        writeln!(w, "<g{attrs}>")?;
        self.depth += 1;
        Ok(())
    }

    /// Closes the innermost group, if any.
    pub(crate) fn close_one<W: Write>(&mut self, w: &mut DocumentWriter<W>) -> io::Result<()> {
        if self.depth == 0 {
            return Ok(());
        }
        w.write_str("</g>\n")?;
        self.depth -= 1;
        Ok(())
    }

    /// Closes groups until the depth is back at `mark`.
    pub(crate) fn close_to<W: Write>(
        &mut self,
        w: &mut DocumentWriter<W>,
        mark: GroupMark,
    ) -> io::Result<()> {
        while self.depth > mark.0 {
            self.close_one(w)?;
        }
        Ok(())
    }
}
