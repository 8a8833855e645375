// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inline `<clipPath>` definitions and the groups that apply them.

use std::io::{self, Write};

use hachure_device::{ClipPath, ClipRegion, FillRule};

use crate::format::bez_path_to_svg_d;
use crate::groups::GroupStack;
use crate::writer::DocumentWriter;

/// Issues `clipN` ids, starting at 1 and never repeating within a document.
#[derive(Debug, Default)]
pub(crate) struct ClipIds {
    last: u32,
}

impl ClipIds {
    pub(crate) fn next_id(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    pub(crate) fn issued(&self) -> u32 {
        self.last
    }
}

pub(crate) fn write_clip_def<W: Write>(
    w: &mut DocumentWriter<W>,
    id: u32,
    region: &ClipRegion,
) -> io::Result<()> {
    write!(
        w,
        "<clipPath id='clip{id}'><path d='{}'",
        bez_path_to_svg_d(&region.path)
    )?;
    if region.fill_rule == FillRule::EvenOdd {
        w.write_str(" clip-rule='evenodd'")?;
    }
    w.write_str("/></clipPath>\n")
}

/// Writes one definition per region and opens a clipping group for every
/// region but the last. Returns the id the drawable itself must reference,
/// or `None` when the clip has no regions.
///
/// Nesting gives intersection semantics; the caller closes the groups.
pub(crate) fn open_clip<W: Write>(
    w: &mut DocumentWriter<W>,
    groups: &mut GroupStack,
    ids: &mut ClipIds,
    clip: &ClipPath,
) -> io::Result<Option<u32>> {
    let Some((last, outer)) = clip.regions().split_last() else {
        return Ok(None);
    };
    for region in outer {
        let id = ids.next_id();
        write_clip_def(w, id, region)?;
        groups.open(w, &format!(" clip-path='url(#clip{id})'"))?;
    }
    let id = ids.next_id();
    write_clip_def(w, id, last)?;
    Ok(Some(id))
}
