// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path type flags, rectangle detection and clip paths.

use core::slice;

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape};
use smallvec::SmallVec;

pub use peniko::Fill as FillRule;

bitflags::bitflags! {
    /// What a path walk is for.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PathType: u8 {
        /// The path is filled.
        const FILL = 1 << 0;
        /// The path is stroked.
        const STROKE = 1 << 1;
        /// The path contributes to a clip.
        const CLIP = 1 << 2;
        /// Fills use the even-odd rule.
        const EVEN_ODD = 1 << 3;
    }
}

impl PathType {
    /// Path type for a fill with the given rule.
    pub fn fill(rule: FillRule) -> Self {
        match rule {
            FillRule::NonZero => Self::FILL,
            FillRule::EvenOdd => Self::FILL | Self::EVEN_ODD,
        }
    }

    /// Returns `true` when the path produces visible marks.
    pub fn draws(self) -> bool {
        self.intersects(Self::FILL | Self::STROKE)
    }

    /// The fill rule selected by these flags.
    pub fn fill_rule(self) -> FillRule {
        if self.contains(Self::EVEN_ODD) {
            FillRule::EvenOdd
        } else {
            FillRule::NonZero
        }
    }
}

/// Returns the rectangle a path describes if it is a single closed,
/// axis-aligned quadrilateral.
pub fn path_as_rect(path: &BezPath) -> Option<Rect> {
    let corners = match path.elements() {
        [
            PathEl::MoveTo(a),
            PathEl::LineTo(b),
            PathEl::LineTo(c),
            PathEl::LineTo(d),
            PathEl::ClosePath,
        ] => [*a, *b, *c, *d],
        [
            PathEl::MoveTo(a),
            PathEl::LineTo(b),
            PathEl::LineTo(c),
            PathEl::LineTo(d),
            PathEl::LineTo(e),
            PathEl::ClosePath,
        ] if e == a => [*a, *b, *c, *d],
        _ => return None,
    };
    is_axis_aligned(corners).then(|| Rect::from_points(corners[0], corners[2]))
}

fn is_axis_aligned([a, b, c, d]: [Point; 4]) -> bool {
    let horizontal_first = a.y == b.y && b.x == c.x && c.y == d.y && d.x == a.x;
    let vertical_first = a.x == b.x && b.y == c.y && c.x == d.x && d.y == a.y;
    horizontal_first || vertical_first
}

/// One clip region: a closed device-space path and the rule that decides
/// its inside.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipRegion {
    /// Region outline in device space.
    pub path: BezPath,
    /// Inside test.
    pub fill_rule: FillRule,
}

impl ClipRegion {
    /// Creates a region.
    pub fn new(path: BezPath, fill_rule: FillRule) -> Self {
        Self { path, fill_rule }
    }

    /// A rectangular region.
    pub fn rect(rect: Rect) -> Self {
        Self::new(rect.to_path(0.1), FillRule::NonZero)
    }

    /// Bounding box of the region outline.
    pub fn bounding_box(&self) -> Rect {
        self.path.bounding_box()
    }
}

/// A clip path as seen by a device.
///
/// A clip is either one region or the intersection of several.
#[derive(Clone, Debug, PartialEq)]
pub enum ClipPath {
    /// A single region.
    Single(ClipRegion),
    /// The intersection of all listed regions.
    Intersection(SmallVec<[ClipRegion; 2]>),
}

impl ClipPath {
    /// A rectangular clip.
    pub fn rect(rect: Rect) -> Self {
        Self::Single(ClipRegion::rect(rect))
    }

    /// A clip from one path and rule.
    pub fn from_path(path: BezPath, fill_rule: FillRule) -> Self {
        Self::Single(ClipRegion::new(path, fill_rule))
    }

    /// The intersection of `regions`. A single region collapses to
    /// [`ClipPath::Single`].
    pub fn intersection(regions: impl IntoIterator<Item = ClipRegion>) -> Self {
        let mut regions: SmallVec<[ClipRegion; 2]> = regions.into_iter().collect();
        if regions.len() == 1 {
            if let Some(region) = regions.pop() {
                return Self::Single(region);
            }
        }
        Self::Intersection(regions)
    }

    /// The regions in application order.
    pub fn regions(&self) -> &[ClipRegion] {
        match self {
            Self::Single(region) => slice::from_ref(region),
            Self::Intersection(regions) => regions,
        }
    }

    /// Bounding box of the clipped area, or `None` when the clip has no
    /// regions and so does not restrict anything.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.regions()
            .iter()
            .map(ClipRegion::bounding_box)
            .reduce(|acc, bbox| acc.intersect(bbox))
    }

    /// Returns `true` when clipping to this path leaves `area` untouched.
    pub fn covers(&self, area: Rect) -> bool {
        self.regions().iter().all(|region| {
            path_as_rect(&region.path).is_some_and(|rect| {
                rect.x0 <= area.x0 && rect.y0 <= area.y0 && rect.x1 >= area.x1 && rect.y1 >= area.y1
            })
        })
    }

    /// Maps every region through `xf`.
    pub fn transformed(&self, xf: Affine) -> Self {
        let map = |region: &ClipRegion| ClipRegion::new(xf * region.path.clone(), region.fill_rule);
        match self {
            Self::Single(region) => Self::Single(map(region)),
            Self::Intersection(regions) => Self::Intersection(regions.iter().map(map).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(points: [(f64, f64); 4]) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        path.close_path();
        path
    }

    #[test]
    fn detects_axis_aligned_rects() {
        let path = quad([(10.0, 10.0), (50.0, 10.0), (50.0, 30.0), (10.0, 30.0)]);
        assert_eq!(path_as_rect(&path), Some(Rect::new(10.0, 10.0, 50.0, 30.0)));

        let counter = quad([(50.0, 30.0), (50.0, 10.0), (10.0, 10.0), (10.0, 30.0)]);
        assert_eq!(
            path_as_rect(&counter),
            Some(Rect::new(10.0, 10.0, 50.0, 30.0)),
            "winding direction does not matter"
        );
    }

    #[test]
    fn explicit_closing_segment_is_a_rect() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((4.0, 0.0));
        path.line_to((4.0, 2.0));
        path.line_to((0.0, 2.0));
        path.line_to((0.0, 0.0));
        path.close_path();
        assert_eq!(path_as_rect(&path), Some(Rect::new(0.0, 0.0, 4.0, 2.0)));
    }

    #[test]
    fn rejects_non_rects() {
        let skew = quad([(0.0, 0.0), (4.0, 1.0), (4.0, 2.0), (0.0, 2.0)]);
        assert_eq!(path_as_rect(&skew), None, "skewed quad");

        let mut open = BezPath::new();
        open.move_to((0.0, 0.0));
        open.line_to((4.0, 0.0));
        open.line_to((4.0, 2.0));
        open.line_to((0.0, 2.0));
        assert_eq!(path_as_rect(&open), None, "unclosed path");

        let mut curve = BezPath::new();
        curve.move_to((0.0, 0.0));
        curve.curve_to((1.0, 0.0), (2.0, 0.0), (3.0, 0.0));
        curve.close_path();
        assert_eq!(path_as_rect(&curve), None, "curves");
    }

    #[test]
    fn path_type_flags() {
        assert!(PathType::FILL.draws());
        assert!(PathType::STROKE.draws());
        assert!(!PathType::CLIP.draws(), "clip-only paths draw nothing");
        assert_eq!(PathType::fill(FillRule::EvenOdd).fill_rule(), FillRule::EvenOdd);
        assert_eq!(PathType::fill(FillRule::NonZero).fill_rule(), FillRule::NonZero);
    }

    #[test]
    fn intersection_bbox_and_collapse() {
        let a = ClipRegion::rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = ClipRegion::rect(Rect::new(25.0, 10.0, 100.0, 40.0));
        let clip = ClipPath::intersection([a.clone(), b]);
        assert_eq!(clip.regions().len(), 2);
        assert_eq!(clip.bounding_box(), Some(Rect::new(25.0, 10.0, 50.0, 40.0)));

        let single = ClipPath::intersection([a]);
        assert!(matches!(single, ClipPath::Single(_)), "one region collapses");

        let empty = ClipPath::intersection(Vec::new());
        assert_eq!(empty.bounding_box(), None);
        assert!(empty.covers(Rect::new(0.0, 0.0, 1e6, 1e6)), "no regions clip nothing");
    }

    #[test]
    fn covers_page() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(ClipPath::rect(Rect::new(-1.0, -1.0, 101.0, 101.0)).covers(page));
        assert!(!ClipPath::rect(Rect::new(0.0, 0.0, 50.0, 100.0)).covers(page));
        let mut tri = BezPath::new();
        tri.move_to((0.0, 0.0));
        tri.line_to((1000.0, 0.0));
        tri.line_to((0.0, 1000.0));
        tri.close_path();
        assert!(
            !ClipPath::from_path(tri, FillRule::NonZero).covers(page),
            "only rectangles are recognized"
        );
    }

    #[test]
    fn transformed_maps_regions() {
        let clip = ClipPath::rect(Rect::new(10.0, 10.0, 20.0, 20.0));
        let moved = clip.transformed(Affine::translate((-10.0, -10.0)));
        assert_eq!(moved.bounding_box(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }
}
