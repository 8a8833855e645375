// Copyright 2026 the Hachure Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke parameters.

use kurbo::{Cap, Join, Stroke};
use smallvec::SmallVec;

use crate::{DeviceError, DeviceResult};

/// Line cap as numbered by the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Semicircular end.
    Round,
    /// Flat end extended by half the line width.
    Square,
    /// Triangular end.
    Triangle,
    /// Unrecognized cap.
    Unknown,
}

impl TryFrom<i32> for LineCap {
    type Error = DeviceError;

    fn try_from(value: i32) -> DeviceResult<Self> {
        Ok(match value {
            0 => Self::Butt,
            1 => Self::Round,
            2 => Self::Square,
            3 => Self::Triangle,
            4 => Self::Unknown,
            other => return Err(DeviceError::range_check(format!("line cap {other}"))),
        })
    }
}

impl LineCap {
    /// The closest cap a generic stroker supports.
    pub fn to_kurbo(self) -> Cap {
        match self {
            Self::Round => Cap::Round,
            Self::Square => Cap::Square,
            Self::Butt | Self::Triangle | Self::Unknown => Cap::Butt,
        }
    }
}

/// Line join as numbered by the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
    /// No join.
    None,
    /// Triangular join.
    Triangle,
    /// Unrecognized join.
    Unknown,
}

impl TryFrom<i32> for LineJoin {
    type Error = DeviceError;

    fn try_from(value: i32) -> DeviceResult<Self> {
        Ok(match value {
            0 => Self::Miter,
            1 => Self::Round,
            2 => Self::Bevel,
            3 => Self::None,
            4 => Self::Triangle,
            5 => Self::Unknown,
            other => return Err(DeviceError::range_check(format!("line join {other}"))),
        })
    }
}

impl LineJoin {
    /// The closest join a generic stroker supports.
    pub fn to_kurbo(self) -> Join {
        match self {
            Self::Round => Join::Round,
            Self::Bevel | Self::None | Self::Triangle => Join::Bevel,
            Self::Miter | Self::Unknown => Join::Miter,
        }
    }
}

/// Dash pattern. An empty pattern is a solid line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dash {
    /// Alternating on/off lengths.
    pub pattern: SmallVec<[f64; 4]>,
    /// Distance into the pattern at which the stroke starts.
    pub offset: f64,
}

impl Dash {
    /// A solid line.
    pub fn solid() -> Self {
        Self::default()
    }

    /// Returns `true` for a solid line.
    pub fn is_solid(&self) -> bool {
        self.pattern.is_empty() || self.pattern.iter().all(|len| *len == 0.0)
    }
}

/// Everything that affects how a path is stroked. All lengths are in device
/// pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeParams {
    /// Line width.
    pub width: f64,
    /// Cap style.
    pub cap: LineCap,
    /// Join style.
    pub join: LineJoin,
    /// Miter limit.
    pub miter_limit: f64,
    /// Dash pattern.
    pub dash: Dash,
}

impl Default for StrokeParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dash: Dash::solid(),
        }
    }
}

impl StrokeParams {
    /// A solid stroke of the given width with default cap, join and miter limit.
    pub fn with_width(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Converts to a [`kurbo::Stroke`].
    pub fn to_kurbo(&self) -> Stroke {
        let mut stroke = Stroke::new(self.width);
        stroke.join = self.join.to_kurbo();
        stroke.miter_limit = self.miter_limit;
        stroke.start_cap = self.cap.to_kurbo();
        stroke.end_cap = self.cap.to_kurbo();
        if !self.dash.is_solid() {
            stroke = stroke.with_dashes(self.dash.offset, self.dash.pattern.iter().copied());
        }
        stroke
    }

    /// How far the stroke can reach outside the path's bounding box.
    pub fn outset(&self) -> f64 {
        let half = self.width.abs() * 0.5;
        let join_scale = match self.join {
            LineJoin::Miter | LineJoin::Unknown => self.miter_limit.max(1.0),
            _ => 1.0,
        };
        let cap_scale = match self.cap {
            LineCap::Square => core::f64::consts::SQRT_2,
            _ => 1.0,
        };
        half * join_scale.max(cap_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_range_check() {
        assert_eq!(LineCap::try_from(1).unwrap(), LineCap::Round);
        assert_eq!(LineCap::try_from(4).unwrap(), LineCap::Unknown);
        assert!(matches!(LineCap::try_from(5), Err(DeviceError::RangeCheck(_))));
        assert!(matches!(LineCap::try_from(-1), Err(DeviceError::RangeCheck(_))));
    }

    #[test]
    fn join_range_check() {
        assert_eq!(LineJoin::try_from(2).unwrap(), LineJoin::Bevel);
        assert_eq!(LineJoin::try_from(5).unwrap(), LineJoin::Unknown);
        assert!(matches!(LineJoin::try_from(6), Err(DeviceError::RangeCheck(_))));
    }

    #[test]
    fn defaults_match_device_defaults() {
        let params = StrokeParams::default();
        assert_eq!(params.width, 1.0);
        assert_eq!(params.cap, LineCap::Butt);
        assert_eq!(params.join, LineJoin::Miter);
        assert_eq!(params.miter_limit, 4.0);
        assert!(params.dash.is_solid(), "default stroke is solid");
    }

    #[test]
    fn kurbo_conversion() {
        let params = StrokeParams {
            width: 3.0,
            cap: LineCap::Square,
            join: LineJoin::Round,
            miter_limit: 10.0,
            dash: Dash {
                pattern: SmallVec::from_slice(&[2.0, 1.0]),
                offset: 0.5,
            },
        };
        let stroke = params.to_kurbo();
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.start_cap, Cap::Square);
        assert_eq!(stroke.join, Join::Round);
        assert_eq!(stroke.dash_pattern.as_slice(), &[2.0, 1.0]);
        assert_eq!(stroke.dash_offset, 0.5);
    }

    #[test]
    fn outset_accounts_for_miters() {
        let params = StrokeParams::with_width(2.0);
        assert_eq!(params.outset(), 4.0, "half width times miter limit");
        let round = StrokeParams {
            join: LineJoin::Round,
            ..StrokeParams::with_width(2.0)
        };
        assert_eq!(round.outset(), 1.0);
    }
}
