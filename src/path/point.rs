// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Points in an editable contour

use crate::model::EntityId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What role a point plays in its contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// On-curve point whose handles move independently
    Corner,
    /// On-curve point whose handles stay collinear through it
    Smooth,
    /// Bézier control handle owned by a neighbouring on-curve point
    OffCurve,
}

impl PointKind {
    pub fn is_on_curve(self) -> bool {
        !matches!(self, PointKind::OffCurve)
    }
}

/// A single point in a contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub id: EntityId,
    /// Position in canvas (design) space
    pub point: Point,
    pub kind: PointKind,
}

impl PathPoint {
    /// A new corner point with a fresh id
    pub fn corner(point: Point) -> Self {
        Self::new(point, PointKind::Corner)
    }

    /// A new smooth point with a fresh id
    pub fn smooth(point: Point) -> Self {
        Self::new(point, PointKind::Smooth)
    }

    /// A new off-curve handle with a fresh id
    pub fn off_curve(point: Point) -> Self {
        Self::new(point, PointKind::OffCurve)
    }

    pub fn new(point: Point, kind: PointKind) -> Self {
        Self {
            id: EntityId::next(),
            point,
            kind,
        }
    }

    pub fn is_on_curve(&self) -> bool {
        self.kind.is_on_curve()
    }

    pub fn is_off_curve(&self) -> bool {
        !self.kind.is_on_curve()
    }
}
