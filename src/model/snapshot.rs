// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Self-contained serialized copies of a glyph's editable state.
//!
//! A `GlyphSnapshot` is what the undo stack stores, what the clipboard
//! carries, and what the replay CLI reads and prints. Contours are always
//! captured; anchors, components and guidelines only when the
//! [`SnapshotScope`] asks for them. Ids are kept so a restored glyph still
//! matches selections and hit-test results taken before the snapshot.

use crate::error::Result;
use crate::model::EntityId;
use crate::model::glyph::{Anchor, Component, Glyph, Guideline};
use crate::path::{Contour, PathPoint, PointKind};
use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Which element categories besides contours a snapshot covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotScope {
    pub anchors: bool,
    pub components: bool,
    pub guidelines: bool,
}

impl SnapshotScope {
    /// Contours only
    pub const CONTOURS: Self = Self {
        anchors: false,
        components: false,
        guidelines: false,
    };

    /// Everything editable
    pub const ALL: Self = Self {
        anchors: true,
        components: true,
        guidelines: true,
    };
}

impl Default for SnapshotScope {
    fn default() -> Self {
        Self::CONTOURS
    }
}

/// Serialized form of a glyph, restricted to a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphSnapshot {
    pub name: String,
    pub width: f64,
    #[serde(default)]
    pub scope: SnapshotScope,
    #[serde(default)]
    pub contours: Vec<ContourData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<AnchorData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guidelines: Vec<GuidelineData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourData {
    #[serde(default = "EntityId::next")]
    pub id: EntityId,
    pub closed: bool,
    pub points: Vec<PointData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointData {
    #[serde(default = "EntityId::next")]
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub kind: PointKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorData {
    #[serde(default = "EntityId::next")]
    pub id: EntityId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    #[serde(default = "EntityId::next")]
    pub id: EntityId,
    pub base: String,
    /// Affine coefficients `[xx, xy, yx, yy, dx, dy]`
    pub transform: [f64; 6],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineData {
    #[serde(default = "EntityId::next")]
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl GlyphSnapshot {
    /// Capture the editable state of `glyph` restricted to `scope`
    pub fn capture(glyph: &Glyph, scope: SnapshotScope) -> Self {
        Self {
            name: glyph.name.clone(),
            width: glyph.width,
            scope,
            contours: glyph.contours.iter().map(ContourData::from_contour).collect(),
            anchors: if scope.anchors {
                glyph.anchors.iter().map(AnchorData::from_anchor).collect()
            } else {
                Vec::new()
            },
            components: if scope.components {
                glyph
                    .components
                    .iter()
                    .map(ComponentData::from_component)
                    .collect()
            } else {
                Vec::new()
            },
            guidelines: if scope.guidelines {
                glyph.guidelines.iter().map(GuidelineData::from_guideline).collect()
            } else {
                Vec::new()
            },
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Replace the scoped parts of `glyph` with this snapshot's content
    ///
    /// Categories outside the scope are left untouched.
    pub fn restore_into(&self, glyph: &mut Glyph) {
        glyph.width = self.width;
        glyph.contours = self.contours();
        if self.scope.anchors {
            glyph.anchors = self.anchors.iter().map(AnchorData::to_anchor).collect();
        }
        if self.scope.components {
            glyph.components = self.components.iter().map(ComponentData::to_component).collect();
        }
        if self.scope.guidelines {
            glyph.guidelines = self.guidelines.iter().map(GuidelineData::to_guideline).collect();
        }
    }

    /// Build a fresh glyph from this snapshot
    pub fn to_glyph(&self) -> Glyph {
        let mut glyph = Glyph::new(self.name.clone(), self.width);
        self.restore_into(&mut glyph);
        glyph
    }

    /// The captured contours, with their original ids
    pub fn contours(&self) -> Vec<Contour> {
        self.contours
            .iter()
            .filter(|data| !data.points.is_empty())
            .map(ContourData::to_contour)
            .collect()
    }
}

impl ContourData {
    pub fn from_contour(contour: &Contour) -> Self {
        Self {
            id: contour.id,
            closed: contour.closed,
            points: contour.points().iter().map(PointData::from_point).collect(),
        }
    }

    pub fn to_contour(&self) -> Contour {
        let points = self.points.iter().map(PointData::to_point).collect();
        let mut contour = Contour::from_points(points, self.closed);
        self.id.reserve();
        contour.id = self.id;
        contour
    }
}

impl PointData {
    pub fn from_point(pt: &PathPoint) -> Self {
        Self {
            id: pt.id,
            x: pt.point.x,
            y: pt.point.y,
            kind: pt.kind,
        }
    }

    pub fn to_point(&self) -> PathPoint {
        self.id.reserve();
        PathPoint {
            id: self.id,
            point: Point::new(self.x, self.y),
            kind: self.kind,
        }
    }
}

impl AnchorData {
    fn from_anchor(anchor: &Anchor) -> Self {
        Self {
            id: anchor.id,
            name: anchor.name.clone(),
            x: anchor.position.x,
            y: anchor.position.y,
        }
    }

    pub fn to_anchor(&self) -> Anchor {
        self.id.reserve();
        Anchor {
            id: self.id,
            name: self.name.clone(),
            position: Point::new(self.x, self.y),
        }
    }
}

impl ComponentData {
    fn from_component(component: &Component) -> Self {
        Self {
            id: component.id,
            base: component.base.clone(),
            transform: component.transform.as_coeffs(),
        }
    }

    pub fn to_component(&self) -> Component {
        self.id.reserve();
        Component {
            id: self.id,
            base: self.base.clone(),
            transform: Affine::new(self.transform),
        }
    }
}

impl GuidelineData {
    fn from_guideline(guide: &Guideline) -> Self {
        Self {
            id: guide.id,
            name: guide.name.clone(),
            x: guide.position.x,
            y: guide.position.y,
            angle: guide.angle,
        }
    }

    pub fn to_guideline(&self) -> Guideline {
        self.id.reserve();
        Guideline {
            id: self.id,
            name: self.name.clone(),
            position: Point::new(self.x, self.y),
            angle: self.angle,
        }
    }
}
