// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The glyph being edited: contours plus anchors, components and guides.

use crate::error::{EditError, Result};
use crate::model::EntityId;
use crate::path::{Contour, PathPoint};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A glyph outline with its editable attachments
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub name: String,
    pub width: f64,
    pub contours: Vec<Contour>,
    pub anchors: Vec<Anchor>,
    pub components: Vec<Component>,
    pub guidelines: Vec<Guideline>,
}

/// A named attachment position (mark positioning, cursive entry/exit)
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub id: EntityId,
    pub name: String,
    pub position: Point,
}

/// A reference to another glyph drawn with a transform
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: EntityId,
    /// Name of the referenced glyph (the "base" glyph)
    pub base: String,
    pub transform: Affine,
}

/// An infinite guide line through `position` at `angle` degrees
#[derive(Debug, Clone, PartialEq)]
pub struct Guideline {
    pub id: EntityId,
    pub name: Option<String>,
    pub position: Point,
    pub angle: f64,
}

impl Anchor {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            position,
        }
    }
}

impl Component {
    pub fn new(base: impl Into<String>, transform: Affine) -> Self {
        Self {
            id: EntityId::next(),
            base: base.into(),
            transform,
        }
    }

    /// Translate the component by a delta
    pub fn translate(&mut self, delta: Vec2) {
        self.transform = Affine::translate(delta) * self.transform;
    }

    /// Where the component's origin lands in the glyph
    pub fn origin(&self) -> Point {
        self.transform * Point::ORIGIN
    }
}

impl Guideline {
    pub fn new(position: Point, angle: f64) -> Self {
        Self {
            id: EntityId::next(),
            name: None,
            position,
            angle,
        }
    }
}

// ============================================================================
// GLYPH
// ============================================================================

impl Glyph {
    pub fn new(name: impl Into<String>, width: f64) -> Self {
        Self {
            name: name.into(),
            width,
            contours: Vec::new(),
            anchors: Vec::new(),
            components: Vec::new(),
            guidelines: Vec::new(),
        }
    }

    /// Total number of points over all contours
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }

    /// Find a point by id: `(contour index, point index)`
    pub fn find_point(&self, id: EntityId) -> Option<(usize, usize)> {
        self.contours
            .iter()
            .enumerate()
            .find_map(|(ci, contour)| contour.index_of(id).map(|pi| (ci, pi)))
    }

    pub fn point(&self, id: EntityId) -> Option<&PathPoint> {
        let (ci, pi) = self.find_point(id)?;
        self.contours[ci].point(pi)
    }

    /// Remove a point, dropping its contour once it has no points left
    pub fn remove_point(&mut self, contour_index: usize, index: usize) -> Result<PathPoint> {
        let len = self.contours.len();
        let contour = self
            .contours
            .get_mut(contour_index)
            .ok_or(EditError::OutOfRange {
                index: contour_index,
                len,
            })?;
        let removed = contour.remove_point(index)?;
        self.prune_empty();
        Ok(removed)
    }

    /// Drop contours that have no points; returns how many were dropped
    pub fn prune_empty(&mut self) -> usize {
        let before = self.contours.len();
        self.contours.retain(|contour| !contour.is_empty());
        let dropped = before - self.contours.len();
        if dropped > 0 {
            tracing::debug!("Removed {} empty contour(s) from {}", dropped, self.name);
        }
        dropped
    }

    /// Bounding box of every contour point, handles included
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut points = self
            .contours
            .iter()
            .flat_map(|contour| contour.points().iter().map(|pt| pt.point));
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |rect, pt| {
            rect.union_pt(pt)
        }))
    }

    /// All contours as one path for painting
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for contour in &self.contours {
            path.extend(contour.to_bezpath());
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Contour {
        Contour::from_points(
            vec![
                PathPoint::corner(Point::new(0.0, 0.0)),
                PathPoint::corner(Point::new(50.0, 80.0)),
                PathPoint::off_curve(Point::new(120.0, 40.0)),
                PathPoint::off_curve(Point::new(110.0, -20.0)),
                PathPoint::corner(Point::new(100.0, 0.0)),
            ],
            true,
        )
    }

    #[test]
    fn remove_point_prunes_empty_contours() {
        let mut glyph = Glyph::new("dot", 200.0);
        glyph.contours.push(Contour::new(Point::new(10.0, 10.0)));
        glyph.contours.push(triangle());

        let removed = glyph.remove_point(0, 0).unwrap();
        assert_eq!(removed.point, Point::new(10.0, 10.0));
        assert_eq!(glyph.contours.len(), 1);
        assert_eq!(glyph.point_count(), 5);
    }

    #[test]
    fn remove_point_bad_contour_index() {
        let mut glyph = Glyph::new("a", 500.0);
        assert!(matches!(
            glyph.remove_point(2, 0),
            Err(EditError::OutOfRange { index: 2, len: 0 })
        ));
    }

    #[test]
    fn bounding_box_includes_handles() {
        let mut glyph = Glyph::new("a", 500.0);
        assert!(glyph.bounding_box().is_none());
        glyph.contours.push(triangle());
        let bbox = glyph.bounding_box().unwrap();
        assert_eq!(bbox, Rect::new(0.0, -20.0, 120.0, 80.0));
    }

    #[test]
    fn find_point_by_id() {
        let mut glyph = Glyph::new("a", 500.0);
        glyph.contours.push(Contour::new(Point::new(1.0, 1.0)));
        glyph.contours.push(triangle());
        let id = glyph.contours[1].points()[1].id;
        assert_eq!(glyph.find_point(id), Some((1, 1)));
        assert_eq!(glyph.point(id).unwrap().point, Point::new(50.0, 80.0));
        assert_eq!(glyph.find_point(EntityId::next()), None);
    }

    #[test]
    fn component_translate_moves_origin() {
        let mut component = Component::new("dotaccent", Affine::scale(2.0));
        component.translate(Vec2::new(10.0, -5.0));
        assert_eq!(component.origin(), Point::new(10.0, -5.0));
    }
}
