// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Hit testing and area selection methods for EditSession

use super::EditSession;
use crate::editing::hit_test::{self, HitTarget, HitTestResult};
use crate::model::EntityId;
use crate::path::{Segment, SegmentInfo};
use kurbo::{ParamCurveNearest, Point, Rect, Vec2};

/// Accuracy passed to kurbo's nearest-point search, in canvas units
const NEAREST_ACCURACY: f64 = 1e-6;

/// A hit on a segment body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub contour: usize,
    pub info: SegmentInfo,
    /// Parameter of the nearest point on the segment
    pub t: f64,
    /// Distance from the query position in view pixels
    pub distance: f64,
}

impl EditSession {
    /// Hit test for a contour point at view coordinates
    ///
    /// Uses the cached point rectangles; `max_dist` defaults to the
    /// configured hit radius.
    pub fn hit_test_point(&mut self, view_pos: Point, max_dist: Option<f64>) -> Option<HitTestResult> {
        let radius = max_dist.unwrap_or(self.settings.mouse.hit_radius);
        self.hit_cache
            .point_at(view_pos, &self.glyph, &self.viewport, radius)
    }

    /// Hit test for anything selectable
    ///
    /// Points take priority, then anchors, component origins and finally
    /// guidelines (by distance to the infinite line).
    pub fn hit_test_item(&mut self, view_pos: Point, max_dist: Option<f64>) -> Option<HitTestResult> {
        let radius = max_dist.unwrap_or(self.settings.mouse.hit_radius);
        if let Some(hit) = self.hit_test_point(view_pos, Some(radius)) {
            return Some(hit);
        }

        let viewport = self.viewport;
        let anchors = self
            .glyph
            .anchors
            .iter()
            .map(|a| (a.id, viewport.to_view(a.position), HitTarget::Anchor));
        if let Some(hit) = hit_test::find_closest(view_pos, anchors, radius) {
            return Some(hit);
        }

        let components = self
            .glyph
            .components
            .iter()
            .map(|c| (c.id, viewport.to_view(c.origin()), HitTarget::Component));
        if let Some(hit) = hit_test::find_closest(view_pos, components, radius) {
            return Some(hit);
        }

        // Project the query onto each guide so the candidate is the
        // closest point of the line
        let canvas_pos = viewport.to_canvas(view_pos);
        let guides = self.glyph.guidelines.iter().map(|g| {
            let dir = Vec2::from_angle(g.angle.to_radians());
            let along = (canvas_pos - g.position).dot(dir);
            (g.id, viewport.to_view(g.position + dir * along), HitTarget::Guideline)
        });
        hit_test::find_closest(view_pos, guides, radius)
    }

    /// The segment body closest to a view position, within `max_dist` view
    /// pixels
    pub fn hit_test_segments(&self, view_pos: Point, max_dist: Option<f64>) -> Option<SegmentHit> {
        let radius = max_dist.unwrap_or(self.settings.mouse.hit_radius);
        let canvas_pos = self.viewport.to_canvas(view_pos);
        let canvas_radius = self.viewport.view_to_canvas_distance(radius);

        let mut best: Option<SegmentHit> = None;
        for (ci, contour) in self.glyph.contours.iter().enumerate() {
            for info in contour.iter_segments() {
                let nearest = match info.segment {
                    Segment::Line(line) => line.nearest(canvas_pos, NEAREST_ACCURACY),
                    Segment::Quadratic(quad) => quad.nearest(canvas_pos, NEAREST_ACCURACY),
                    Segment::Cubic(cubic) => cubic.nearest(canvas_pos, NEAREST_ACCURACY),
                };
                let distance = nearest.distance_sq.sqrt();
                if distance > canvas_radius {
                    continue;
                }
                if best.is_none_or(|b| distance * self.viewport.scale() < b.distance) {
                    best = Some(SegmentHit {
                        contour: ci,
                        info,
                        t: nearest.t,
                        distance: distance * self.viewport.scale(),
                    });
                }
            }
        }
        best
    }

    /// Every selectable entity inside a canvas-space rectangle
    ///
    /// Contour points (handles included), anchors, component origins and
    /// guideline positions are tested.
    pub fn entities_in_rect(&self, rect: Rect) -> Vec<EntityId> {
        let glyph = &self.glyph;
        let points = glyph
            .contours
            .iter()
            .flat_map(|c| c.points().iter().map(|pt| (pt.id, pt.point)));
        let anchors = glyph.anchors.iter().map(|a| (a.id, a.position));
        let components = glyph.components.iter().map(|c| (c.id, c.origin()));
        let guides = glyph.guidelines.iter().map(|g| (g.id, g.position));

        points
            .chain(anchors)
            .chain(components)
            .chain(guides)
            .filter(|(_, pos)| rect.contains(*pos))
            .map(|(id, _)| id)
            .collect()
    }
}
