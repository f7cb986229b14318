// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editable contour: an ordered chain of on-curve points and their handles.
//!
//! Points are stored in drawing order, UFO style: each on-curve point is
//! followed by the off-curve handles of the segment it starts. A stored
//! contour always begins with an on-curve point, so the handles of the
//! closing segment of a closed contour sit at the end of the list. An open
//! contour may end with a single trailing handle, the outgoing handle the
//! pen tool lays down before the next point exists.

use super::point::{PathPoint, PointKind};
use super::segment::{Segment, SegmentInfo};
use crate::error::{EditError, Result};
use crate::model::EntityId;
use kurbo::{BezPath, CubicBez, Line, ParamCurve, Point, QuadBez};
use std::collections::{BTreeSet, HashSet};

/// The two handles an on-curve point may own
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Handles {
    /// Incoming handle (the one before the point)
    pub prev: Option<usize>,
    /// Outgoing handle (the one after the point)
    pub next: Option<usize>,
}

/// A single contour in a glyph outline
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub id: EntityId,
    points: Vec<PathPoint>,
    pub closed: bool,
    changed: bool,
}

impl Contour {
    /// Start a new open contour with one corner point
    pub fn new(start: Point) -> Self {
        Self::from_points(vec![PathPoint::corner(start)], false)
    }

    /// Build a contour from existing points
    ///
    /// Closed contours are rotated so they start on an on-curve point and
    /// open contours lose any leading handles.
    pub fn from_points(points: Vec<PathPoint>, closed: bool) -> Self {
        let mut contour = Self {
            id: EntityId::next(),
            points,
            closed,
            changed: true,
        };
        contour.normalize();
        contour
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&PathPoint> {
        self.points.get(index)
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.points.iter().position(|pt| pt.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Mutable access to the raw point list; marks the contour changed
    pub(crate) fn points_mut(&mut self) -> &mut Vec<PathPoint> {
        self.changed = true;
        &mut self.points
    }

    // ===== CHANGE TRACKING =====

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Read and reset the changed flag
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    // ===== NEIGHBOR QUERIES =====

    /// Previous index, wrapping for closed contours
    pub fn prev_index(&self, current: usize) -> Option<usize> {
        if current > 0 {
            Some(current - 1)
        } else if self.closed && !self.points.is_empty() {
            Some(self.points.len() - 1)
        } else {
            None
        }
    }

    /// Next index, wrapping for closed contours
    pub fn next_index(&self, current: usize) -> Option<usize> {
        if current + 1 < self.points.len() {
            Some(current + 1)
        } else if self.closed && !self.points.is_empty() {
            Some(0)
        } else {
            None
        }
    }

    /// The closest on-curve point before `index`
    pub fn previous_on_curve(&self, index: usize) -> Option<usize> {
        let mut cursor = self.prev_index(index)?;
        while cursor != index {
            if self.points[cursor].is_on_curve() {
                return Some(cursor);
            }
            cursor = self.prev_index(cursor)?;
        }
        None
    }

    /// The closest on-curve point after `index`
    pub fn next_on_curve(&self, index: usize) -> Option<usize> {
        let mut cursor = self.next_index(index)?;
        while cursor != index {
            if self.points[cursor].is_on_curve() {
                return Some(cursor);
            }
            cursor = self.next_index(cursor)?;
        }
        None
    }

    /// Handles owned by the on-curve point at `index`
    ///
    /// Off-curve points own nothing and get an empty result.
    pub fn handles_of(&self, index: usize) -> Handles {
        match self.points.get(index).map(|pt| pt.kind) {
            Some(PointKind::Corner | PointKind::Smooth) => Handles {
                prev: self
                    .prev_index(index)
                    .filter(|&i| i != index && self.points[i].is_off_curve()),
                next: self
                    .next_index(index)
                    .filter(|&i| i != index && self.points[i].is_off_curve()),
            },
            Some(PointKind::OffCurve) | None => Handles::default(),
        }
    }

    /// The on-curve point owning the handle at `index`
    pub fn owner_of(&self, index: usize) -> Option<usize> {
        if !self.points.get(index)?.is_off_curve() {
            return None;
        }
        if let Some(prev) = self.prev_index(index)
            && self.points[prev].is_on_curve()
        {
            return Some(prev);
        }
        self.next_index(index)
            .filter(|&next| self.points[next].is_on_curve())
    }

    /// The other handle of the owner of the handle at `index`
    pub fn opposite_handle(&self, index: usize) -> Option<usize> {
        let owner = self.owner_of(index)?;
        let handles = self.handles_of(owner);
        if handles.prev == Some(index) {
            handles.next
        } else if handles.next == Some(index) {
            handles.prev
        } else {
            None
        }
    }

    /// Index of the first on-curve point
    pub fn first_on_curve(&self) -> Option<usize> {
        self.points.iter().position(PathPoint::is_on_curve)
    }

    /// Index of the last on-curve point
    pub fn last_on_curve(&self) -> Option<usize> {
        self.points.iter().rposition(PathPoint::is_on_curve)
    }

    /// Whether an open contour ends with a pending outgoing handle
    pub fn has_trailing_handle(&self) -> bool {
        self.is_open() && self.points.last().is_some_and(PathPoint::is_off_curve)
    }

    // ===== SEGMENTS =====

    fn on_curve_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, pt)| pt.is_on_curve())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of segments in this contour
    pub fn segment_count(&self) -> usize {
        let on_curve = self.points.iter().filter(|pt| pt.is_on_curve()).count();
        if self.closed {
            on_curve
        } else {
            on_curve.saturating_sub(1)
        }
    }

    /// Iterate over the segments of this contour in drawing order
    pub fn iter_segments(&self) -> impl Iterator<Item = SegmentInfo> + '_ {
        let on_curve = self.on_curve_indices();
        let count = self.segment_count();
        (0..count).filter_map(move |k| {
            let start = on_curve[k];
            let end = on_curve[(k + 1) % on_curve.len()];
            self.segment_between(k, start, end)
        })
    }

    /// The segment at `segment_index`
    pub fn segment(&self, segment_index: usize) -> Option<SegmentInfo> {
        self.iter_segments()
            .find(|info| info.segment_index == segment_index)
    }

    fn segment_between(&self, segment_index: usize, start: usize, end: usize) -> Option<SegmentInfo> {
        let p0 = self.points[start].point;
        let p3 = self.points[end].point;
        let handles: Vec<Point> = self.handle_run(start, end).map(|i| self.points[i].point).collect();

        let segment = match handles.as_slice() {
            [] => Segment::Line(Line::new(p0, p3)),
            [p1] => Segment::Quadratic(QuadBez::new(p0, *p1, p3)),
            [p1, p2] => Segment::Cubic(CubicBez::new(p0, *p1, *p2, p3)),
            _ => {
                tracing::trace!(
                    "Skipping segment {} with {} handles",
                    segment_index,
                    handles.len()
                );
                return None;
            }
        };

        Some(SegmentInfo {
            segment_index,
            start_index: start,
            end_index: end,
            segment,
        })
    }

    /// Indices of the handles strictly between `start` and `end`
    fn handle_run(&self, start: usize, end: usize) -> impl Iterator<Item = usize> {
        let upper = if end > start { end } else { self.points.len() };
        let wrapped = if end > start { 0..0 } else { 0..end };
        (start + 1..upper).chain(wrapped)
    }

    // ===== MUTATION =====

    /// Append a point at the end of the contour
    pub fn add_point(&mut self, point: PathPoint) {
        self.points.push(point);
        self.changed = true;
    }

    /// Remove the point at `index`
    ///
    /// Removing an on-curve point also removes the handles it owns; the
    /// neighbouring segments merge into one. Fails with `OutOfRange` for
    /// an invalid index, including any index into an empty contour.
    pub fn remove_point(&mut self, index: usize) -> Result<PathPoint> {
        let len = self.points.len();
        let removed = *self
            .points
            .get(index)
            .ok_or(EditError::OutOfRange { index, len })?;
        let ids = BTreeSet::from([removed.id]);
        self.remove_points(&ids);
        Ok(removed)
    }

    /// Remove every point whose id is in `ids`, plus handles owned by
    /// removed on-curve points
    ///
    /// Returns the number of points removed. Segments that lose one of
    /// their two handles get a retracted handle at the adjacent on-curve
    /// point, so merged cubic segments stay cubic.
    pub fn remove_points(&mut self, ids: &BTreeSet<EntityId>) -> usize {
        let mut doomed: HashSet<EntityId> = HashSet::new();
        for (i, pt) in self.points.iter().enumerate() {
            if !ids.contains(&pt.id) {
                continue;
            }
            doomed.insert(pt.id);
            if pt.is_on_curve() {
                let handles = self.handles_of(i);
                for h in [handles.prev, handles.next].into_iter().flatten() {
                    doomed.insert(self.points[h].id);
                }
            }
        }
        if doomed.is_empty() {
            return 0;
        }

        let roles = self.handle_roles();
        let before = self.points.len();
        self.points.retain(|pt| !doomed.contains(&pt.id));
        let removed = before - self.points.len();

        if !self.points.iter().any(PathPoint::is_on_curve) {
            self.points.clear();
        } else {
            self.normalize();
            self.repair_handle_runs(&roles);
        }
        self.changed = true;
        removed
    }

    /// Insert a new on-curve point at parameter `t` of a segment
    ///
    /// The segment is split in two without changing the drawn shape: a line
    /// gains one corner point, a curve is split with kurbo's `subsegment`
    /// and the new point is smooth. Returns the id of the inserted point.
    pub fn insert_point_at(&mut self, segment_index: usize, t: f64) -> Result<EntityId> {
        if !(0.0..=1.0).contains(&t) {
            return Err(EditError::ParameterOutOfRange { t });
        }
        let info = self.segment(segment_index).ok_or(EditError::OutOfRange {
            index: segment_index,
            len: self.segment_count(),
        })?;

        let at = info.start_index + 1;
        let (new_points, replaced, id) = match info.segment {
            Segment::Line(line) => {
                let pt = PathPoint::corner(line.eval(t));
                (vec![pt], 0, pt.id)
            }
            Segment::Quadratic(quad) => {
                let (left, right) = (quad.subsegment(0.0..t), quad.subsegment(t..1.0));
                let mid = PathPoint::smooth(left.p2);
                (
                    vec![PathPoint::off_curve(left.p1), mid, PathPoint::off_curve(right.p1)],
                    1,
                    mid.id,
                )
            }
            Segment::Cubic(cubic) => {
                let (left, right) = (cubic.subsegment(0.0..t), cubic.subsegment(t..1.0));
                let mid = PathPoint::smooth(left.p3);
                (
                    vec![
                        PathPoint::off_curve(left.p1),
                        PathPoint::off_curve(left.p2),
                        mid,
                        PathPoint::off_curve(right.p1),
                        PathPoint::off_curve(right.p2),
                    ],
                    2,
                    mid.id,
                )
            }
        };

        self.points.splice(at..at + replaced, new_points);
        self.changed = true;
        tracing::debug!(
            "Inserted point {:?} on segment {} at t={:.4}",
            id,
            segment_index,
            t
        );
        Ok(id)
    }

    /// Toggle the on-curve point at `index` between corner and smooth
    pub fn toggle_smooth(&mut self, index: usize) {
        if let Some(pt) = self.points.get_mut(index) {
            pt.kind = match pt.kind {
                PointKind::Corner => PointKind::Smooth,
                PointKind::Smooth => PointKind::Corner,
                PointKind::OffCurve => return,
            };
            self.changed = true;
        }
    }

    /// Reverse the drawing direction
    ///
    /// Closed contours keep their starting point.
    pub fn reverse(&mut self) {
        self.points.reverse();
        if self.closed {
            self.points.rotate_right(1);
        }
        self.normalize();
        self.changed = true;
    }

    /// Close the contour
    pub fn close(&mut self) {
        self.closed = true;
        self.changed = true;
    }

    /// Convert to a kurbo `BezPath` for painting
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        let Some(first) = self.first_on_curve() else {
            return path;
        };
        path.move_to(self.points[first].point);
        for info in self.iter_segments() {
            match info.segment {
                Segment::Line(line) => path.line_to(line.p1),
                Segment::Quadratic(quad) => path.quad_to(quad.p1, quad.p2),
                Segment::Cubic(cubic) => path.curve_to(cubic.p1, cubic.p2, cubic.p3),
            }
        }
        if self.closed {
            path.close_path();
        }
        path
    }

    // ===== PRIVATE HELPERS =====

    fn normalize(&mut self) {
        if self.closed {
            if let Some(first) = self.first_on_curve() {
                self.points.rotate_left(first);
            }
        } else {
            let leading = self.first_on_curve().unwrap_or(self.points.len());
            self.points.drain(..leading);
        }
    }

    /// Record which segment role each handle plays before a deletion
    fn handle_roles(&self) -> HandleRoles {
        let mut roles = HandleRoles::default();
        for info in self.iter_segments() {
            let run: Vec<EntityId> = self
                .handle_run(info.start_index, info.end_index)
                .map(|i| self.points[i].id)
                .collect();
            match info.segment {
                Segment::Quadratic(_) => roles.quadratic.extend(run),
                Segment::Cubic(_) => roles.incoming.extend(run.last().copied()),
                Segment::Line(_) => {}
            }
        }
        roles
    }

    /// Fix handle runs left behind by a deletion
    ///
    /// A cubic handle that lost its partner gets a retracted one at the
    /// on-curve point that lost its handle; runs longer than two keep
    /// their outer handles.
    fn repair_handle_runs(&mut self, roles: &HandleRoles) {
        let on_curve = self.on_curve_indices();
        let spans: Vec<(usize, usize)> = (0..self.segment_count())
            .map(|k| (on_curve[k], on_curve[(k + 1) % on_curve.len()]))
            .collect();

        // Apply from the back so earlier indices stay valid
        for (start, end) in spans.into_iter().rev() {
            let run: Vec<usize> = self.handle_run(start, end).collect();
            match run.as_slice() {
                [lone] if !roles.quadratic.contains(&self.points[*lone].id) => {
                    let lone = *lone;
                    if roles.incoming.contains(&self.points[lone].id) {
                        let retracted = PathPoint::off_curve(self.points[start].point);
                        self.points.insert(lone, retracted);
                    } else {
                        let retracted = PathPoint::off_curve(self.points[end].point);
                        self.points.insert(lone + 1, retracted);
                    }
                }
                [_, inner @ .., _] if !inner.is_empty() => {
                    let inner: HashSet<EntityId> =
                        inner.iter().map(|&i| self.points[i].id).collect();
                    self.points.retain(|pt| !inner.contains(&pt.id));
                }
                _ => {}
            }
        }
    }
}

/// Segment roles of handles, captured before points are removed
#[derive(Debug, Default)]
struct HandleRoles {
    /// Sole control points of quadratic segments
    quadratic: HashSet<EntityId>,
    /// Second handles of cubic segments (owned by the segment's end)
    incoming: HashSet<EntityId>,
}
