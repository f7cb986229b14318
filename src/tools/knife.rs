// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The knife tool for cutting contours
//!
//! Dragging draws a cutting line; every crossing with the outline is shown
//! while dragging. On release a new on-curve point is inserted at each
//! crossing, so the cut contour keeps its shape and gains points that can
//! be deleted or moved apart.
//!
//! Insertions on one contour run from the last segment to the first, and
//! within a segment from the largest `t` down. Splitting a segment at
//! `t_prev` leaves its left half at the same segment index, covering the
//! original `[0, t_prev]`; a smaller `t` on that segment is therefore
//! renormalised to `t / t_prev` before the next insertion.

use crate::editing::{Drag, EditSession, Modifiers, MouseDelegate, MouseEvent};
use crate::error::{EditError, Result};
use crate::model::{EntityId, Glyph, SnapshotScope};
use crate::path::intersect;
use crate::tools::{Key, Overlay, Tool, ToolId, constrain_axis};
use kurbo::{Line, Point};

/// Crossings this close to a segment end land on an existing point and
/// are skipped
const ENDPOINT_TOLERANCE: f64 = 1e-6;

/// The knife tool for cutting contours
#[derive(Debug, Clone, Default)]
pub struct KnifeTool {
    /// Current gesture state
    gesture: GestureState,
    /// Cached crossing points (canvas space) for feedback
    intersections: Vec<Point>,
}

/// The state of the knife gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum GestureState {
    /// Ready for a new cut
    #[default]
    Ready,
    /// Currently cutting; points are in canvas space
    Begun { start: Point, current: Point },
}

/// Where one crossing lands on a contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub segment_index: usize,
    /// Parameter along the segment
    pub t: f64,
    pub point: Point,
}

impl KnifeTool {
    /// Get the current knife line in canvas space
    fn current_line(&self) -> Option<Line> {
        match self.gesture {
            GestureState::Begun { start, current } => Some(Line::new(start, current)),
            GestureState::Ready => None,
        }
    }

    fn update_line(&mut self, event: MouseEvent, session: &EditSession) {
        let GestureState::Begun { start, .. } = self.gesture else {
            tracing::trace!("Knife: drag without press; ignored");
            return;
        };
        let mut current = session.viewport.to_canvas(event.pos);
        if event.mods.shift {
            current = constrain_axis(start, current);
        }
        self.gesture = GestureState::Begun { start, current };
        self.update_intersections(session);
    }

    /// Update the cached crossing points
    fn update_intersections(&mut self, session: &EditSession) {
        self.intersections.clear();
        if let Some(line) = self.current_line() {
            self.intersections = contour_hits(&session.glyph, line)
                .into_iter()
                .flat_map(|(_, hits)| hits.into_iter().map(|hit| hit.point))
                .collect();
        }
    }

    fn finish(&mut self, session: &mut EditSession) -> Result<Vec<EntityId>> {
        let gesture = std::mem::take(&mut self.gesture);
        self.intersections.clear();
        let GestureState::Begun { start, current } = gesture else {
            return Err(EditError::InvalidToolEvent);
        };
        cut(session, Line::new(start, current))
    }
}

// ===== Cutting =====

/// Crossings of `line` with every contour, grouped by contour index
///
/// Crossings at an existing on-curve point are dropped. A zero-length line
/// crosses nothing.
pub fn contour_hits(glyph: &Glyph, line: Line) -> Vec<(usize, Vec<Hit>)> {
    if intersect::cutter_direction(line).is_err() {
        return Vec::new();
    }
    glyph
        .contours
        .iter()
        .enumerate()
        .filter_map(|(ci, contour)| {
            let hits: Vec<Hit> = contour
                .iter_segments()
                .flat_map(|info| {
                    intersect::segment_line(&info.segment, line)
                        .into_iter()
                        .filter(|x| x.t > ENDPOINT_TOLERANCE && x.t < 1.0 - ENDPOINT_TOLERANCE)
                        .map(move |x| Hit {
                            segment_index: info.segment_index,
                            t: x.t,
                            point: x.point,
                        })
                })
                .collect();
            (!hits.is_empty()).then_some((ci, hits))
        })
        .collect()
}

/// Cut the glyph along `line`, inserting a point at every crossing
///
/// One undo operation covers the whole cut. The new points become the
/// selection. A degenerate line is logged and cuts nothing.
pub fn cut(session: &mut EditSession, line: Line) -> Result<Vec<EntityId>> {
    if let Err(err) = intersect::cutter_direction(line) {
        tracing::warn!("Knife: {} for line {:?}; nothing cut", err, line);
        return Ok(Vec::new());
    }
    let plan = contour_hits(&session.glyph, line);
    if plan.is_empty() {
        tracing::debug!("Knife: line crosses nothing");
        return Ok(Vec::new());
    }

    let inserted = session.with_operation(SnapshotScope::CONTOURS, |session| {
        let mut inserted = Vec::new();
        for (ci, mut hits) in plan {
            hits.sort_by(|a, b| {
                b.segment_index
                    .cmp(&a.segment_index)
                    .then(b.t.total_cmp(&a.t))
            });
            let contour = &mut session.glyph.contours[ci];
            let mut previous: Option<(usize, f64)> = None;
            for hit in hits {
                let t = match previous {
                    Some((segment, t_prev)) if segment == hit.segment_index => {
                        if t_prev - hit.t < ENDPOINT_TOLERANCE {
                            // Same crossing reported twice
                            continue;
                        }
                        hit.t / t_prev
                    }
                    _ => hit.t,
                };
                inserted.push(contour.insert_point_at(hit.segment_index, t)?);
                previous = Some((hit.segment_index, hit.t));
            }
        }
        Ok(inserted)
    })?;

    tracing::debug!("Knife: inserted {} points", inserted.len());
    session.outline_changed();
    session.set_selection(inserted.iter().copied().collect());
    Ok(inserted)
}

// ===== Tool Implementation =====

impl Tool for KnifeTool {
    fn id(&self) -> ToolId {
        ToolId::Knife
    }

    fn overlay(&self, _session: &EditSession) -> Option<Overlay> {
        self.current_line().map(|line| Overlay::Knife {
            line,
            hits: self.intersections.clone(),
        })
    }

    fn key_down(&mut self, key: Key, _mods: Modifiers, session: &mut EditSession) -> bool {
        if key == Key::Escape && self.gesture != GestureState::Ready {
            self.cancel(session);
            return true;
        }
        false
    }

    fn deactivate(&mut self, session: &mut EditSession) {
        self.cancel(session);
    }
}

// ===== MouseDelegate Implementation =====

impl MouseDelegate for KnifeTool {
    type Data = EditSession;

    fn left_down(&mut self, event: MouseEvent, data: &mut EditSession) {
        let pt = data.viewport.to_canvas(event.pos);
        self.gesture = GestureState::Begun {
            start: pt,
            current: pt,
        };
        self.intersections.clear();
    }

    fn left_drag_began(&mut self, event: MouseEvent, _drag: Drag, data: &mut EditSession) {
        self.update_line(event, data);
    }

    fn left_drag_changed(&mut self, event: MouseEvent, _drag: Drag, data: &mut EditSession) {
        self.update_line(event, data);
    }

    fn left_drag_ended(&mut self, event: MouseEvent, _drag: Drag, data: &mut EditSession) {
        self.update_line(event, data);
    }

    fn left_up(&mut self, _event: MouseEvent, data: &mut EditSession) {
        match self.finish(data) {
            Ok(_) => {}
            Err(EditError::InvalidToolEvent) => {
                tracing::trace!("Knife: release without press; ignored");
            }
            Err(err) => tracing::warn!("Knife: cut failed: {}", err),
        }
    }

    fn cancel(&mut self, _data: &mut EditSession) {
        self.gesture = GestureState::Ready;
        self.intersections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::MouseButton;
    use crate::path::{Contour, PathPoint, PointKind};
    use crate::settings::Settings;
    use crate::tools::ToolBox;
    use crate::tools::test_support::{Harness, square_session};
    use kurbo::{CubicBez, ParamCurveNearest};

    fn knife(session: EditSession) -> Harness {
        Harness::new(ToolBox::for_id(ToolId::Knife), session)
    }

    fn arch_session() -> (CubicBez, EditSession) {
        let arch = CubicBez::new((0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0));
        let mut glyph = Glyph::new("n", 100.0);
        glyph.contours.push(Contour::from_points(
            vec![
                PathPoint::corner(arch.p0),
                PathPoint::off_curve(arch.p1),
                PathPoint::off_curve(arch.p2),
                PathPoint::corner(arch.p3),
            ],
            false,
        ));
        (arch, EditSession::new(glyph, Settings::default()))
    }

    fn kinds(contour: &Contour) -> Vec<PointKind> {
        contour.points().iter().map(|pt| pt.kind).collect()
    }

    #[test]
    fn cut_square_adds_two_points() {
        let mut h = knife(square_session());
        let corner_ids: Vec<EntityId> = h.session.glyph.contours[0].points().iter().map(|pt| pt.id).collect();
        h.drag((-10.0, 50.0), (110.0, 50.0));

        let contour = &h.session.glyph.contours[0];
        assert!(contour.closed);
        let points: Vec<(Point, PointKind)> = contour.points().iter().map(|pt| (pt.point, pt.kind)).collect();
        assert_eq!(
            points,
            vec![
                (Point::new(0.0, 0.0), PointKind::Corner),
                (Point::new(100.0, 0.0), PointKind::Corner),
                (Point::new(100.0, 50.0), PointKind::Corner),
                (Point::new(100.0, 100.0), PointKind::Corner),
                (Point::new(0.0, 100.0), PointKind::Corner),
                (Point::new(0.0, 50.0), PointKind::Corner),
            ]
        );
        // The original corners keep their identity
        let ids: Vec<EntityId> = contour.points().iter().map(|pt| pt.id).collect();
        assert_eq!([ids[0], ids[1], ids[3], ids[4]], corner_ids[..]);
        // Only the new points are selected
        assert_eq!(h.session.selection.len(), 2);
        assert!(h.session.selection.contains(&ids[2]));
        assert!(h.session.selection.contains(&ids[5]));

        assert!(h.tool.overlay(&h.session).is_none());
        assert_eq!(h.session.undo_state().undo_depth(), 1);
    }

    #[test]
    fn shallow_cut_lands_on_the_line() {
        let mut session = square_session();
        let line = Line::new((-10.0, 40.0), (110.0, 45.0));
        let ids = cut(&mut session, line).unwrap();
        assert_eq!(ids.len(), 2);

        let contour = &session.glyph.contours[0];
        assert_eq!(contour.len(), 6);
        assert!(contour.points().iter().all(|pt| pt.kind == PointKind::Corner));
        let right = contour.points()[2].point;
        let left = contour.points()[5].point;
        assert_eq!(right.x, 100.0);
        assert!((right.y - (40.0 + 5.0 * 110.0 / 120.0)).abs() < 1e-9);
        assert_eq!(left.x, 0.0);
        assert!((left.y - (40.0 + 5.0 * 10.0 / 120.0)).abs() < 1e-9);
    }

    #[test]
    fn nearly_parallel_cut_splits_arch() {
        for dy in [1e-5, 1e-6, 0.0] {
            let (arch, mut session) = arch_session();
            let line = Line::new((-10.0, 50.0), (110.0, 50.0 + dy));
            let ids = cut(&mut session, line).unwrap();
            assert_eq!(ids.len(), 2, "dy = {dy}");

            let contour = &session.glyph.contours[0];
            assert_eq!(
                kinds(contour),
                vec![
                    PointKind::Corner,
                    PointKind::OffCurve,
                    PointKind::OffCurve,
                    PointKind::Smooth,
                    PointKind::OffCurve,
                    PointKind::OffCurve,
                    PointKind::Smooth,
                    PointKind::OffCurve,
                    PointKind::OffCurve,
                    PointKind::Corner,
                ]
            );
            for id in ids {
                let pt = session.glyph.point(id).unwrap().point;
                assert!((pt.y - 50.0).abs() < 1e-5, "dy = {dy}: {pt:?}");
                assert!(arch.nearest(pt, 1e-9).distance_sq < 1e-9);
            }
        }
    }

    #[test]
    fn zero_length_line_changes_nothing() {
        let mut h = knife(square_session());
        let before = h.session.glyph.clone();
        h.click((50.0, 50.0));
        assert_eq!(h.session.glyph, before);
        assert!(!h.session.undo_state().can_undo());

        let mut session = square_session();
        let ids = cut(&mut session, Line::new((0.0, 50.0), (0.0, 50.0))).unwrap();
        assert!(ids.is_empty());
        assert_eq!(session.glyph.point_count(), 4);
    }

    #[test]
    fn missing_line_changes_nothing() {
        let mut h = knife(square_session());
        h.drag((200.0, 0.0), (300.0, 100.0));
        assert_eq!(h.session.glyph.point_count(), 4);
        assert!(!h.session.undo_state().can_undo());
    }

    #[test]
    fn cut_through_corner_is_ignored() {
        let mut session = square_session();
        // Diagonal through (0, 0) and (100, 100) only touches existing points
        let ids = cut(&mut session, Line::new((-10.0, -10.0), (110.0, 110.0))).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn two_cuts_on_one_cubic_keep_the_shape() {
        let (original, mut session) = arch_session();

        let ids = cut(&mut session, Line::new((-10.0, 50.0), (110.0, 50.0))).unwrap();
        assert_eq!(ids.len(), 2);

        let contour = &session.glyph.contours[0];
        assert_eq!(contour.segment_count(), 3);
        for id in ids {
            let pt = session.glyph.point(id).unwrap();
            assert_eq!(pt.kind, PointKind::Smooth);
            assert!((pt.point.y - 50.0).abs() < 1e-6);
            let nearest = original.nearest(pt.point, 1e-9);
            assert!(nearest.distance_sq < 1e-9);
        }
        // Every new piece still lies on the original curve
        for info in contour.iter_segments() {
            for step in 1..10 {
                let p = info.segment.eval(f64::from(step) / 10.0);
                assert!(original.nearest(p, 1e-9).distance_sq < 1e-6);
            }
        }
    }

    #[test]
    fn shift_locks_horizontal() {
        let mut h = knife(square_session());
        h.mods.shift = true;
        h.down((-10.0, 50.0));
        h.drag_to((110.0, 58.0));
        match h.tool.overlay(&h.session) {
            Some(Overlay::Knife { line, hits }) => {
                assert_eq!(line.p1, Point::new(110.0, 50.0));
                assert_eq!(hits.len(), 2);
            }
            other => panic!("expected knife overlay, got {other:?}"),
        }
        h.up((110.0, 58.0));
        assert_eq!(h.session.glyph.point_count(), 6);
    }

    #[test]
    fn release_without_press_is_a_no_op() {
        let mut session = square_session();
        let mut tool = KnifeTool::default();
        let event = MouseEvent::new(Point::ZERO, Some(MouseButton::Left));
        tool.left_up(event, &mut session);
        assert_eq!(session.glyph.point_count(), 4);
    }

    #[test]
    fn undo_restores_uncut_square() {
        let mut h = knife(square_session());
        h.drag((-10.0, 50.0), (110.0, 50.0));
        h.session.undo().unwrap();
        assert_eq!(h.session.glyph.point_count(), 4);
        assert!(h.session.selection.is_empty());
    }
}
