// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pen tool for drawing contours
//!
//! Clicks lay down corner points joined by lines. Dragging after a press
//! pulls out handles: the new point's outgoing handle follows the cursor
//! and its incoming handle mirrors it, turning the pending segment into a
//! curve. Clicking the first point closes the contour.
//!
//! Between presses the contour may carry one trailing handle, the outgoing
//! handle of its last point. The next click consumes it.

use crate::editing::handles::mirror_handle;
use crate::editing::{Drag, EditSession, Modifiers, MouseDelegate, MouseEvent};
use crate::model::{EntityId, SnapshotScope};
use crate::path::{Contour, PathPoint, PointKind};
use crate::tools::{Key, Overlay, Tool, ToolId};
use kurbo::Point;

// ===== Pen State =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PenState {
    /// Not drawing; the next click starts, resumes or splits a contour
    #[default]
    Idle,
    /// Appending to the open contour with this id
    Extending { contour: EntityId },
}

/// Which point a drag is pulling handles out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragTarget {
    /// The last on-curve point of the contour
    Last { contour: EntityId },
    /// The first point of a contour that was just closed
    First { contour: EntityId },
}

// ===== PenTool Struct =====

/// The pen tool
#[derive(Debug, Clone, Default)]
pub struct PenTool {
    state: PenState,
    drag: Option<DragTarget>,
    /// Cursor position in canvas space, for the next-segment preview
    preview: Option<Point>,
}

impl PenTool {
    /// Id of the contour being extended
    pub fn active_contour(&self) -> Option<EntityId> {
        match self.state {
            PenState::Extending { contour } => Some(contour),
            PenState::Idle => None,
        }
    }

    fn contour_index(session: &EditSession, id: EntityId) -> Option<usize> {
        session.glyph.contours.iter().position(|c| c.id == id)
    }

    fn canvas_pos(event: MouseEvent, session: &EditSession) -> Point {
        session.settings.snap_point(session.viewport.to_canvas(event.pos))
    }

    /// Press while idle: resume an open contour, split a segment, or start
    /// a new contour
    fn press_idle(&mut self, event: MouseEvent, pos: Point, session: &mut EditSession) {
        if let Some(hit) = session.hit_test_point(event.pos, None)
            && let Some((ci, pi)) = session.glyph.find_point(hit.entity)
        {
            let contour = &session.glyph.contours[ci];
            let first = contour.first_on_curve();
            let last = contour.last_on_curve();
            if contour.is_open() && (Some(pi) == first || Some(pi) == last) {
                let contour_id = contour.id;
                if Some(pi) == first && first != last {
                    session.glyph.contours[ci].reverse();
                    session.outline_changed();
                }
                tracing::debug!("Pen: resuming contour {:?}", contour_id);
                self.state = PenState::Extending {
                    contour: contour_id,
                };
                session.select_only(hit.entity);
                return;
            }
            tracing::trace!("Pen: click on an interior point; ignored");
            return;
        }

        if let Some(hit) = session.hit_test_segments(event.pos, None) {
            match session.insert_point_on_segment(hit.contour, hit.info.segment_index, hit.t) {
                Ok(id) => tracing::debug!("Pen: inserted {:?} on segment", id),
                Err(err) => tracing::warn!("Pen: insert failed: {}", err),
            }
            return;
        }

        let contour = Contour::new(pos);
        let contour_id = contour.id;
        let first_id = contour.points()[0].id;
        session.glyph.contours.push(contour);
        session.outline_changed();
        session.select_only(first_id);
        tracing::debug!("Pen: started contour {:?} at {:?}", contour_id, pos);
        self.state = PenState::Extending {
            contour: contour_id,
        };
        self.drag = Some(DragTarget::Last {
            contour: contour_id,
        });
    }

    /// Press while extending: close, or append a point
    fn press_extending(&mut self, event: MouseEvent, pos: Point, contour_id: EntityId, session: &mut EditSession) {
        let Some(ci) = Self::contour_index(session, contour_id) else {
            // The contour went away (undo, delete); start over
            self.state = PenState::Idle;
            self.press_idle(event, pos, session);
            return;
        };

        let hit = session
            .hit_test_point(event.pos, None)
            .map(|hit| hit.entity)
            .filter(|id| session.glyph.contours[ci].contains(*id));
        let contour = &mut session.glyph.contours[ci];
        let first = contour.first_on_curve();
        let last = contour.last_on_curve();
        let hit_index = hit.and_then(|id| contour.index_of(id));

        if hit_index.is_some() && hit_index == first && first != last {
            if contour.has_trailing_handle()
                && let Some(start) = first
            {
                let start_pos = contour.points()[start].point;
                contour.add_point(PathPoint::off_curve(start_pos));
            }
            contour.close();
            let first_id = contour.points()[0].id;
            tracing::debug!("Pen: closed contour {:?}", contour_id);
            session.outline_changed();
            session.select_only(first_id);
            self.state = PenState::Idle;
            self.drag = Some(DragTarget::First {
                contour: contour_id,
            });
            return;
        }
        if hit_index.is_some() && hit_index == last {
            tracing::trace!("Pen: click on the last point; ignored");
            return;
        }

        if contour.has_trailing_handle() {
            contour.add_point(PathPoint::off_curve(pos));
        }
        let point = PathPoint::corner(pos);
        contour.add_point(point);
        session.outline_changed();
        session.select_only(point.id);
        self.drag = Some(DragTarget::Last {
            contour: contour_id,
        });
    }

    /// Pull handles out of the drag target toward `mouse`
    fn drag_handles(&mut self, mouse: Point, alt: bool, session: &mut EditSession) {
        let Some(target) = self.drag else {
            return;
        };
        let (DragTarget::Last { contour } | DragTarget::First { contour }) = target;
        let Some(ci) = Self::contour_index(session, contour) else {
            return;
        };
        let contour = &mut session.glyph.contours[ci];
        match target {
            DragTarget::Last { .. } => shape_last_point(contour, mouse, alt),
            DragTarget::First { .. } => shape_first_point(contour, mouse, alt),
        }
        session.outline_changed();
    }

    /// Leave the current contour open and stop extending it
    fn finish_contour(&mut self, session: &mut EditSession) {
        self.drag = None;
        let PenState::Extending { contour } = std::mem::take(&mut self.state) else {
            return;
        };
        let Some(ci) = Self::contour_index(session, contour) else {
            return;
        };
        if session.glyph.contours[ci].has_trailing_handle() {
            let result = session.with_operation(SnapshotScope::CONTOURS, |session| {
                session.glyph.contours[ci].points_mut().pop();
                Ok(())
            });
            if let Err(err) = result {
                tracing::warn!("Pen: could not drop trailing handle: {}", err);
            }
            session.outline_changed();
        }
        tracing::debug!("Pen: finished contour {:?}", contour);
    }
}

/// Drag out the handles of the last on-curve point of an open contour
///
/// Both handles stay mirrored (same length) while drawing, unlike the
/// sum-conserving smooth rule used when editing existing points.
///
/// The trailing handle follows the cursor. The incoming handle mirrors it;
/// a line segment into the point becomes a cubic with a retracted handle
/// at its start.
fn shape_last_point(contour: &mut Contour, mouse: Point, alt: bool) {
    let Some(mut last) = contour.last_on_curve() else {
        return;
    };
    let on_curve = contour.points()[last].point;

    if contour.has_trailing_handle() {
        let tail = contour.len() - 1;
        contour.points_mut()[tail].point = mouse;
    } else {
        contour.add_point(PathPoint::off_curve(mouse));
    }

    let Some(prev) = contour.previous_on_curve(last) else {
        return;
    };
    let mirrored = mirror_handle(on_curve, mouse);
    if last - prev == 1 {
        let retracted = PathPoint::off_curve(contour.points()[prev].point);
        let points = contour.points_mut();
        points.insert(last, PathPoint::off_curve(mirrored));
        points.insert(last, retracted);
        last += 2;
    } else {
        contour.points_mut()[last - 1].point = mirrored;
    }
    contour.points_mut()[last].kind = if alt { PointKind::Corner } else { PointKind::Smooth };
}

/// Drag out the handles of the first point of a just-closed contour
///
/// The closing segment becomes a curve whose incoming handle mirrors the
/// cursor; the outgoing handle follows the cursor if the first segment is
/// already a curve.
fn shape_first_point(contour: &mut Contour, mouse: Point, alt: bool) {
    let (Some(first), Some(last)) = (contour.first_on_curve(), contour.last_on_curve()) else {
        return;
    };
    let on_curve = contour.points()[first].point;
    let mirrored = mirror_handle(on_curve, mouse);

    if last + 1 == contour.len() {
        let retracted = PathPoint::off_curve(contour.points()[last].point);
        contour.add_point(retracted);
        contour.add_point(PathPoint::off_curve(mirrored));
    } else {
        let tail = contour.len() - 1;
        contour.points_mut()[tail].point = mirrored;
    }

    let outgoing = first + 1;
    let has_outgoing = contour.point(outgoing).is_some_and(PathPoint::is_off_curve);
    if has_outgoing {
        contour.points_mut()[outgoing].point = mouse;
    }
    contour.points_mut()[first].kind = if has_outgoing && !alt {
        PointKind::Smooth
    } else {
        PointKind::Corner
    };
}

// ===== Tool Implementation =====

impl Tool for PenTool {
    fn id(&self) -> ToolId {
        ToolId::Pen
    }

    fn overlay(&self, session: &EditSession) -> Option<Overlay> {
        let contour = self.active_contour()?;
        let to = self.preview?;
        let ci = Self::contour_index(session, contour)?;
        let contour = &session.glyph.contours[ci];
        let from = contour.points()[contour.last_on_curve()?].point;
        Some(Overlay::Pen { from, to })
    }

    fn key_down(&mut self, key: Key, _mods: Modifiers, session: &mut EditSession) -> bool {
        if key == Key::Escape && self.state != PenState::Idle {
            self.finish_contour(session);
            return true;
        }
        false
    }

    fn deactivate(&mut self, session: &mut EditSession) {
        self.finish_contour(session);
        self.preview = None;
    }
}

// ===== MouseDelegate Implementation =====

impl MouseDelegate for PenTool {
    type Data = EditSession;

    fn mouse_moved(&mut self, event: MouseEvent, data: &mut EditSession) {
        self.preview = Some(Self::canvas_pos(event, data));
    }

    fn left_down(&mut self, event: MouseEvent, data: &mut EditSession) {
        let pos = Self::canvas_pos(event, data);
        if let Err(err) = data.begin_operation(SnapshotScope::CONTOURS) {
            tracing::warn!("Pen: could not snapshot: {}", err);
        }
        data.editing = true;
        self.drag = None;
        self.preview = None;
        match self.state {
            PenState::Idle => self.press_idle(event, pos, data),
            PenState::Extending { contour } => self.press_extending(event, pos, contour, data),
        }
    }

    fn left_drag_began(&mut self, _event: MouseEvent, drag: Drag, data: &mut EditSession) {
        let mouse = data.viewport.to_canvas(drag.current);
        self.drag_handles(mouse, false, data);
    }

    fn left_drag_changed(&mut self, _event: MouseEvent, drag: Drag, data: &mut EditSession) {
        let mouse = data.viewport.to_canvas(drag.current);
        self.drag_handles(mouse, false, data);
    }

    fn left_drag_ended(&mut self, event: MouseEvent, drag: Drag, data: &mut EditSession) {
        let mouse = data.viewport.to_canvas(drag.current);
        self.drag_handles(mouse, event.mods.alt, data);
    }

    fn left_up(&mut self, _event: MouseEvent, data: &mut EditSession) {
        self.drag = None;
        data.editing = false;
        if let Err(err) = data.commit_operation() {
            tracing::warn!("Pen: could not commit: {}", err);
        }
    }

    fn cancel(&mut self, data: &mut EditSession) {
        if data.editing {
            data.editing = false;
            if let Err(err) = data.cancel_operation() {
                tracing::warn!("Pen: could not cancel: {}", err);
            }
        }
        // The restored contour may still end in a handle from an earlier drag
        self.finish_contour(data);
    }
}
