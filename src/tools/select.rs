// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Selection tool: click to select, drag to move, rubber-band to select
//! an area

use crate::editing::session::NudgeDirection;
use crate::editing::{Drag, EditSession, Modifiers, MouseDelegate, MouseEvent, Selection};
use crate::model::SnapshotScope;
use crate::tools::{Key, Overlay, Tool, ToolId};
use kurbo::{Point, Rect};

// ===== Drag State =====

/// What the current drag is doing
#[derive(Debug, Clone, Default)]
enum DragState {
    /// No drag in progress
    #[default]
    None,
    /// Selecting the entities inside a rectangle (canvas space)
    RubberBand {
        start: Point,
        current: Point,
        /// Selection before the drag began
        previous: Selection,
        /// Shift was held: add to `previous` instead of replacing it
        extend: bool,
    },
    /// Moving the selection; `last` is the previous canvas position
    Moving { last: Point },
}

// ===== SelectTool Struct =====

/// The selection tool
#[derive(Debug, Clone, Default)]
pub struct SelectTool {
    state: DragState,
}

impl SelectTool {
    fn update_drag(&mut self, drag: Drag, session: &mut EditSession) {
        let current = session.viewport.to_canvas(drag.current);
        match &mut self.state {
            DragState::None => {}
            DragState::Moving { last } => {
                let delta = current - *last;
                *last = current;
                session.move_selection(delta);
            }
            DragState::RubberBand {
                start,
                current: band_end,
                previous,
                extend,
            } => {
                *band_end = current;
                let rect = Rect::from_points(*start, current);
                let inside: Selection = session.entities_in_rect(rect).into_iter().collect();
                let selection = if *extend { previous.union(&inside) } else { inside };
                session.set_selection(selection);
            }
        }
    }
}

// ===== Tool Implementation =====

impl Tool for SelectTool {
    fn id(&self) -> ToolId {
        ToolId::Select
    }

    fn overlay(&self, _session: &EditSession) -> Option<Overlay> {
        match &self.state {
            DragState::RubberBand { start, current, .. } => {
                Some(Overlay::RubberBand(Rect::from_points(*start, *current)))
            }
            _ => None,
        }
    }

    fn key_down(&mut self, key: Key, mods: Modifiers, session: &mut EditSession) -> bool {
        let direction = match key {
            Key::ArrowUp => Some(NudgeDirection::Up),
            Key::ArrowDown => Some(NudgeDirection::Down),
            Key::ArrowLeft => Some(NudgeDirection::Left),
            Key::ArrowRight => Some(NudgeDirection::Right),
            _ => None,
        };
        if let Some(direction) = direction {
            if let Err(err) = session.nudge_selection(direction, mods.shift, mods.cmd()) {
                tracing::warn!("Nudge failed: {}", err);
            }
            return true;
        }

        match key {
            Key::Delete | Key::Backspace => {
                match session.delete_selection() {
                    Ok(count) => tracing::debug!("Deleted {} items", count),
                    Err(err) => tracing::warn!("Delete failed: {}", err),
                }
                true
            }
            Key::Escape => {
                if matches!(self.state, DragState::None) {
                    session.clear_selection();
                } else {
                    self.cancel(session);
                }
                true
            }
            _ => false,
        }
    }

    fn deactivate(&mut self, session: &mut EditSession) {
        if !matches!(self.state, DragState::None) {
            self.cancel(session);
        }
    }
}

// ===== MouseDelegate Implementation =====

impl MouseDelegate for SelectTool {
    type Data = EditSession;

    fn left_down(&mut self, event: MouseEvent, data: &mut EditSession) {
        if event.count >= 2
            && let Some(hit) = data.hit_test_point(event.pos, None)
        {
            data.grabbed = None;
            match data.toggle_point_type(hit.entity) {
                Ok(true) => tracing::debug!("Toggled point type of {:?}", hit.entity),
                Ok(false) => {}
                Err(err) => tracing::warn!("Toggle point type failed: {}", err),
            }
            return;
        }

        match data.hit_test_item(event.pos, None) {
            Some(hit) => {
                if event.mods.shift {
                    data.toggle_selected(hit.entity);
                } else if !data.selection.contains(&hit.entity) {
                    data.select_only(hit.entity);
                }
                data.grabbed = Some(hit.entity);
            }
            None => {
                data.grabbed = None;
                if !event.mods.shift {
                    data.clear_selection();
                }
            }
        }
    }

    fn left_click(&mut self, event: MouseEvent, data: &mut EditSession) {
        // A plain click on one item of a multi-selection narrows to it
        if !event.mods.shift
            && let Some(id) = data.grabbed
            && data.selection.len() > 1
        {
            data.select_only(id);
        }
    }

    fn left_drag_began(&mut self, event: MouseEvent, drag: Drag, data: &mut EditSession) {
        let start = data.viewport.to_canvas(drag.start);
        let grabbed_selected = data.grabbed.is_some_and(|id| data.selection.contains(&id));

        self.state = if grabbed_selected {
            if let Err(err) = data.begin_operation(SnapshotScope::ALL) {
                tracing::warn!("Could not snapshot before move: {}", err);
            }
            tracing::debug!("Select: moving {} items", data.selection.len());
            DragState::Moving { last: start }
        } else {
            DragState::RubberBand {
                start,
                current: start,
                previous: data.selection.clone(),
                extend: event.mods.shift,
            }
        };
        self.update_drag(drag, data);
    }

    fn left_drag_changed(&mut self, _event: MouseEvent, drag: Drag, data: &mut EditSession) {
        self.update_drag(drag, data);
    }

    fn left_drag_ended(&mut self, _event: MouseEvent, drag: Drag, data: &mut EditSession) {
        self.update_drag(drag, data);
        if let DragState::Moving { .. } = std::mem::take(&mut self.state)
            && let Err(err) = data.commit_operation()
        {
            tracing::warn!("Could not commit move: {}", err);
        }
    }

    fn left_up(&mut self, _event: MouseEvent, data: &mut EditSession) {
        data.grabbed = None;
    }

    fn cancel(&mut self, data: &mut EditSession) {
        match std::mem::take(&mut self.state) {
            DragState::Moving { .. } => {
                if let Err(err) = data.cancel_operation() {
                    tracing::warn!("Could not cancel move: {}", err);
                }
            }
            DragState::RubberBand { previous, .. } => data.set_selection(previous),
            DragState::None => {}
        }
        data.grabbed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Anchor, EntityId, Glyph};
    use crate::path::{Contour, PathPoint, PointKind};
    use crate::settings::Settings;
    use crate::tools::ToolBox;
    use crate::tools::test_support::{Harness, square_session};

    fn select(session: EditSession) -> Harness {
        Harness::new(ToolBox::for_id(ToolId::Select), session)
    }

    fn id_at(h: &Harness, index: usize) -> EntityId {
        h.session.glyph.contours[0].points()[index].id
    }

    #[test]
    fn click_selects_and_empty_click_clears() {
        let mut h = select(square_session());
        h.click((100.0, 0.0));
        assert_eq!(h.session.selection.len(), 1);
        assert!(h.session.selection.contains(&id_at(&h, 1)));

        h.click((50.0, 50.0));
        assert!(h.session.selection.is_empty());
    }

    #[test]
    fn shift_click_toggles() {
        let mut h = select(square_session());
        h.click((0.0, 0.0));
        h.mods.shift = true;
        h.click((100.0, 0.0));
        assert_eq!(h.session.selection.len(), 2);
        h.click((0.0, 0.0));
        assert_eq!(h.session.selection.len(), 1);
        assert!(h.session.selection.contains(&id_at(&h, 1)));
        // Shift-click on empty canvas keeps the selection
        h.click((50.0, 50.0));
        assert_eq!(h.session.selection.len(), 1);
    }

    #[test]
    fn plain_click_narrows_multi_selection() {
        let mut h = select(square_session());
        let both: Selection = [id_at(&h, 0), id_at(&h, 1)].into_iter().collect();
        h.session.set_selection(both);
        h.click((0.0, 0.0));
        assert_eq!(h.session.selection.len(), 1);
        assert!(h.session.selection.contains(&id_at(&h, 0)));
    }

    #[test]
    fn drag_moves_selection_as_one_undo_entry() {
        let mut h = select(square_session());
        h.down((100.0, 100.0));
        h.drag_to((110.0, 105.0));
        h.drag_to((120.0, 110.0));
        h.up((120.0, 110.0));

        assert_eq!(h.session.glyph.contours[0].points()[2].point, Point::new(120.0, 110.0));
        assert_eq!(h.session.undo_state().undo_depth(), 1);
        h.session.undo().unwrap();
        assert_eq!(h.session.glyph.contours[0].points()[2].point, Point::new(100.0, 100.0));
    }

    #[test]
    fn rubber_band_selects_and_shift_extends() {
        let mut h = select(square_session());
        h.drag((-10.0, -10.0), (110.0, 10.0));
        assert_eq!(h.session.selection.len(), 2);
        assert!(h.tool.overlay(&h.session).is_none());

        h.mods.shift = true;
        h.drag((-10.0, 90.0), (10.0, 110.0));
        assert_eq!(h.session.selection.len(), 3);
    }

    #[test]
    fn rubber_band_shows_overlay_while_dragging() {
        let mut h = select(square_session());
        h.down((-10.0, -10.0));
        h.drag_to((50.0, 50.0));
        assert_eq!(
            h.tool.overlay(&h.session),
            Some(Overlay::RubberBand(Rect::new(-10.0, -10.0, 50.0, 50.0)))
        );
    }

    #[test]
    fn cancel_during_move_restores_glyph() {
        let mut h = select(square_session());
        let before = h.session.glyph.contours[0].points().to_vec();
        h.down((0.0, 0.0));
        h.drag_to((30.0, 30.0));
        h.mouse.cancel(&mut h.tool, &mut h.session);
        assert_eq!(h.session.glyph.contours[0].points(), before.as_slice());
        assert!(!h.session.undo_state().can_undo());
    }

    #[test]
    fn cancel_rubber_band_restores_selection() {
        let mut h = select(square_session());
        h.click((0.0, 0.0));
        let before = h.session.selection.clone();
        h.down((50.0, 50.0));
        h.session.set_selection(before.clone());
        h.drag_to((150.0, 150.0));
        h.mouse.cancel(&mut h.tool, &mut h.session);
        assert_eq!(h.session.selection, before);
    }

    #[test]
    fn smooth_handle_drag_keeps_tangent() {
        let mut glyph = Glyph::new("s", 200.0);
        glyph.contours.push(Contour::from_points(
            vec![
                PathPoint::corner(Point::new(-100.0, 0.0)),
                PathPoint::off_curve(Point::new(-60.0, 0.0)),
                PathPoint::off_curve(Point::new(-20.0, 0.0)),
                PathPoint::smooth(Point::new(0.0, 0.0)),
                PathPoint::off_curve(Point::new(20.0, 0.0)),
                PathPoint::off_curve(Point::new(60.0, 0.0)),
                PathPoint::corner(Point::new(100.0, 0.0)),
            ],
            false,
        ));
        let mut h = select(EditSession::new(glyph, Settings::default()));
        h.drag((-20.0, 0.0), (-10.0, -10.0));

        let points = h.session.glyph.contours[0].points();
        let moved = points[2].point;
        let opposite = points[4].point;
        assert_eq!(moved, Point::new(-10.0, -10.0));
        assert!((opposite.x - 18.284271).abs() < 1e-5);
        assert!((opposite.y - 18.284271).abs() < 1e-5);
        // Collinear through the smooth point
        assert!((moved.to_vec2().cross(opposite.to_vec2())).abs() < 1e-9);
    }

    #[test]
    fn double_click_toggles_smooth() {
        let mut h = select(square_session());
        h.double_down((100.0, 0.0));
        h.up((100.0, 0.0));
        assert_eq!(h.session.glyph.contours[0].points()[1].kind, PointKind::Smooth);
    }

    #[test]
    fn keys_delete_nudge_and_escape() {
        let mut h = select(square_session());
        h.click((0.0, 0.0));
        let mods = Modifiers::default();
        assert!(h.tool.key_down(Key::ArrowRight, mods, &mut h.session));
        assert_eq!(h.session.glyph.contours[0].points()[0].point, Point::new(1.0, 0.0));

        assert!(h.tool.key_down(Key::Delete, mods, &mut h.session));
        assert_eq!(h.session.glyph.point_count(), 3);

        h.click((100.0, 0.0));
        assert!(h.tool.key_down(Key::Escape, mods, &mut h.session));
        assert!(h.session.selection.is_empty());
        assert!(!h.tool.key_down(Key::Char('q'), mods, &mut h.session));
    }

    #[test]
    fn anchors_are_selectable_and_movable() {
        let mut session = square_session();
        session.glyph.anchors.push(Anchor::new("top", Point::new(50.0, 150.0)));
        let mut h = select(session);
        h.drag((50.0, 150.0), (60.0, 150.0));
        assert_eq!(h.session.glyph.anchors[0].position, Point::new(60.0, 150.0));
    }
}
