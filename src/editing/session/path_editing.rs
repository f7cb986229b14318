// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Path editing methods for EditSession: moving, nudging, deletion and
//! contour operations

use super::EditSession;
use crate::editing::handles;
use crate::error::{EditError, Result};
use crate::model::{EntityId, SnapshotScope};
use crate::path::PointKind;
use kurbo::Vec2;
use std::collections::BTreeSet;

/// Arrow key directions for nudging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl NudgeDirection {
    /// Unit vector in canvas space (y up)
    pub fn unit(self) -> Vec2 {
        match self {
            NudgeDirection::Up => Vec2::new(0.0, 1.0),
            NudgeDirection::Down => Vec2::new(0.0, -1.0),
            NudgeDirection::Left => Vec2::new(-1.0, 0.0),
            NudgeDirection::Right => Vec2::new(1.0, 0.0),
        }
    }
}

impl EditSession {
    /// Move the selection by a delta in canvas space
    ///
    /// Selected on-curve points carry their handles; handles of smooth
    /// points keep the opposite handle collinear. Selected anchors,
    /// components and guidelines move too. Not wrapped in an undo
    /// operation: drags open one for the whole gesture.
    ///
    /// Returns whether anything moved.
    pub fn move_selection(&mut self, delta: Vec2) -> bool {
        if self.selection.is_empty() || delta == Vec2::ZERO {
            return false;
        }

        let ids = self.selection.as_set().clone();
        let mut moved = 0;
        for contour in &mut self.glyph.contours {
            if contour.points().iter().any(|pt| ids.contains(&pt.id)) {
                moved += handles::move_points(contour, &ids, delta);
            }
        }
        for anchor in &mut self.glyph.anchors {
            if ids.contains(&anchor.id) {
                anchor.position += delta;
                moved += 1;
            }
        }
        for component in &mut self.glyph.components {
            if ids.contains(&component.id) {
                component.translate(delta);
                moved += 1;
            }
        }
        for guide in &mut self.glyph.guidelines {
            if ids.contains(&guide.id) {
                guide.position += delta;
                moved += 1;
            }
        }

        if moved > 0 {
            self.outline_changed();
        }
        moved > 0
    }

    /// Nudge the selection one step, as a single undoable operation
    ///
    /// Shift and Cmd pick the larger configured steps.
    pub fn nudge_selection(&mut self, direction: NudgeDirection, shift: bool, cmd: bool) -> Result<bool> {
        if self.selection.is_empty() {
            return Ok(false);
        }
        let delta = direction.unit() * self.settings.nudge_amount(shift, cmd);
        tracing::debug!("Nudge {:?} by {:?}", direction, delta);
        self.with_operation(SnapshotScope::ALL, |session| {
            Ok(session.move_selection(delta))
        })
    }

    /// Delete every selected entity
    ///
    /// Removing an on-curve point takes its handles with it; contours left
    /// without on-curve points are dropped. Returns the number of points
    /// and items removed.
    pub fn delete_selection(&mut self) -> Result<usize> {
        if self.selection.is_empty() {
            return Ok(0);
        }
        let ids: BTreeSet<EntityId> = self.selection.as_set().clone();
        let removed = self.with_operation(SnapshotScope::ALL, |session| {
            let glyph = &mut session.glyph;
            let mut removed = 0;
            for contour in &mut glyph.contours {
                removed += contour.remove_points(&ids);
            }
            let pruned = glyph.prune_empty();
            if pruned > 0 {
                tracing::debug!("Dropped {} emptied contours", pruned);
            }

            let before = glyph.anchors.len() + glyph.components.len() + glyph.guidelines.len();
            glyph.anchors.retain(|a| !ids.contains(&a.id));
            glyph.components.retain(|c| !ids.contains(&c.id));
            glyph.guidelines.retain(|g| !ids.contains(&g.id));
            removed += before - (glyph.anchors.len() + glyph.components.len() + glyph.guidelines.len());
            Ok(removed)
        })?;

        if removed > 0 {
            self.outline_changed();
        }
        self.clear_selection();
        Ok(removed)
    }

    /// Toggle an on-curve point between corner and smooth
    ///
    /// Becoming smooth realigns the outgoing handle with the incoming one.
    /// Off-curve points and unknown ids are left alone and report `false`.
    pub fn toggle_point_type(&mut self, id: EntityId) -> Result<bool> {
        let Some((ci, pi)) = self.glyph.find_point(id) else {
            return Ok(false);
        };
        if !self.glyph.contours[ci].points()[pi].is_on_curve() {
            return Ok(false);
        }
        self.with_operation(SnapshotScope::CONTOURS, |session| {
            let contour = &mut session.glyph.contours[ci];
            contour.toggle_smooth(pi);
            if contour.points()[pi].kind == PointKind::Smooth {
                handles::align_smooth_handles(contour, pi);
            }
            Ok(())
        })?;
        self.outline_changed();
        Ok(true)
    }

    /// Reverse the contours touched by the selection, or every contour
    /// when nothing is selected
    pub fn reverse_contours(&mut self) -> Result<usize> {
        let ids = self.selection.as_set().clone();
        let count = self.with_operation(SnapshotScope::CONTOURS, |session| {
            let mut count = 0;
            for contour in &mut session.glyph.contours {
                if ids.is_empty() || contour.points().iter().any(|pt| ids.contains(&pt.id)) {
                    contour.reverse();
                    count += 1;
                }
            }
            Ok(count)
        })?;
        if count > 0 {
            self.outline_changed();
        }
        Ok(count)
    }

    /// Split a segment at `t`, select the new point and return its id
    pub fn insert_point_on_segment(&mut self, contour: usize, segment_index: usize, t: f64) -> Result<EntityId> {
        let len = self.glyph.contours.len();
        if contour >= len {
            return Err(EditError::OutOfRange { index: contour, len });
        }
        let id = self.with_operation(SnapshotScope::CONTOURS, |session| {
            session.glyph.contours[contour].insert_point_at(segment_index, t)
        })?;
        self.outline_changed();
        self.select_only(id);
        Ok(id)
    }
}
