// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Snapshot-based undo and redo.
//!
//! Every user operation is bracketed by [`UndoState::begin_operation`] and
//! [`UndoState::commit_operation`]. Begin serializes the glyph (restricted
//! to a [`SnapshotScope`]) and pushes it; the mutations in between are not
//! recorded individually, so a whole drag is one entry. Nested begins while
//! an operation is open are ignored.

use crate::error::{EditError, Result};
use crate::model::{Glyph, GlyphSnapshot, SnapshotScope};
use crate::settings;
use std::collections::VecDeque;

/// One serialized glyph state on the undo or redo stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSnapshot {
    scope: SnapshotScope,
    bytes: Vec<u8>,
}

impl UndoSnapshot {
    pub fn capture(glyph: &Glyph, scope: SnapshotScope) -> Result<Self> {
        let bytes = GlyphSnapshot::capture(glyph, scope).to_bytes()?;
        Ok(Self { scope, bytes })
    }

    pub fn scope(&self) -> SnapshotScope {
        self.scope
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn restore(&self, glyph: &mut Glyph) -> Result<()> {
        GlyphSnapshot::from_bytes(&self.bytes)?.restore_into(glyph);
        Ok(())
    }
}

/// An operation between begin and commit
#[derive(Debug, Clone)]
struct OpenOperation {
    /// Redo entries cleared by the begin, given back if nothing changes
    cleared_redo: Vec<UndoSnapshot>,
}

/// Undo and redo stacks for one editing session
#[derive(Debug, Clone)]
pub struct UndoState {
    undo: VecDeque<UndoSnapshot>,
    redo: Vec<UndoSnapshot>,
    open: Option<OpenOperation>,
    max_depth: usize,
}

impl Default for UndoState {
    fn default() -> Self {
        Self::new(settings::undo::MAX_DEPTH)
    }
}

impl UndoState {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            open: None,
            max_depth: max_depth.max(1),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Snapshot the glyph before an operation mutates it
    ///
    /// Clears the redo stack. Returns `false` without doing anything when
    /// an operation is already open.
    pub fn begin_operation(&mut self, glyph: &Glyph, scope: SnapshotScope) -> Result<bool> {
        if self.open.is_some() {
            tracing::trace!("Operation already open; begin ignored");
            return Ok(false);
        }
        let snapshot = UndoSnapshot::capture(glyph, scope)?;
        self.undo.push_back(snapshot);
        if self.undo.len() > self.max_depth {
            self.undo.pop_front();
            tracing::debug!("Undo depth {} reached; dropped oldest entry", self.max_depth);
        }
        self.open = Some(OpenOperation {
            cleared_redo: std::mem::take(&mut self.redo),
        });
        Ok(true)
    }

    /// Close the open operation
    ///
    /// If the glyph ended up byte-identical to the snapshot the entry is
    /// dropped and the redo stack restored. Returns whether an entry was
    /// kept.
    pub fn commit_operation(&mut self, glyph: &Glyph) -> Result<bool> {
        let Some(open) = self.open.take() else {
            return Ok(false);
        };
        let Some(top) = self.undo.back() else {
            return Ok(false);
        };
        let now = UndoSnapshot::capture(glyph, top.scope)?;
        if now == *top {
            self.undo.pop_back();
            self.redo = open.cleared_redo;
            tracing::trace!("Operation changed nothing; undo entry dropped");
            return Ok(false);
        }
        Ok(true)
    }

    /// Abort the open operation, putting the glyph back as it was
    pub fn cancel_operation(&mut self, glyph: &mut Glyph) -> Result<()> {
        let Some(open) = self.open.take() else {
            return Ok(());
        };
        if let Some(snapshot) = self.undo.pop_back() {
            snapshot.restore(glyph)?;
        }
        self.redo = open.cleared_redo;
        Ok(())
    }

    /// Restore the previous state
    ///
    /// An open operation is committed first.
    pub fn undo(&mut self, glyph: &mut Glyph) -> Result<()> {
        self.commit_operation(glyph)?;
        let snapshot = self.undo.pop_back().ok_or(EditError::EmptyStack)?;
        self.redo.push(UndoSnapshot::capture(glyph, snapshot.scope)?);
        snapshot.restore(glyph)?;
        tracing::debug!("Undo ({} left)", self.undo.len());
        Ok(())
    }

    /// Re-apply the last undone state
    pub fn redo(&mut self, glyph: &mut Glyph) -> Result<()> {
        self.commit_operation(glyph)?;
        let snapshot = self.redo.pop().ok_or(EditError::EmptyStack)?;
        self.undo.push_back(UndoSnapshot::capture(glyph, snapshot.scope)?);
        snapshot.restore(glyph)?;
        tracing::debug!("Redo ({} left)", self.redo.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Anchor;
    use crate::path::{Contour, PathPoint};
    use kurbo::Point;

    fn glyph() -> Glyph {
        let mut glyph = Glyph::new("l", 300.0);
        let mut contour = Contour::new(Point::new(0.0, 0.0));
        contour.add_point(PathPoint::corner(Point::new(0.0, 700.0)));
        glyph.contours.push(contour);
        glyph
    }

    fn bytes(glyph: &Glyph) -> Vec<u8> {
        GlyphSnapshot::capture(glyph, SnapshotScope::ALL)
            .to_bytes()
            .unwrap()
    }

    fn edit(undo: &mut UndoState, glyph: &mut Glyph, to: Point) {
        undo.begin_operation(glyph, SnapshotScope::CONTOURS).unwrap();
        glyph.contours[0].points_mut()[1].point = to;
        assert!(undo.commit_operation(glyph).unwrap());
    }

    #[test]
    fn undo_redo_is_idempotent() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        edit(&mut undo, &mut glyph, Point::new(10.0, 700.0));
        edit(&mut undo, &mut glyph, Point::new(20.0, 650.0));
        let after = bytes(&glyph);

        undo.undo(&mut glyph).unwrap();
        assert_ne!(bytes(&glyph), after);
        undo.redo(&mut glyph).unwrap();
        assert_eq!(bytes(&glyph), after);
    }

    #[test]
    fn undo_all_the_way_back() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        let original = bytes(&glyph);
        edit(&mut undo, &mut glyph, Point::new(10.0, 700.0));
        edit(&mut undo, &mut glyph, Point::new(20.0, 650.0));

        undo.undo(&mut glyph).unwrap();
        undo.undo(&mut glyph).unwrap();
        assert_eq!(bytes(&glyph), original);
        assert!(matches!(undo.undo(&mut glyph), Err(EditError::EmptyStack)));
    }

    #[test]
    fn empty_redo_is_an_error() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        let before = bytes(&glyph);
        assert!(matches!(undo.redo(&mut glyph), Err(EditError::EmptyStack)));
        assert_eq!(bytes(&glyph), before);
    }

    #[test]
    fn new_operation_clears_redo() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        edit(&mut undo, &mut glyph, Point::new(10.0, 700.0));
        undo.undo(&mut glyph).unwrap();
        assert!(undo.can_redo());
        edit(&mut undo, &mut glyph, Point::new(30.0, 700.0));
        assert!(!undo.can_redo());
    }

    #[test]
    fn nested_begin_makes_one_entry() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        assert!(undo.begin_operation(&glyph, SnapshotScope::CONTOURS).unwrap());
        for step in 1..=5 {
            assert!(!undo.begin_operation(&glyph, SnapshotScope::CONTOURS).unwrap());
            glyph.contours[0].points_mut()[1].point = Point::new(f64::from(step), 700.0);
        }
        undo.commit_operation(&glyph).unwrap();
        assert_eq!(undo.undo_depth(), 1);
    }

    #[test]
    fn unchanged_operation_is_dropped() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        edit(&mut undo, &mut glyph, Point::new(10.0, 700.0));
        undo.undo(&mut glyph).unwrap();

        undo.begin_operation(&glyph, SnapshotScope::CONTOURS).unwrap();
        assert!(!undo.commit_operation(&glyph).unwrap());
        assert_eq!(undo.undo_depth(), 0);
        // The redo entry survived the no-op
        assert!(undo.can_redo());
    }

    #[test]
    fn cancel_restores_snapshot() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        let before = bytes(&glyph);
        undo.begin_operation(&glyph, SnapshotScope::CONTOURS).unwrap();
        glyph.contours[0].points_mut()[0].point = Point::new(99.0, 99.0);
        undo.cancel_operation(&mut glyph).unwrap();
        assert_eq!(bytes(&glyph), before);
        assert!(!undo.can_undo());
    }

    #[test]
    fn scope_limits_what_undo_touches() {
        let mut undo = UndoState::default();
        let mut glyph = glyph();
        undo.begin_operation(&glyph, SnapshotScope::CONTOURS).unwrap();
        glyph.contours[0].points_mut()[1].point = Point::new(5.0, 5.0);
        undo.commit_operation(&glyph).unwrap();

        // Anchor added outside any operation survives the undo
        glyph.anchors.push(Anchor::new("top", Point::new(0.0, 800.0)));
        undo.undo(&mut glyph).unwrap();
        assert_eq!(glyph.anchors.len(), 1);
        assert_eq!(glyph.contours[0].points()[1].point, Point::new(0.0, 700.0));
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut undo = UndoState::new(3);
        let mut glyph = glyph();
        for i in 0..5 {
            edit(&mut undo, &mut glyph, Point::new(f64::from(i + 1), 0.0));
        }
        assert_eq!(undo.undo_depth(), 3);
    }
}
