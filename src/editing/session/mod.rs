// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Edit session - manages editing state for a single glyph

mod hit_testing;
mod path_editing;

pub use hit_testing::SegmentHit;
pub use path_editing::NudgeDirection;

use super::hit_test::HitCache;
use super::notify::{Notification, Notifications};
use super::selection::Selection;
use super::undo::UndoState;
use super::viewport::{ViewPort, ZoomAnchor};
use crate::error::Result;
use crate::model::{EntityId, Glyph, SnapshotScope};
use crate::path::PointKind;
use crate::settings::Settings;
use kurbo::{Line, Point, Size, Vec2};

/// Padding in view pixels kept around the glyph by [`EditSession::fit_glyph`]
const FIT_PADDING: f64 = 40.0;

/// A contour point as the painter sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointInfo {
    pub id: EntityId,
    pub contour: usize,
    pub index: usize,
    /// Position in canvas space
    pub point: Point,
    pub kind: PointKind,
    pub selected: bool,
}

/// Editing session for one open glyph
///
/// Holds the glyph, selection, viewport and undo history, plus the
/// interaction state the tools share: the grabbed item, the editing flag
/// and the hit-test cache. Notifications are queued here and drained by the
/// host.
#[derive(Debug, Clone)]
pub struct EditSession {
    /// The glyph being edited
    pub glyph: Glyph,

    /// Currently selected entities (points, anchors, components, guides)
    pub selection: Selection,

    /// Viewport transformation
    pub viewport: ViewPort,

    /// Runtime settings (hit radius, nudge amounts, snapping, ...)
    pub settings: Settings,

    /// The item under the pointer when the left button went down
    pub grabbed: Option<EntityId>,

    /// True only while a button is held during a create or extend
    pub editing: bool,

    hit_cache: HitCache,
    undo: UndoState,
    notifications: Notifications,
}

impl EditSession {
    pub fn new(glyph: Glyph, settings: Settings) -> Self {
        tracing::debug!(
            "Opening {} ({} contours, {} points)",
            glyph.name,
            glyph.contours.len(),
            glyph.point_count()
        );
        Self {
            glyph,
            selection: Selection::new(),
            viewport: ViewPort::new(),
            undo: UndoState::new(settings.undo.max_depth),
            settings,
            grabbed: None,
            editing: false,
            hit_cache: HitCache::default(),
            notifications: Notifications::default(),
        }
    }

    /// Hit radius in view pixels
    pub fn hit_radius(&self) -> f64 {
        self.settings.mouse.hit_radius
    }

    // ===== PAINTING SURFACE =====

    /// Every contour point, in contour order
    pub fn points(&self) -> Vec<PointInfo> {
        self.glyph
            .contours
            .iter()
            .enumerate()
            .flat_map(|(ci, contour)| {
                contour.points().iter().enumerate().map(move |(pi, pt)| PointInfo {
                    id: pt.id,
                    contour: ci,
                    index: pi,
                    point: pt.point,
                    kind: pt.kind,
                    selected: self.selection.contains(&pt.id),
                })
            })
            .collect()
    }

    /// Lines from every handle to its owning on-curve point
    pub fn handle_lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        for contour in &self.glyph.contours {
            for (i, pt) in contour.points().iter().enumerate() {
                if let Some(owner) = contour.owner_of(i) {
                    lines.push(Line::new(contour.points()[owner].point, pt.point));
                }
            }
        }
        lines
    }

    // ===== SELECTION =====

    /// Replace the selection, notifying if it changed
    pub fn set_selection(&mut self, selection: Selection) {
        if selection != self.selection {
            self.selection = selection;
            self.notifications.push(Notification::SelectionChanged);
        }
    }

    pub fn select_only(&mut self, id: EntityId) {
        self.set_selection(Selection::from_iter([id]));
    }

    pub fn toggle_selected(&mut self, id: EntityId) {
        let mut selection = self.selection.clone();
        selection.toggle(id);
        self.set_selection(selection);
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::new());
    }

    /// Drop selected ids that no longer name anything in the glyph
    pub fn prune_selection(&mut self) {
        let glyph = &self.glyph;
        let kept: Selection = self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                glyph.find_point(*id).is_some()
                    || glyph.anchors.iter().any(|a| a.id == *id)
                    || glyph.components.iter().any(|c| c.id == *id)
                    || glyph.guidelines.iter().any(|g| g.id == *id)
            })
            .collect();
        self.set_selection(kept);
    }

    // ===== CHANGE TRACKING =====

    /// Record that the outline changed: drop the hit cache and notify
    pub fn outline_changed(&mut self) {
        self.hit_cache.invalidate();
        self.notifications.push(Notification::OutlineChanged);
    }

    /// Take the notifications raised since the last call
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Indices of contours changed since the last call, clearing the marks
    pub fn take_changed_contours(&mut self) -> Vec<usize> {
        self.glyph
            .contours
            .iter_mut()
            .enumerate()
            .filter_map(|(i, contour)| contour.take_changed().then_some(i))
            .collect()
    }

    // ===== UNDO =====

    /// Snapshot the glyph before a user operation
    pub fn begin_operation(&mut self, scope: SnapshotScope) -> Result<bool> {
        self.undo.begin_operation(&self.glyph, scope)
    }

    pub fn commit_operation(&mut self) -> Result<bool> {
        self.undo.commit_operation(&self.glyph)
    }

    pub fn cancel_operation(&mut self) -> Result<()> {
        self.undo.cancel_operation(&mut self.glyph)?;
        self.outline_changed();
        self.prune_selection();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        self.undo.undo(&mut self.glyph)?;
        self.outline_changed();
        self.prune_selection();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.undo.redo(&mut self.glyph)?;
        self.outline_changed();
        self.prune_selection();
        Ok(())
    }

    /// Run `edit` as one undoable operation
    ///
    /// If `edit` fails the glyph is put back. Inside an already open
    /// operation this just runs `edit`; the outer operation owns the entry.
    pub fn with_operation<T>(
        &mut self,
        scope: SnapshotScope,
        edit: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let opened = self.begin_operation(scope)?;
        match edit(self) {
            Ok(value) => {
                if opened {
                    self.commit_operation()?;
                }
                Ok(value)
            }
            Err(err) => {
                if opened {
                    self.cancel_operation()?;
                }
                Err(err)
            }
        }
    }

    pub fn undo_state(&self) -> &UndoState {
        &self.undo
    }

    // ===== VIEWPORT =====

    pub fn set_view_size(&mut self, size: Size) {
        self.viewport.size = size;
        self.hit_cache.invalidate();
    }

    pub fn zoom_to(&mut self, scale: f64, anchor: ZoomAnchor) {
        let changed = self.viewport.zoom_to(scale, anchor);
        self.viewport_changed(changed);
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: ZoomAnchor) {
        let changed = self.viewport.zoom_by(factor, anchor, &self.settings.zoom);
        self.viewport_changed(changed);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
        self.viewport_changed(false);
    }

    /// Scale and center the viewport on the glyph's bounding box
    ///
    /// An empty glyph centers its advance box instead.
    pub fn fit_glyph(&mut self) {
        let rect = self
            .glyph
            .bounding_box()
            .unwrap_or_else(|| kurbo::Rect::new(0.0, 0.0, self.glyph.width.max(1.0), 1.0));
        let changed = self.viewport.fit_rect(rect, FIT_PADDING, &self.settings.zoom);
        self.viewport_changed(changed);
    }

    fn viewport_changed(&mut self, scale_changed: bool) {
        self.hit_cache.invalidate();
        if scale_changed {
            self.notifications.push(Notification::ScaleChanged);
        }
    }
}
