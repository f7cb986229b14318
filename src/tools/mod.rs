// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Tool system for glyph editing

use crate::editing::{Drag, EditSession, Modifiers, MouseDelegate, MouseEvent};
use kurbo::{Line, Point, Rect};
use serde::Deserialize;

// ===== Tool Identifier =====

/// Tool identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    /// Select and move points
    Select,
    /// Draw new contours
    Pen,
    /// Measure distances and angles
    Ruler,
    /// Cut contours along a line
    Knife,
}

// ===== Keys and Overlays =====

/// Keys the tools respond to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

/// Tool feedback for the painter, in canvas space
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Selection rectangle
    RubberBand(Rect),
    /// Ruler line with its measurement
    Ruler(ruler::Measurement),
    /// Cutting line and where it crosses the outline
    Knife { line: Line, hits: Vec<Point> },
    /// Preview of the next pen segment
    Pen { from: Point, to: Point },
}

/// Constrain `to` so the line from `from` is horizontal or vertical
pub(crate) fn constrain_axis(from: Point, to: Point) -> Point {
    let delta = to - from;
    if delta.x.abs() >= delta.y.abs() {
        Point::new(to.x, from.y)
    } else {
        Point::new(from.x, to.y)
    }
}

// ===== Tool Trait =====

/// A tool for editing glyphs
pub trait Tool: MouseDelegate<Data = EditSession> {
    /// Get the tool identifier
    fn id(&self) -> ToolId;

    /// Feedback to paint over the glyph
    fn overlay(&self, _session: &EditSession) -> Option<Overlay> {
        None
    }

    /// Handle a key press; returns whether the key was used
    fn key_down(&mut self, _key: Key, _mods: Modifiers, _session: &mut EditSession) -> bool {
        false
    }

    /// Called when another tool takes over
    fn deactivate(&mut self, _session: &mut EditSession) {}
}

// ===== ToolBox Enum =====

/// Enum wrapping all tool types
#[derive(Debug, Clone)]
pub enum ToolBox {
    Select(select::SelectTool),
    Pen(pen::PenTool),
    Ruler(ruler::RulerTool),
    Knife(knife::KnifeTool),
}

impl Default for ToolBox {
    fn default() -> Self {
        ToolBox::for_id(ToolId::Select)
    }
}

// ===== ToolBox Implementation =====

impl ToolBox {
    /// Create a tool by ID
    pub fn for_id(id: ToolId) -> Self {
        match id {
            ToolId::Select => ToolBox::Select(select::SelectTool::default()),
            ToolId::Pen => ToolBox::Pen(pen::PenTool::default()),
            ToolId::Ruler => ToolBox::Ruler(ruler::RulerTool::default()),
            ToolId::Knife => ToolBox::Knife(knife::KnifeTool::default()),
        }
    }

    /// Get the tool ID
    pub fn id(&self) -> ToolId {
        match self {
            ToolBox::Select(tool) => tool.id(),
            ToolBox::Pen(tool) => tool.id(),
            ToolBox::Ruler(tool) => tool.id(),
            ToolBox::Knife(tool) => tool.id(),
        }
    }

    /// Current tool overlay
    pub fn overlay(&self, session: &EditSession) -> Option<Overlay> {
        match self {
            ToolBox::Select(tool) => tool.overlay(session),
            ToolBox::Pen(tool) => tool.overlay(session),
            ToolBox::Ruler(tool) => tool.overlay(session),
            ToolBox::Knife(tool) => tool.overlay(session),
        }
    }

    /// Handle a key press
    pub fn key_down(&mut self, key: Key, mods: Modifiers, session: &mut EditSession) -> bool {
        match self {
            ToolBox::Select(tool) => tool.key_down(key, mods, session),
            ToolBox::Pen(tool) => tool.key_down(key, mods, session),
            ToolBox::Ruler(tool) => tool.key_down(key, mods, session),
            ToolBox::Knife(tool) => tool.key_down(key, mods, session),
        }
    }

    /// Let the tool finish whatever it was doing
    pub fn deactivate(&mut self, session: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.deactivate(session),
            ToolBox::Pen(tool) => tool.deactivate(session),
            ToolBox::Ruler(tool) => tool.deactivate(session),
            ToolBox::Knife(tool) => tool.deactivate(session),
        }
    }

    /// Handle mouse down
    pub fn mouse_down(&mut self, event: MouseEvent, session: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.left_down(event, session),
            ToolBox::Pen(tool) => tool.left_down(event, session),
            ToolBox::Ruler(tool) => tool.left_down(event, session),
            ToolBox::Knife(tool) => tool.left_down(event, session),
        }
    }

    /// Handle mouse up
    pub fn mouse_up(&mut self, event: MouseEvent, session: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.left_up(event, session),
            ToolBox::Pen(tool) => tool.left_up(event, session),
            ToolBox::Ruler(tool) => tool.left_up(event, session),
            ToolBox::Knife(tool) => tool.left_up(event, session),
        }
    }

    /// Handle drag began
    pub fn drag_began(&mut self, event: MouseEvent, drag: Drag, session: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.left_drag_began(event, drag, session),
            ToolBox::Pen(tool) => tool.left_drag_began(event, drag, session),
            ToolBox::Ruler(tool) => tool.left_drag_began(event, drag, session),
            ToolBox::Knife(tool) => tool.left_drag_began(event, drag, session),
        }
    }

    /// Handle drag changed
    pub fn drag_changed(&mut self, event: MouseEvent, drag: Drag, session: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.left_drag_changed(event, drag, session),
            ToolBox::Pen(tool) => tool.left_drag_changed(event, drag, session),
            ToolBox::Ruler(tool) => tool.left_drag_changed(event, drag, session),
            ToolBox::Knife(tool) => tool.left_drag_changed(event, drag, session),
        }
    }

    /// Handle drag ended
    pub fn drag_ended(&mut self, event: MouseEvent, drag: Drag, session: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.left_drag_ended(event, drag, session),
            ToolBox::Pen(tool) => tool.left_drag_ended(event, drag, session),
            ToolBox::Ruler(tool) => tool.left_drag_ended(event, drag, session),
            ToolBox::Knife(tool) => tool.left_drag_ended(event, drag, session),
        }
    }
}

// ===== MouseDelegate Implementation =====

/// Implement MouseDelegate for ToolBox so it can be driven by the Mouse
/// state machine
impl MouseDelegate for ToolBox {
    type Data = EditSession;

    fn left_down(&mut self, event: MouseEvent, data: &mut EditSession) {
        self.mouse_down(event, data);
    }

    fn left_up(&mut self, event: MouseEvent, data: &mut EditSession) {
        self.mouse_up(event, data);
    }

    fn left_click(&mut self, event: MouseEvent, data: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.left_click(event, data),
            ToolBox::Pen(tool) => tool.left_click(event, data),
            ToolBox::Ruler(tool) => tool.left_click(event, data),
            ToolBox::Knife(tool) => tool.left_click(event, data),
        }
    }

    fn mouse_moved(&mut self, event: MouseEvent, data: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.mouse_moved(event, data),
            ToolBox::Pen(tool) => tool.mouse_moved(event, data),
            ToolBox::Ruler(tool) => tool.mouse_moved(event, data),
            ToolBox::Knife(tool) => tool.mouse_moved(event, data),
        }
    }

    fn left_drag_began(&mut self, event: MouseEvent, drag: Drag, data: &mut EditSession) {
        self.drag_began(event, drag, data);
    }

    fn left_drag_changed(&mut self, event: MouseEvent, drag: Drag, data: &mut EditSession) {
        self.drag_changed(event, drag, data);
    }

    fn left_drag_ended(&mut self, event: MouseEvent, drag: Drag, data: &mut EditSession) {
        self.drag_ended(event, drag, data);
    }

    fn cancel(&mut self, data: &mut EditSession) {
        match self {
            ToolBox::Select(tool) => tool.cancel(data),
            ToolBox::Pen(tool) => tool.cancel(data),
            ToolBox::Ruler(tool) => tool.cancel(data),
            ToolBox::Knife(tool) => tool.cancel(data),
        }
    }
}

// ===== Tool Modules =====

pub mod knife;
pub mod pen;
pub mod ruler;
pub mod select;
