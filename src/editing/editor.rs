// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The editor: one optional open glyph, the active tool and the mouse
//!
//! A host feeds raw pointer and key events in view space; the editor runs
//! them through the mouse state machine into the active tool. Without an
//! open glyph every event is ignored.

use super::clipboard::{self, ClipboardPayload};
use super::mouse::{Modifiers, Mouse, MouseEvent};
use super::notify::Notification;
use super::session::EditSession;
use super::viewport::ZoomAnchor;
use crate::error::Result;
use crate::model::Glyph;
use crate::settings::Settings;
use crate::tools::{Key, Overlay, ToolBox, ToolId};

/// Drives an [`EditSession`] from host input
#[derive(Debug, Clone)]
pub struct Editor {
    session: Option<EditSession>,
    tool: ToolBox,
    mouse: Mouse,
    settings: Settings,
    /// Last copied payload, for hosts without a system clipboard
    clipboard: Option<ClipboardPayload>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Editor {
    pub fn new(settings: Settings) -> Self {
        Self {
            session: None,
            tool: ToolBox::default(),
            mouse: Mouse::new(settings.mouse.drag_threshold),
            settings,
            clipboard: None,
        }
    }

    // ===== SESSION =====

    /// Open a glyph for editing, closing any glyph already open
    pub fn open(&mut self, glyph: Glyph) {
        self.close();
        tracing::info!("Editing glyph '{}'", glyph.name);
        self.session = Some(EditSession::new(glyph, self.settings.clone()));
    }

    /// Close the open glyph and hand it back; its undo history is dropped
    pub fn close(&mut self) -> Option<Glyph> {
        let mut session = self.session.take()?;
        self.reset_tool(&mut session);
        tracing::debug!("Closed glyph '{}'", session.glyph.name);
        Some(session.glyph)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ===== TOOLS =====

    pub fn tool_id(&self) -> ToolId {
        self.tool.id()
    }

    /// Switch tools; the previous tool is cancelled and deactivated
    pub fn set_tool(&mut self, id: ToolId) {
        if self.tool.id() == id {
            return;
        }
        if let Some(mut session) = self.session.take() {
            self.reset_tool(&mut session);
            self.session = Some(session);
        }
        tracing::debug!("Tool: {:?} -> {:?}", self.tool.id(), id);
        self.tool = ToolBox::for_id(id);
    }

    /// Abort any gesture in progress and let the tool wrap up
    fn reset_tool(&mut self, session: &mut EditSession) {
        if self.mouse.is_down() {
            self.mouse.cancel(&mut self.tool, session);
        }
        self.tool.deactivate(session);
        self.mouse = Mouse::new(self.settings.mouse.drag_threshold);
    }

    /// Feedback for the painter from the active tool
    pub fn overlay(&self) -> Option<Overlay> {
        self.tool.overlay(self.session.as_ref()?)
    }

    // ===== POINTER =====

    pub fn pointer_down(&mut self, event: MouseEvent) {
        let Some(session) = self.session.as_mut() else {
            tracing::trace!("Pointer down with no open glyph; ignored");
            return;
        };
        self.mouse.mouse_down(event, &mut self.tool, session);
    }

    pub fn pointer_move(&mut self, event: MouseEvent) {
        if let Some(session) = self.session.as_mut() {
            self.mouse.mouse_moved(event, &mut self.tool, session);
        }
    }

    pub fn pointer_up(&mut self, event: MouseEvent) {
        let Some(session) = self.session.as_mut() else {
            tracing::trace!("Pointer up with no open glyph; ignored");
            return;
        };
        self.mouse.mouse_up(event, &mut self.tool, session);
    }

    // ===== KEYBOARD =====

    /// Handle a key press; returns whether anything used it
    pub fn key_down(&mut self, key: Key, mods: Modifiers) -> bool {
        if self.session.is_none() {
            tracing::trace!("Key {:?} with no open glyph; ignored", key);
            return false;
        }

        if mods.cmd() {
            return self.handle_shortcut(key, mods);
        }

        if key == Key::Escape
            && self.mouse.is_down()
            && let Some(session) = self.session.as_mut()
        {
            self.mouse.cancel(&mut self.tool, session);
            return true;
        }

        if !mods.shift && let Some(id) = tool_for_key(key) {
            self.set_tool(id);
            return true;
        }

        match self.session.as_mut() {
            Some(session) => self.tool.key_down(key, mods, session),
            None => false,
        }
    }

    fn handle_shortcut(&mut self, key: Key, mods: Modifiers) -> bool {
        let Key::Char(c) = key else {
            return false;
        };
        let result = match c.to_ascii_lowercase() {
            'z' if mods.shift => self.redo(),
            'z' => self.undo(),
            'c' => self.copy(),
            'x' => self.cut(),
            'v' => self.paste().map(|_| ()),
            'r' => self.reverse_contours().map(|_| ()),
            '=' | '+' => {
                self.zoom(self.settings.zoom.step, ZoomAnchor::ViewportCenter);
                Ok(())
            }
            '-' => {
                self.zoom(1.0 / self.settings.zoom.step, ZoomAnchor::ViewportCenter);
                Ok(())
            }
            '0' => {
                if let Some(session) = self.session.as_mut() {
                    session.fit_glyph();
                }
                Ok(())
            }
            _ => return false,
        };
        if let Err(err) = result {
            tracing::debug!("Shortcut {:?} failed: {}", c, err);
        }
        true
    }

    // ===== COMMANDS =====

    /// Undo the last operation
    ///
    /// A gesture in progress is cancelled first. With no open glyph this
    /// does nothing.
    pub fn undo(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        if self.mouse.is_down() {
            self.mouse.cancel(&mut self.tool, &mut session);
        }
        let result = session.undo();
        self.session = Some(session);
        result
    }

    pub fn redo(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        if self.mouse.is_down() {
            self.mouse.cancel(&mut self.tool, &mut session);
        }
        let result = session.redo();
        self.session = Some(session);
        result
    }

    /// Copy the selection into the editor's clipboard
    pub fn copy(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        if let Some(payload) = clipboard::copy_selection(session)? {
            self.clipboard = Some(payload);
        }
        Ok(())
    }

    pub fn cut(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        if let Some(payload) = clipboard::cut_selection(session)? {
            self.clipboard = Some(payload);
        }
        Ok(())
    }

    /// Paste the editor's clipboard; returns how many items were added
    pub fn paste(&mut self) -> Result<usize> {
        match (self.session.as_mut(), self.clipboard.as_ref()) {
            (Some(session), Some(payload)) => clipboard::paste(session, payload),
            _ => Ok(0),
        }
    }

    /// The payload the last copy or cut produced
    pub fn clipboard(&self) -> Option<&ClipboardPayload> {
        self.clipboard.as_ref()
    }

    /// Replace the clipboard with a payload from the host
    pub fn set_clipboard(&mut self, payload: ClipboardPayload) {
        self.clipboard = Some(payload);
    }

    /// Reverse the contours touched by the selection, or every contour
    /// when nothing is selected; returns how many were reversed
    pub fn reverse_contours(&mut self) -> Result<usize> {
        match self.session.as_mut() {
            Some(session) => session.reverse_contours(),
            None => Ok(0),
        }
    }

    /// Zoom by `factor` around `anchor`
    pub fn zoom(&mut self, factor: f64, anchor: ZoomAnchor) {
        if let Some(session) = self.session.as_mut() {
            session.zoom_by(factor, anchor);
        }
    }

    /// Drain the open session's notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.session
            .as_mut()
            .map(EditSession::take_notifications)
            .unwrap_or_default()
    }
}

/// Single-letter tool shortcuts
fn tool_for_key(key: Key) -> Option<ToolId> {
    match key {
        Key::Char('v') => Some(ToolId::Select),
        Key::Char('p') => Some(ToolId::Pen),
        Key::Char('r') => Some(ToolId::Ruler),
        Key::Char('k') => Some(ToolId::Knife),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::MouseButton;
    use crate::error::EditError;
    use crate::path::{Contour, PathPoint};
    use kurbo::Point;

    fn square() -> Glyph {
        let mut glyph = Glyph::new("square", 100.0);
        glyph.contours.push(Contour::from_points(
            vec![
                PathPoint::corner(Point::new(0.0, 0.0)),
                PathPoint::corner(Point::new(100.0, 0.0)),
                PathPoint::corner(Point::new(100.0, 100.0)),
                PathPoint::corner(Point::new(0.0, 100.0)),
            ],
            true,
        ));
        glyph
    }

    /// A left-button event at a canvas position, with the default viewport
    fn at(editor: &Editor, x: f64, y: f64) -> MouseEvent {
        let pos = editor
            .session()
            .map(|s| s.viewport.to_view(Point::new(x, y)))
            .unwrap_or(Point::new(x, -y));
        MouseEvent::new(pos, Some(MouseButton::Left))
    }

    fn cmd() -> Modifiers {
        Modifiers {
            meta: true,
            ..Modifiers::default()
        }
    }

    #[test]
    fn events_without_a_glyph_do_nothing() {
        let mut editor = Editor::default();
        let event = at(&editor, 10.0, 10.0);
        editor.pointer_down(event);
        editor.pointer_move(event);
        editor.pointer_up(event);
        assert!(!editor.key_down(Key::Delete, Modifiers::default()));
        assert!(editor.undo().is_ok());
        assert!(editor.overlay().is_none());
        assert!(editor.take_notifications().is_empty());
    }

    #[test]
    fn pen_session_with_undo_and_redo() {
        let mut editor = Editor::default();
        editor.open(Glyph::new("a", 500.0));
        editor.set_tool(ToolId::Pen);
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (50.0, 100.0), (0.0, 0.0)] {
            let event = at(&editor, x, y);
            editor.pointer_down(event);
            editor.pointer_up(event);
        }
        let contour = &editor.session().unwrap().glyph.contours[0];
        assert!(contour.closed);
        assert_eq!(contour.len(), 3);

        assert!(editor.key_down(Key::Char('z'), cmd()));
        assert!(editor.session().unwrap().glyph.contours[0].is_open());

        let redo = Modifiers {
            shift: true,
            ..cmd()
        };
        assert!(editor.key_down(Key::Char('z'), redo));
        assert!(editor.session().unwrap().glyph.contours[0].closed);
    }

    #[test]
    fn undo_with_empty_history_reports_empty_stack() {
        let mut editor = Editor::default();
        editor.open(square());
        assert!(matches!(editor.undo(), Err(EditError::EmptyStack)));
    }

    #[test]
    fn escape_cancels_a_drag_in_progress() {
        let mut editor = Editor::default();
        editor.open(square());
        let start = at(&editor, 0.0, 0.0);
        editor.pointer_down(start);
        editor.pointer_move(at(&editor, 30.0, 30.0));
        assert_eq!(
            editor.session().unwrap().glyph.contours[0].points()[0].point,
            Point::new(30.0, 30.0)
        );

        assert!(editor.key_down(Key::Escape, Modifiers::default()));
        let session = editor.session().unwrap();
        assert_eq!(session.glyph.contours[0].points()[0].point, Point::ZERO);
        assert!(!session.undo_state().can_undo());
    }

    #[test]
    fn switching_tools_ends_the_pen_contour() {
        let mut editor = Editor::default();
        editor.open(Glyph::new("a", 500.0));
        assert!(editor.key_down(Key::Char('p'), Modifiers::default()));
        assert_eq!(editor.tool_id(), ToolId::Pen);
        for (x, y) in [(0.0, 0.0), (100.0, 0.0)] {
            let event = at(&editor, x, y);
            editor.pointer_down(event);
            editor.pointer_up(event);
        }
        editor.set_tool(ToolId::Select);
        editor.set_tool(ToolId::Pen);

        let event = at(&editor, 300.0, 300.0);
        editor.pointer_down(event);
        editor.pointer_up(event);
        assert_eq!(editor.session().unwrap().glyph.contours.len(), 2);
    }

    #[test]
    fn cmd_r_reverses_contours() {
        let mut editor = Editor::default();
        editor.open(square());
        assert!(editor.key_down(Key::Char('r'), cmd()));
        assert_eq!(editor.tool_id(), ToolId::Select);

        let session = editor.session().unwrap();
        let points: Vec<Point> = session.glyph.contours[0].points().iter().map(|pt| pt.point).collect();
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 100.0),
                Point::new(100.0, 100.0),
                Point::new(100.0, 0.0),
            ]
        );
        assert_eq!(session.undo_state().undo_depth(), 1);
    }

    #[test]
    fn copy_and_paste_through_shortcuts() {
        let mut editor = Editor::default();
        editor.open(square());
        let ids: Vec<_> = editor.session().unwrap().glyph.contours[0]
            .points()
            .iter()
            .map(|pt| pt.id)
            .collect();
        if let Some(session) = editor.session_mut() {
            session.set_selection(ids.into_iter().collect());
        }
        assert!(editor.key_down(Key::Char('c'), cmd()));
        assert!(editor.clipboard().is_some());
        assert!(editor.key_down(Key::Char('v'), cmd()));

        let session = editor.session().unwrap();
        assert_eq!(session.glyph.contours.len(), 2);
        assert!(session.glyph.contours[1].closed);
        assert_eq!(session.selection.len(), 4);
    }

    #[test]
    fn close_returns_the_glyph() {
        let mut editor = Editor::default();
        editor.open(square());
        let glyph = editor.close().unwrap();
        assert_eq!(glyph.name, "square");
        assert!(editor.session().is_none());
        assert!(editor.close().is_none());
    }

    #[test]
    fn notifications_drain_once() {
        let mut editor = Editor::default();
        editor.open(square());
        editor.zoom(2.0, ZoomAnchor::ViewportCenter);
        assert_eq!(editor.take_notifications(), vec![Notification::ScaleChanged]);
        assert!(editor.take_notifications().is_empty());
    }
}
