// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Scripted editor sessions
//!
//! A script is a JSON array of events, each tagged by its `event` field:
//!
//! ```json
//! [
//!   { "event": "tool", "tool": "pen" },
//!   { "event": "down", "x": 0, "y": 0 },
//!   { "event": "move", "x": 40, "y": 10, "shift": true },
//!   { "event": "up", "x": 40, "y": 10 },
//!   { "event": "key", "key": "z", "cmd": true },
//!   { "event": "undo" },
//!   { "event": "zoom", "factor": 2.0 }
//! ]
//! ```
//!
//! Pointer positions are in canvas units and go through the session's
//! viewport, so scripts behave the same at any zoom.

use crate::editing::{Editor, Modifiers, MouseButton, MouseEvent, Notification, ZoomAnchor};
use crate::tools::{Key, ToolId};
use kurbo::Point;
use serde::Deserialize;

/// Modifier flags shared by pointer and key events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScriptModifiers {
    pub shift: bool,
    pub alt: bool,
    /// Ctrl or Cmd
    pub cmd: bool,
}

impl From<ScriptModifiers> for Modifiers {
    fn from(mods: ScriptModifiers) -> Self {
        Modifiers {
            shift: mods.shift,
            ctrl: false,
            alt: mods.alt,
            meta: mods.cmd,
        }
    }
}

/// One step of a script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ScriptEvent {
    Tool {
        tool: ToolId,
    },
    Down {
        x: f64,
        y: f64,
        /// 2 for a double click
        #[serde(default = "one")]
        count: u8,
        #[serde(flatten)]
        mods: ScriptModifiers,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(flatten)]
        mods: ScriptModifiers,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(flatten)]
        mods: ScriptModifiers,
    },
    Key {
        key: String,
        #[serde(flatten)]
        mods: ScriptModifiers,
    },
    Undo,
    Redo,
    Zoom {
        factor: f64,
    },
}

fn one() -> u8 {
    1
}

/// A parsed script
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// What happened while replaying
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Events run
    pub events: usize,
    /// Events that reported an error (an undo with nothing to undo, an
    /// unknown key name); these are logged and skipped
    pub failed: usize,
    /// Every notification raised, in order, one batch per event
    pub notifications: Vec<Vec<Notification>>,
}

/// Parse a key name: a single character or one of `delete`, `backspace`,
/// `escape`, `up`, `down`, `left`, `right`
pub fn parse_key(name: &str) -> Option<Key> {
    let key = match name.to_ascii_lowercase().as_str() {
        "delete" => Key::Delete,
        "backspace" => Key::Backspace,
        "escape" | "esc" => Key::Escape,
        "up" | "arrowup" => Key::ArrowUp,
        "down" | "arrowdown" => Key::ArrowDown,
        "left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrowright" => Key::ArrowRight,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

fn pointer_event(editor: &Editor, x: f64, y: f64, mods: ScriptModifiers) -> Option<MouseEvent> {
    let view = editor.session()?.viewport.to_view(Point::new(x, y));
    Some(MouseEvent::with_modifiers(
        view,
        Some(MouseButton::Left),
        mods.into(),
    ))
}

/// Run `script` through `editor`
pub fn replay(editor: &mut Editor, script: &Script) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, event) in script.events.iter().enumerate() {
        tracing::debug!("Replay [{}]: {:?}", index, event);
        if !apply(editor, event) {
            summary.failed += 1;
        }
        summary.events += 1;
        let notifications = editor.take_notifications();
        if !notifications.is_empty() {
            tracing::info!("Replay [{}]: {:?}", index, notifications);
        }
        summary.notifications.push(notifications);
    }
    summary
}

/// Apply one event; false if it failed
fn apply(editor: &mut Editor, event: &ScriptEvent) -> bool {
    match event {
        ScriptEvent::Tool { tool } => editor.set_tool(*tool),
        ScriptEvent::Down { x, y, count, mods } => {
            if let Some(event) = pointer_event(editor, *x, *y, *mods) {
                editor.pointer_down(event.with_count(*count));
            }
        }
        ScriptEvent::Move { x, y, mods } => {
            if let Some(event) = pointer_event(editor, *x, *y, *mods) {
                editor.pointer_move(event);
            }
        }
        ScriptEvent::Up { x, y, mods } => {
            if let Some(event) = pointer_event(editor, *x, *y, *mods) {
                editor.pointer_up(event);
            }
        }
        ScriptEvent::Key { key, mods } => {
            let Some(parsed) = parse_key(key) else {
                tracing::warn!("Unknown key name {:?}", key);
                return false;
            };
            editor.key_down(parsed, (*mods).into());
        }
        ScriptEvent::Undo => {
            if let Err(err) = editor.undo() {
                tracing::warn!("Undo failed: {}", err);
                return false;
            }
        }
        ScriptEvent::Redo => {
            if let Err(err) = editor.redo() {
                tracing::warn!("Redo failed: {}", err);
                return false;
            }
        }
        ScriptEvent::Zoom { factor } => editor.zoom(*factor, ZoomAnchor::ViewportCenter),
    }
    true
}
