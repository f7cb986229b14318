// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod clipboard;
pub mod editor;
pub mod handles;
pub mod mouse;
pub mod notify;
pub mod selection;
pub mod session;
pub mod undo;
pub mod viewport;

pub use clipboard::{ClipboardPayload, OUTLINE_MIME};
pub use editor::Editor;
pub use mouse::{Drag, Modifiers, Mouse, MouseButton, MouseDelegate, MouseEvent};
pub use notify::Notification;
pub use selection::Selection;
pub use session::{EditSession, NudgeDirection, PointInfo, SegmentHit};
pub use undo::UndoState;
pub use viewport::{ViewPort, ZoomAnchor};
