// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Mouse state machine that separates clicks from drags.
//!
//! Raw pointer down/move/up events go into [`Mouse`]; it calls back into a
//! [`MouseDelegate`] (the active tool) with higher level events. A press
//! that travels further than the drag threshold before release becomes a
//! drag; anything shorter is a click.

use crate::settings;
use kurbo::Point;

/// Keyboard modifiers held during an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Cmd, whichever the platform uses for shortcuts
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A pointer event in view coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Position in view space
    pub pos: Point,
    /// Button that changed state, if any
    pub button: Option<MouseButton>,
    pub mods: Modifiers,
    /// Click count for presses (2 for a double click)
    pub count: u8,
}

impl MouseEvent {
    pub fn new(pos: Point, button: Option<MouseButton>) -> Self {
        Self::with_modifiers(pos, button, Modifiers::default())
    }

    pub fn with_modifiers(pos: Point, button: Option<MouseButton>, mods: Modifiers) -> Self {
        Self {
            pos,
            button,
            mods,
            count: 1,
        }
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }
}

impl Default for MouseEvent {
    fn default() -> Self {
        Self::new(Point::ZERO, None)
    }
}

/// Positions of an ongoing drag, in view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub start: Point,
    pub prev: Point,
    pub current: Point,
}

/// Receiver of the events produced by [`Mouse`]
#[allow(unused_variables)]
pub trait MouseDelegate {
    type Data;

    fn mouse_moved(&mut self, event: MouseEvent, data: &mut Self::Data) {}
    fn left_down(&mut self, event: MouseEvent, data: &mut Self::Data) {}
    fn left_up(&mut self, event: MouseEvent, data: &mut Self::Data) {}
    fn left_click(&mut self, event: MouseEvent, data: &mut Self::Data) {}
    fn left_drag_began(&mut self, event: MouseEvent, drag: Drag, data: &mut Self::Data) {}
    fn left_drag_changed(&mut self, event: MouseEvent, drag: Drag, data: &mut Self::Data) {}
    fn left_drag_ended(&mut self, event: MouseEvent, drag: Drag, data: &mut Self::Data) {}
    fn cancel(&mut self, data: &mut Self::Data) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MouseState {
    /// No button held
    Up,
    /// Left button held, not yet past the drag threshold
    Down(MouseEvent),
    /// Left button held and dragging
    Drag { start: MouseEvent, last: MouseEvent },
}

/// Turns raw pointer events into clicks and drags
#[derive(Debug, Clone)]
pub struct Mouse {
    state: MouseState,
    drag_threshold: f64,
}

impl Default for Mouse {
    fn default() -> Self {
        Self::new(settings::mouse::DRAG_THRESHOLD)
    }
}

impl Mouse {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            state: MouseState::Up,
            drag_threshold,
        }
    }

    /// Whether the left button is currently held
    pub fn is_down(&self) -> bool {
        !matches!(self.state, MouseState::Up)
    }

    pub fn mouse_down<D: MouseDelegate>(&mut self, event: MouseEvent, delegate: &mut D, data: &mut D::Data) {
        if event.button != Some(MouseButton::Left) {
            tracing::trace!("Ignoring {:?} button press", event.button);
            return;
        }
        if self.is_down() {
            tracing::trace!("Press while already down; ignored");
            return;
        }
        self.state = MouseState::Down(event);
        delegate.left_down(event, data);
    }

    pub fn mouse_moved<D: MouseDelegate>(&mut self, event: MouseEvent, delegate: &mut D, data: &mut D::Data) {
        match self.state {
            MouseState::Up => delegate.mouse_moved(event, data),
            MouseState::Down(press) => {
                if (event.pos - press.pos).hypot() <= self.drag_threshold {
                    return;
                }
                let drag = Drag {
                    start: press.pos,
                    prev: press.pos,
                    current: event.pos,
                };
                self.state = MouseState::Drag {
                    start: press,
                    last: event,
                };
                delegate.left_drag_began(event, drag, data);
            }
            MouseState::Drag { start, last } => {
                let drag = Drag {
                    start: start.pos,
                    prev: last.pos,
                    current: event.pos,
                };
                self.state = MouseState::Drag { start, last: event };
                delegate.left_drag_changed(event, drag, data);
            }
        }
    }

    pub fn mouse_up<D: MouseDelegate>(&mut self, event: MouseEvent, delegate: &mut D, data: &mut D::Data) {
        if event.button.is_some_and(|b| b != MouseButton::Left) {
            return;
        }
        match std::mem::replace(&mut self.state, MouseState::Up) {
            MouseState::Up => {
                tracing::trace!("Release without press; ignored");
            }
            MouseState::Down(press) => {
                let click = MouseEvent {
                    count: press.count,
                    ..event
                };
                delegate.left_click(click, data);
                delegate.left_up(event, data);
            }
            MouseState::Drag { start, last } => {
                let drag = Drag {
                    start: start.pos,
                    prev: last.pos,
                    current: event.pos,
                };
                delegate.left_drag_ended(event, drag, data);
                delegate.left_up(event, data);
            }
        }
    }

    /// Abort whatever gesture is in progress
    pub fn cancel<D: MouseDelegate>(&mut self, delegate: &mut D, data: &mut D::Data) {
        self.state = MouseState::Up;
        delegate.cancel(data);
    }
}
