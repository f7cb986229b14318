// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Change notifications raised by an editing session.
//!
//! The session only queues these; a host drains the queue once per frame
//! and decides what to repaint or refresh.

/// Something observable about the session changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// The set of selected entities changed
    SelectionChanged,
    /// Contours, anchors, components or guidelines changed
    OutlineChanged,
    /// The viewport scale changed
    ScaleChanged,
}

/// Pending notifications, coalesced so each kind is queued once per drain
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    pending: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        if !self.pending.contains(&notification) {
            self.pending.push(notification);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, notification: Notification) -> bool {
        self.pending.contains(&notification)
    }

    /// Take everything queued since the last drain, in raise order
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_coalesced() {
        let mut queue = Notifications::default();
        queue.push(Notification::OutlineChanged);
        queue.push(Notification::SelectionChanged);
        queue.push(Notification::OutlineChanged);
        assert_eq!(
            queue.drain(),
            vec![Notification::OutlineChanged, Notification::SelectionChanged]
        );
        assert!(queue.is_empty());
    }
}
