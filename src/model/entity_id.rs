// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Unique identifiers for contours, points, anchors, components and guides.
//!
//! Each `EntityId` is a monotonically increasing `u64` generated from a global
//! atomic counter. Selections, hit-test results and tool state refer to
//! outline elements by id rather than by reference, so inserting or deleting
//! points never leaves a dangling handle. Ids survive snapshot round trips;
//! ids read back from a snapshot advance the counter past themselves so
//! later allocations cannot collide with them.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for an outline entity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(u64);

static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

impl EntityId {
    /// Create a new unique entity ID
    pub fn next() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Make sure future ids are allocated after this one
    pub fn reserve(self) {
        ENTITY_COUNTER.fetch_max(self.0 + 1, Ordering::Relaxed);
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::next()
    }
}
