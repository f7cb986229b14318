// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Selection set for tracking which outline entities are selected.
//!
//! `Selection` wraps an `Arc<BTreeSet<EntityId>>` so the tools can hold on
//! to the selection that was active when a gesture started (shift-extended
//! rubber bands need it) without copying. Mutations go through
//! `Arc::make_mut`. The `BTreeSet` gives deterministic iteration order,
//! which keeps multi-point moves and clipboard output stable.
//!
//! Ids in the set may refer to points, anchors, components or guidelines;
//! the set never owns anything and stale ids are harmless.

use crate::model::EntityId;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A set of selected entities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    inner: Arc<BTreeSet<EntityId>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.inner.contains(id)
    }

    /// Iterate over selected entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.inner.iter()
    }

    /// The underlying set
    pub fn as_set(&self) -> &BTreeSet<EntityId> {
        &self.inner
    }

    pub fn insert(&mut self, id: EntityId) {
        Arc::make_mut(&mut self.inner).insert(id);
    }

    pub fn remove(&mut self, id: &EntityId) {
        if self.inner.contains(id) {
            Arc::make_mut(&mut self.inner).remove(id);
        }
    }

    /// Add the id if absent, remove it if present
    pub fn toggle(&mut self, id: EntityId) {
        let set = Arc::make_mut(&mut self.inner);
        if !set.remove(&id) {
            set.insert(id);
        }
    }

    pub fn clear(&mut self) {
        if !self.inner.is_empty() {
            self.inner = Arc::default();
        }
    }

    /// Union with another selection
    pub fn union(&self, other: &Selection) -> Selection {
        self.inner.union(&other.inner).copied().collect()
    }

    /// Symmetric difference: ids in exactly one of the two selections
    pub fn symmetric_difference(&self, other: &Selection) -> Selection {
        self.inner
            .symmetric_difference(&other.inner)
            .copied()
            .collect()
    }
}

impl FromIterator<EntityId> for Selection {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl Extend<EntityId> for Selection {
    fn extend<I: IntoIterator<Item = EntityId>>(&mut self, iter: I) {
        Arc::make_mut(&mut self.inner).extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_selection_is_empty() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
    }

    #[test]
    fn insert_duplicate_is_noop() {
        let mut sel = Selection::new();
        let id = EntityId::next();
        sel.insert(id);
        sel.insert(id);
        assert_eq!(sel.len(), 1);
        assert!(sel.contains(&id));
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut sel = Selection::new();
        let id = EntityId::next();
        sel.toggle(id);
        assert!(sel.contains(&id));
        sel.toggle(id);
        assert!(sel.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let mut sel = Selection::new();
        let id1 = EntityId::next();
        let id2 = EntityId::next();
        sel.insert(id1);

        let mut clone = sel.clone();
        clone.insert(id2);

        assert!(!sel.contains(&id2));
        assert!(clone.contains(&id2));
    }

    #[test]
    fn set_operations() {
        let [a, b, c] = [EntityId::next(), EntityId::next(), EntityId::next()];
        let left: Selection = [a, b].into_iter().collect();
        let right: Selection = [b, c].into_iter().collect();

        let union = left.union(&right);
        assert_eq!(union.len(), 3);

        let toggled = left.symmetric_difference(&right);
        assert!(toggled.contains(&a));
        assert!(!toggled.contains(&b));
        assert!(toggled.contains(&c));
    }

    #[test]
    fn iteration_is_ordered() {
        let ids: Vec<EntityId> = (0..5).map(|_| EntityId::next()).collect();
        let sel: Selection = ids.iter().rev().copied().collect();
        let collected: Vec<EntityId> = sel.iter().copied().collect();
        assert_eq!(collected, ids);
    }
}
