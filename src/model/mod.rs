// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Glyph data model

pub mod entity_id;
pub mod glyph;
pub mod snapshot;

pub use entity_id::EntityId;
pub use glyph::{Anchor, Component, Glyph, Guideline};
pub use snapshot::{GlyphSnapshot, SnapshotScope};
