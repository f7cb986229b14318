// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the outline model, undo stack and clipboard.
//!
//! Nothing here is fatal. Geometry degeneracies and events delivered to a
//! tool in the wrong state are recovered where they happen; the remaining
//! variants are handed back so the caller can grey out a menu item or
//! ignore the action.

use thiserror::Error;

/// Errors produced while editing an outline
#[derive(Debug, Error)]
pub enum EditError {
    /// A point or segment index outside the contour
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A segment parameter outside `[0, 1]`
    #[error("segment parameter {t} out of range [0, 1]")]
    ParameterOutOfRange { t: f64 },

    /// Undo or redo with nothing to pop
    #[error("nothing to undo or redo")]
    EmptyStack,

    /// Zero-length or parallel inputs to a geometric computation
    #[error("degenerate geometry")]
    DegenerateGeometry,

    /// A pointer event arrived in a state that does not handle it
    #[error("event not valid in the current tool state")]
    InvalidToolEvent,

    /// A snapshot blob could not be encoded or decoded
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A clipboard payload of a foreign type
    #[error("unsupported clipboard type {found:?}")]
    ClipboardType { found: String },
}

pub type Result<T, E = EditError> = std::result::Result<T, E>;
