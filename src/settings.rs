// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor settings and configuration constants.
//!
//! The constants at the top are the built-in defaults. The public modules
//! below re-export them by concern, and [`Settings`] carries the same
//! values at runtime so a host can override them from a TOML file.

use anyhow::{Context, Result};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// VIEWPORT SETTINGS
// ============================================================================
/// Smallest scale a viewport accepts (1% of original size)
const MIN_ZOOM: f64 = 0.01;

/// Largest scale reachable by stepwise zooming (50x original size)
const MAX_ZOOM: f64 = 50.0;

/// Multiplier applied per zoom-in step
const ZOOM_STEP: f64 = 1.25;

// ============================================================================
// POINTER SETTINGS
// ============================================================================
/// Radius around a point, in view pixels, that still counts as a hit
const HIT_RADIUS: f64 = 6.0;

/// Distance in view pixels the pointer must travel before a press
/// becomes a drag
const DRAG_THRESHOLD: f64 = 2.0;

// ============================================================================
// SNAP TO GRID SETTINGS
// ============================================================================
/// Whether new points placed by the pen snap to the grid
const SNAP_TO_GRID_ENABLED: bool = false;

/// Grid spacing for snapping (design units)
const SNAP_TO_GRID_SPACING: f64 = 2.0;

// ============================================================================
// NUDGE SETTINGS
// ============================================================================
/// Base nudge amount in design units (arrow key)
const NUDGE_BASE: f64 = 1.0;

/// Shift-arrow nudge amount in design units
const NUDGE_SHIFT: f64 = 10.0;

/// Ctrl/Cmd-arrow nudge amount in design units
const NUDGE_CMD: f64 = 100.0;

// ============================================================================
// UNDO SETTINGS
// ============================================================================
/// Number of undo snapshots kept before the oldest is dropped
const UNDO_MAX_DEPTH: usize = 128;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Viewport settings (zoom limits)
pub mod editor {
    /// Minimum scale (1% of original size)
    pub const MIN_ZOOM: f64 = super::MIN_ZOOM;

    /// Maximum scale for stepwise zoom (50x original size)
    pub const MAX_ZOOM: f64 = super::MAX_ZOOM;

    /// Zoom step factor
    pub const ZOOM_STEP: f64 = super::ZOOM_STEP;
}

/// Pointer hit testing and drag detection
pub mod mouse {
    pub const HIT_RADIUS: f64 = super::HIT_RADIUS;
    pub const DRAG_THRESHOLD: f64 = super::DRAG_THRESHOLD;
}

/// Snap-to-grid settings for pen placement
pub mod snap {
    /// Whether snap-to-grid is enabled
    pub const ENABLED: bool = super::SNAP_TO_GRID_ENABLED;

    /// Grid spacing to snap to (design units)
    pub const SPACING: f64 = super::SNAP_TO_GRID_SPACING;
}

/// Nudge amounts for arrow key point movement
pub mod nudge {
    /// Base nudge (arrow key alone)
    pub const BASE: f64 = super::NUDGE_BASE;

    /// Shift-arrow nudge
    pub const SHIFT: f64 = super::NUDGE_SHIFT;

    /// Cmd-arrow nudge
    pub const CMD: f64 = super::NUDGE_CMD;
}

/// Undo history limits
pub mod undo {
    pub const MAX_DEPTH: usize = super::UNDO_MAX_DEPTH;
}

// ============================================================================
// RUNTIME SETTINGS
// ============================================================================

/// Runtime copy of the settings above, overridable from TOML.
///
/// Every table and key is optional; missing values fall back to the
/// constants in this module.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub zoom: ZoomSettings,
    pub mouse: MouseSettings,
    pub snap: SnapSettings,
    pub nudge: NudgeSettings,
    pub undo: UndoSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseSettings {
    /// Hit radius in view pixels
    pub hit_radius: f64,
    /// Drag threshold in view pixels
    pub drag_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    pub spacing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NudgeSettings {
    pub base: f64,
    pub shift: f64,
    pub cmd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoSettings {
    pub max_depth: usize,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min: editor::MIN_ZOOM,
            max: editor::MAX_ZOOM,
            step: editor::ZOOM_STEP,
        }
    }
}

impl Default for MouseSettings {
    fn default() -> Self {
        Self {
            hit_radius: mouse::HIT_RADIUS,
            drag_threshold: mouse::DRAG_THRESHOLD,
        }
    }
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: snap::ENABLED,
            spacing: snap::SPACING,
        }
    }
}

impl Default for NudgeSettings {
    fn default() -> Self {
        Self {
            base: nudge::BASE,
            shift: nudge::SHIFT,
            cmd: nudge::CMD,
        }
    }
}

impl Default for UndoSettings {
    fn default() -> Self {
        Self {
            max_depth: undo::MAX_DEPTH,
        }
    }
}

/// A settings document that parsed badly or holds unusable values
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Zoom limits must be positive and finite with min <= max (min {min}, max {max})")]
    ZoomLimits { min: f64, max: f64 },
    #[error("Zoom step must be positive and finite (got {0})")]
    ZoomStep(f64),
}

impl Settings {
    /// Parse and validate settings from a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would otherwise break the viewport
    pub fn validate(&self) -> Result<(), SettingsError> {
        let ZoomSettings { min, max, step } = self.zoom;
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(min) || !usable(max) || min > max {
            return Err(SettingsError::ZoomLimits { min, max });
        }
        if !usable(step) {
            return Err(SettingsError::ZoomStep(step));
        }
        Ok(())
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings = Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse settings in {:?}", path))?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Nudge distance for an arrow key with the given modifiers
    pub fn nudge_amount(&self, shift: bool, cmd: bool) -> f64 {
        if cmd {
            self.nudge.cmd
        } else if shift {
            self.nudge.shift
        } else {
            self.nudge.base
        }
    }

    /// Snap a point to the nearest grid position when snapping is on
    pub fn snap_point(&self, point: Point) -> Point {
        let spacing = self.snap.spacing;
        if !self.snap.enabled || spacing <= 0.0 {
            return point;
        }
        Point::new(
            (point.x / spacing).round() * spacing,
            (point.y / spacing).round() * spacing,
        )
    }
}
