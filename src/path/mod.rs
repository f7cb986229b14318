// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editable contour geometry.
//!
//! A glyph outline is a list of [`Contour`]s, each an ordered run of
//! [`PathPoint`]s in drawing order. Segments are derived from the point
//! list on demand; nothing stores them. [`intersect`] holds the pure line
//! and curve intersection routines used by the knife and ruler.

pub mod contour;
pub mod intersect;
pub mod point;
pub mod segment;

pub use contour::{Contour, Handles};
pub use intersect::Intersection;
pub use point::{PathPoint, PointKind};
pub use segment::{Segment, SegmentInfo};
