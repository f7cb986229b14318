// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Segments between consecutive on-curve points

use kurbo::{CubicBez, Line, ParamCurve, Point, QuadBez};

/// The geometry of one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight segment (no handles)
    Line(Line),
    /// Single-handle curve, kept so imported quadratic data can be cut
    Quadratic(QuadBez),
    /// Two-handle cubic curve
    Cubic(CubicBez),
}

/// A segment together with where it lives in its contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentInfo {
    /// Position of the segment in the contour (segment `k` starts at the
    /// `k`-th on-curve point)
    pub segment_index: usize,
    /// Index of the starting on-curve point
    pub start_index: usize,
    /// Index of the ending on-curve point (`0` for the closing segment
    /// of a closed contour)
    pub end_index: usize,
    pub segment: Segment,
}

impl Segment {
    /// Evaluate the segment at parameter `t`
    pub fn eval(&self, t: f64) -> Point {
        match self {
            Segment::Line(line) => line.eval(t),
            Segment::Quadratic(quad) => quad.eval(t),
            Segment::Cubic(cubic) => cubic.eval(t),
        }
    }
}
