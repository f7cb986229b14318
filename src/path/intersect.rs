// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Intersections between a straight cutting line and contour segments
//!
//! Used by the knife for live feedback and for the actual cut, and by the
//! ruler to find where it crosses the outline. All functions are pure.
//! A cutter of zero length has no direction; it yields no intersections.

use super::segment::Segment;
use crate::error::{EditError, Result};
use kurbo::common::{solve_itp, solve_quadratic};
use kurbo::{CubicBez, Line, ParamCurve, Point, QuadBez, Vec2};

/// Tolerance for parallel lines, duplicate roots and parameter clamping
const EPSILON: f64 = 1e-9;

/// Root accuracy in `t`, and how close to zero a normalized distance must
/// be to count as touching the cutter
const ROOT_EPSILON: f64 = 1e-12;

/// One crossing of a segment and a cutting line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Where the two cross, in canvas space
    pub point: Point,
    /// Parameter along the segment
    pub t: f64,
    /// Parameter along the cutting line
    pub line_t: f64,
}

/// Direction of a cutting line, or `DegenerateGeometry` if it has no length
pub fn cutter_direction(cutter: Line) -> Result<Vec2> {
    let dir = cutter.p1 - cutter.p0;
    if dir.hypot() < EPSILON {
        return Err(EditError::DegenerateGeometry);
    }
    Ok(dir)
}

/// Intersections of any segment kind with a cutting line
pub fn segment_line(segment: &Segment, cutter: Line) -> Vec<Intersection> {
    match segment {
        Segment::Line(line) => line_line(*line, cutter).into_iter().collect(),
        Segment::Quadratic(quad) => quad_line(*quad, cutter),
        Segment::Cubic(cubic) => cubic_line(*cubic, cutter),
    }
}

/// Intersection of two line segments
///
/// `t` is the parameter along `segment`, `line_t` along `cutter`. Parallel
/// or zero-length inputs (`|D| < ε`) have no intersection.
pub fn line_line(segment: Line, cutter: Line) -> Option<Intersection> {
    let r = segment.p1 - segment.p0;
    let q = cutter.p1 - cutter.p0;
    let det = r.x * q.y - q.x * r.y;
    if det.abs() < EPSILON {
        return None;
    }

    // Cramer's rule for segment.p0 + t*r = cutter.p0 + s*q
    let w = cutter.p0 - segment.p0;
    let t = (w.x * q.y - w.y * q.x) / det;
    let s = (w.x * r.y - w.y * r.x) / det;

    let t = clamp_unit(t)?;
    let line_t = clamp_unit(s)?;
    Some(Intersection {
        point: segment.eval(t),
        t,
        line_t,
    })
}

/// Intersections of a cubic Bézier with a line segment
///
/// The signed distances of the control points to the cutter's line are the
/// Bernstein coefficients of a scalar cubic in `t`; its roots in `[0, 1]`
/// are the candidate crossings. Each candidate is projected onto the
/// cutter and kept when it falls within the cutter's extent.
pub fn cubic_line(cubic: CubicBez, cutter: Line) -> Vec<Intersection> {
    let Ok(dir) = cutter_direction(cutter) else {
        return Vec::new();
    };
    let unit = dir / dir.hypot();
    let dist = |p: Point| unit.cross(p - cutter.p0);
    let coeffs = [dist(cubic.p0), dist(cubic.p1), dist(cubic.p2), dist(cubic.p3)];

    let len2 = dir.hypot2();
    unit_roots(coeffs)
        .into_iter()
        .filter_map(|t| {
            let point = cubic.eval(t);
            let line_t = clamp_unit((point - cutter.p0).dot(dir) / len2)?;
            Some(Intersection { point, t, line_t })
        })
        .collect()
}

/// Intersections of a quadratic Bézier with a line segment
///
/// Degree elevation keeps the parameterization, so the cubic's `t` values
/// apply to the quadratic unchanged.
pub fn quad_line(quad: QuadBez, cutter: Line) -> Vec<Intersection> {
    cubic_line(quad.raise(), cutter)
}

/// Sorted roots in `[0, 1]` of the cubic with Bernstein coefficients
/// `coeffs`
///
/// `[0, 1]` is cut at the turning points of the polynomial so every piece
/// is monotonic. A piece whose ends differ in sign holds one root, found
/// with ITP on the Bernstein form; a turning point that touches zero is a
/// tangent root. The power-basis cubic is never formed, so a vanishing
/// leading coefficient (a cutter nearly parallel to the curve, a raised
/// quadratic) costs no accuracy. A polynomial that is zero everywhere has
/// no isolated roots and yields none.
pub fn unit_roots(coeffs: [f64; 4]) -> Vec<f64> {
    let scale = coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if scale < EPSILON {
        return Vec::new();
    }
    let d = coeffs.map(|c| c / scale);
    let f = |t: f64| bernstein(d, t);

    // Derivative / 3 in Bernstein form is e0·(1-t)² + 2·e1·(1-t)·t + e2·t²
    let (e0, e1, e2) = (d[1] - d[0], d[2] - d[1], d[3] - d[2]);
    let mut breaks = vec![0.0, 1.0];
    breaks.extend(
        solve_quadratic(e0, 2.0 * (e1 - e0), e0 - 2.0 * e1 + e2)
            .into_iter()
            .filter(|t| *t > 0.0 && *t < 1.0),
    );
    breaks.sort_by(f64::total_cmp);

    let mut roots = Vec::with_capacity(3);
    for piece in breaks.windows(2) {
        let (lo, hi) = (piece[0], piece[1]);
        let (y_lo, y_hi) = (f(lo), f(hi));
        if y_lo.abs() < ROOT_EPSILON {
            push_root(&mut roots, lo);
        } else if y_hi.abs() >= ROOT_EPSILON && y_lo.signum() != y_hi.signum() {
            // ITP wants the negative end first
            let root = if y_lo < 0.0 {
                solve_itp(f, lo, hi, ROOT_EPSILON, 1, 0.2, y_lo, y_hi)
            } else {
                solve_itp(|t| -f(t), lo, hi, ROOT_EPSILON, 1, 0.2, -y_lo, -y_hi)
            };
            push_root(&mut roots, root);
        }
    }
    if f(1.0).abs() < ROOT_EPSILON {
        push_root(&mut roots, 1.0);
    }
    roots
}

/// Value at `t` of the cubic with Bernstein coefficients `d`
fn bernstein(d: [f64; 4], t: f64) -> f64 {
    let mt = 1.0 - t;
    d[0] * mt * mt * mt + 3.0 * d[1] * mt * mt * t + 3.0 * d[2] * mt * t * t + d[3] * t * t * t
}

/// Append `t` unless it repeats the last root
fn push_root(roots: &mut Vec<f64>, t: f64) {
    if roots.last().is_none_or(|last| t - last > EPSILON) {
        roots.push(t);
    }
}

/// Accept parameters in `[0, 1]`, absorbing rounding just outside it
fn clamp_unit(t: f64) -> Option<f64> {
    if (-EPSILON..=1.0 + EPSILON).contains(&t) {
        Some(t.clamp(0.0, 1.0))
    } else {
        None
    }
}
