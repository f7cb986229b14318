// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Handle synchronization: moving points while keeping smooth points
//! tangent-continuous.
//!
//! Rules:
//! - an on-curve point carries both of its handles along rigidly;
//! - a handle of a corner point moves alone;
//! - a handle of a smooth point swings the opposite handle so the three
//!   points stay collinear and the two handle lengths keep their sum.
//!
//! With `P` the on-curve point as origin, `H` the moved handle and
//! `L = |H_old| + |Hopp_old|`, the opposite handle lands at
//! `H * (1 - L / |H|)`. A handle dragged onto its own on-curve point has no
//! direction; the opposite handle then stays where it is.

use crate::error::{EditError, Result};
use crate::model::EntityId;
use crate::path::{Contour, PointKind};
use kurbo::{Point, Vec2};
use std::collections::BTreeSet;

/// Handles shorter than this have no usable direction
pub const MIN_HANDLE_LENGTH: f64 = 1e-9;

/// Where the opposite handle of a smooth point goes when one handle moves
///
/// `total_len` is the conserved sum of both handle lengths. Returns `None`
/// when the moved handle sits on the on-curve point.
pub fn smooth_opposite(on_curve: Point, moved: Point, total_len: f64) -> Option<Point> {
    let h = moved - on_curve;
    let len = h.hypot();
    if len < MIN_HANDLE_LENGTH {
        return None;
    }
    Some(on_curve + h * (1.0 - total_len / len))
}

/// The handle symmetric to `handle` through `on_curve`
pub fn mirror_handle(on_curve: Point, handle: Point) -> Point {
    on_curve + (on_curve - handle)
}

/// Move one point to `pos`, propagating to dependent handles
pub fn move_point(contour: &mut Contour, index: usize, pos: Point) -> Result<()> {
    let len = contour.len();
    let pt = contour
        .point(index)
        .copied()
        .ok_or(EditError::OutOfRange { index, len })?;
    move_points(contour, &BTreeSet::from([pt.id]), pos - pt.point);
    Ok(())
}

/// Translate the points in `ids` by `delta`
///
/// Handles of selected on-curve points come along. Afterwards every moved
/// handle whose smooth owner and opposite handle both stayed put drags the
/// opposite handle with it. Returns the number of points moved.
pub fn move_points(contour: &mut Contour, ids: &BTreeSet<EntityId>, delta: Vec2) -> usize {
    let len = contour.len();
    let mut moving = vec![false; len];
    for (i, pt) in contour.points().iter().enumerate() {
        if !ids.contains(&pt.id) {
            continue;
        }
        moving[i] = true;
        let handles = contour.handles_of(i);
        for h in [handles.prev, handles.next].into_iter().flatten() {
            moving[h] = true;
        }
    }

    let count = moving.iter().filter(|m| **m).count();
    if count == 0 {
        return 0;
    }

    // Smooth pairs to fix up: (moved handle, owner, opposite handle)
    let pairs: Vec<(usize, usize, usize)> = (0..len)
        .filter(|&i| moving[i] && contour.points()[i].is_off_curve())
        .filter_map(|i| {
            let owner = contour.owner_of(i)?;
            let opposite = contour.opposite_handle(i)?;
            let free = !moving[owner] && !moving[opposite];
            (free && contour.points()[owner].kind == PointKind::Smooth)
                .then_some((i, owner, opposite))
        })
        .collect();

    let before: Vec<Point> = contour.points().iter().map(|pt| pt.point).collect();
    let points = contour.points_mut();
    for (pt, _) in points.iter_mut().zip(&moving).filter(|(_, m)| **m) {
        pt.point += delta;
    }

    for (handle, owner, opposite) in pairs {
        let origin = before[owner];
        let total = (before[handle] - origin).hypot() + (before[opposite] - origin).hypot();
        match smooth_opposite(origin, points[handle].point, total) {
            Some(pos) => points[opposite].point = pos,
            None => tracing::trace!("Zero-length handle at {:?}; opposite kept", origin),
        }
    }

    count
}

/// Make the handles of a smooth point collinear again
///
/// The incoming handle keeps its direction; the outgoing one is rotated
/// onto the opposite ray at its own length. Used after a corner is
/// toggled to smooth.
pub fn align_smooth_handles(contour: &mut Contour, index: usize) {
    let Some(pt) = contour.point(index).copied() else {
        return;
    };
    if pt.kind != PointKind::Smooth {
        return;
    }
    let handles = contour.handles_of(index);
    let (Some(prev), Some(next)) = (handles.prev, handles.next) else {
        return;
    };

    let origin = pt.point;
    let incoming = contour.points()[prev].point - origin;
    let outgoing = contour.points()[next].point - origin;
    let (in_len, out_len) = (incoming.hypot(), outgoing.hypot());
    if in_len < MIN_HANDLE_LENGTH || out_len < MIN_HANDLE_LENGTH {
        return;
    }
    contour.points_mut()[next].point = origin - incoming * (out_len / in_len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathPoint;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    /// Smooth point at the origin with handles at (-20, 0) and (20, 0)
    fn smooth_joint() -> Contour {
        Contour::from_points(
            vec![
                PathPoint::corner(Point::new(-100.0, 0.0)),
                PathPoint::off_curve(Point::new(-60.0, 0.0)),
                PathPoint::off_curve(Point::new(-20.0, 0.0)),
                PathPoint::smooth(Point::new(0.0, 0.0)),
                PathPoint::off_curve(Point::new(20.0, 0.0)),
                PathPoint::off_curve(Point::new(60.0, 0.0)),
                PathPoint::corner(Point::new(100.0, 0.0)),
            ],
            false,
        )
    }

    fn collinear(contour: &Contour, owner: usize) -> bool {
        let handles = contour.handles_of(owner);
        let p = contour.points()[owner].point;
        let a = contour.points()[handles.prev.unwrap()].point - p;
        let b = contour.points()[handles.next.unwrap()].point - p;
        a.cross(b).abs() < 1e-6 * (1.0 + a.hypot() * b.hypot())
    }

    #[test]
    fn handle_length_sum_is_conserved() {
        let mut contour = smooth_joint();
        move_point(&mut contour, 2, Point::new(-10.0, -10.0)).unwrap();

        let opposite = contour.points()[4].point;
        assert!(approx_eq(opposite.x, 18.284271));
        assert!(approx_eq(opposite.y, 18.284271));

        let moved_len = Point::new(-10.0, -10.0).to_vec2().hypot();
        assert!(approx_eq(moved_len + opposite.to_vec2().hypot(), 40.0));
        assert!(collinear(&contour, 3));
    }

    #[test]
    fn smooth_handles_stay_collinear_over_a_drag() {
        let mut contour = smooth_joint();
        let handle = contour.points()[4].id;
        let ids = BTreeSet::from([handle]);
        let steps = [
            Vec2::new(3.0, 7.0),
            Vec2::new(-12.0, 4.5),
            Vec2::new(0.5, -30.0),
            Vec2::new(25.0, 25.0),
        ];
        for delta in steps {
            move_points(&mut contour, &ids, delta);
            assert!(collinear(&contour, 3));
        }
        // Sum of lengths still 40
        let p = contour.points()[3].point;
        let sum = (contour.points()[2].point - p).hypot() + (contour.points()[4].point - p).hypot();
        assert!(approx_eq(sum, 40.0));
    }

    #[test]
    fn corner_handle_moves_alone() {
        let mut contour = smooth_joint();
        contour.toggle_smooth(3);
        move_point(&mut contour, 2, Point::new(-10.0, -10.0)).unwrap();
        assert_eq!(contour.points()[4].point, Point::new(20.0, 0.0));
        assert_eq!(contour.points()[2].point, Point::new(-10.0, -10.0));
    }

    #[test]
    fn on_curve_drags_its_handles() {
        let mut contour = smooth_joint();
        move_point(&mut contour, 3, Point::new(5.0, 5.0)).unwrap();
        assert_eq!(contour.points()[2].point, Point::new(-15.0, 5.0));
        assert_eq!(contour.points()[4].point, Point::new(25.0, 5.0));
        // Handles of other points stay
        assert_eq!(contour.points()[1].point, Point::new(-60.0, 0.0));
    }

    #[test]
    fn zero_length_handle_keeps_opposite() {
        let mut contour = smooth_joint();
        move_point(&mut contour, 2, Point::new(0.0, 0.0)).unwrap();
        assert_eq!(contour.points()[2].point, Point::new(0.0, 0.0));
        assert_eq!(contour.points()[4].point, Point::new(20.0, 0.0));
    }

    #[test]
    fn lone_handle_has_nothing_to_propagate() {
        let mut contour = Contour::from_points(
            vec![
                PathPoint::corner(Point::new(0.0, 0.0)),
                PathPoint::off_curve(Point::new(10.0, 30.0)),
                PathPoint::off_curve(Point::new(40.0, 30.0)),
                PathPoint::smooth(Point::new(50.0, 0.0)),
            ],
            false,
        );
        move_point(&mut contour, 2, Point::new(45.0, 40.0)).unwrap();
        assert_eq!(contour.points()[1].point, Point::new(10.0, 30.0));
        assert_eq!(contour.points()[3].point, Point::new(50.0, 0.0));
    }

    #[test]
    fn move_point_out_of_range() {
        let mut contour = smooth_joint();
        assert!(matches!(
            move_point(&mut contour, 42, Point::ZERO),
            Err(EditError::OutOfRange { index: 42, len: 7 })
        ));
    }

    #[test]
    fn mirror_is_symmetric() {
        let mirrored = mirror_handle(Point::new(10.0, 10.0), Point::new(15.0, 20.0));
        assert_eq!(mirrored, Point::new(5.0, 0.0));
    }

    #[test]
    fn align_rotates_outgoing_handle() {
        let mut contour = smooth_joint();
        contour.toggle_smooth(3);
        move_point(&mut contour, 4, Point::new(0.0, 30.0)).unwrap();
        contour.toggle_smooth(3);
        align_smooth_handles(&mut contour, 3);
        let out = contour.points()[4].point;
        assert!(approx_eq(out.x, 30.0));
        assert!(approx_eq(out.y, 0.0));
        assert!(collinear(&contour, 3));
    }
}
