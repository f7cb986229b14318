// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Ruler tool for measuring distances and angles
//!
//! The ruler line lives in canvas space. Besides length and angle it lists
//! where the line crosses the outline and how long each piece between
//! crossings is, which is how stem and counter widths are read off.

use crate::editing::{Drag, EditSession, Modifiers, MouseDelegate, MouseEvent};
use crate::model::Glyph;
use crate::path::intersect;
use crate::tools::{Key, Overlay, Tool, ToolId, constrain_axis};
use kurbo::{Line, Point};

// ===== Constants =====

/// Crossings closer than this (canvas units) are merged
const MEASURE_FUZZY_TOLERANCE: f64 = 0.1;

// ===== Measurement =====

/// What the ruler reports
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// The ruler line in canvas space
    pub line: Line,
    pub length: f64,
    pub dx: f64,
    pub dy: f64,
    /// Direction in degrees, counter-clockwise from +x, in `[0, 360)`
    pub angle: f64,
    /// Parameters along the line of both ends and every outline crossing,
    /// sorted
    pub stops: Vec<f64>,
    /// Length of each piece between consecutive stops
    pub pieces: Vec<f64>,
}

impl Measurement {
    /// Measure `line` against the outline of `glyph`
    pub fn compute(glyph: &Glyph, line: Line) -> Self {
        let delta = line.p1 - line.p0;
        let length = delta.hypot();
        let stops = crossings(glyph, line);
        let pieces = stops.windows(2).map(|w| length * (w[1] - w[0])).collect();
        Self {
            line,
            length,
            dx: delta.x,
            dy: delta.y,
            angle: direction_angle(delta.y.atan2(delta.x)),
            stops,
            pieces,
        }
    }
}

/// Sorted, cluster-merged parameters of the outline crossings, with the
/// two ends of the line always present
fn crossings(glyph: &Glyph, line: Line) -> Vec<f64> {
    let mut ts = vec![0.0, 1.0];
    for contour in &glyph.contours {
        for info in contour.iter_segments() {
            ts.extend(
                intersect::segment_line(&info.segment, line)
                    .into_iter()
                    .map(|hit| hit.line_t.clamp(0.0, 1.0)),
            );
        }
    }
    ts.sort_by(f64::total_cmp);

    let line_len = (line.p1 - line.p0).hypot();
    let thresh = if line_len > 1e-6 {
        MEASURE_FUZZY_TOLERANCE / line_len
    } else {
        f64::INFINITY
    };

    // The ends of the line anchor their clusters; interior clusters settle
    // on the midpoint of their first and last member
    let mut result: Vec<f64> = Vec::with_capacity(ts.len());
    let mut cluster_start = -1.0;
    let mut t_last = -1.0;
    for t in ts {
        if t - t_last > thresh {
            cluster_start = t;
            result.push(t);
        } else if let Some(last) = result.last_mut() {
            *last = if cluster_start == 0.0 {
                0.0
            } else if t == 1.0 {
                1.0
            } else {
                0.5 * (cluster_start + t)
            };
        }
        t_last = t;
    }
    result
}

/// Convert atan2 output to degrees in `[0, 360)`
fn direction_angle(atan: f64) -> f64 {
    if !atan.is_finite() {
        return 0.0;
    }
    let angle = atan.to_degrees();
    if angle < 0.0 { angle + 360.0 } else { angle }
}

// ===== RulerTool Struct =====

/// The ruler tool
#[derive(Debug, Clone, Default)]
pub struct RulerTool {
    /// The ruler line in canvas space; kept after release
    line: Option<Line>,
    /// Whether the button is held
    measuring: bool,
}

impl RulerTool {
    /// The current measurement, if a ruler is shown
    pub fn measurement(&self, session: &EditSession) -> Option<Measurement> {
        self.line.map(|line| Measurement::compute(&session.glyph, line))
    }

    /// A view position in canvas space, snapped onto a point under it
    fn snapped(event: MouseEvent, session: &mut EditSession) -> Point {
        if let Some(hit) = session.hit_test_point(event.pos, None)
            && let Some(pt) = session.glyph.point(hit.entity)
        {
            return pt.point;
        }
        session.viewport.to_canvas(event.pos)
    }

    fn extend_to(&mut self, event: MouseEvent, session: &mut EditSession) {
        if !self.measuring {
            tracing::trace!("Ruler: drag without press; ignored");
            return;
        }
        let Some(line) = self.line else {
            return;
        };
        let mut end = Self::snapped(event, session);
        if event.mods.shift {
            end = constrain_axis(line.p0, end);
        }
        self.line = Some(Line::new(line.p0, end));
    }
}

// ===== Tool Implementation =====

impl Tool for RulerTool {
    fn id(&self) -> ToolId {
        ToolId::Ruler
    }

    fn overlay(&self, session: &EditSession) -> Option<Overlay> {
        self.measurement(session).map(Overlay::Ruler)
    }

    fn key_down(&mut self, key: Key, _mods: Modifiers, session: &mut EditSession) -> bool {
        if key == Key::Escape && self.line.is_some() {
            self.cancel(session);
            return true;
        }
        false
    }

    fn deactivate(&mut self, session: &mut EditSession) {
        self.cancel(session);
    }
}

// ===== MouseDelegate Implementation =====

impl MouseDelegate for RulerTool {
    type Data = EditSession;

    fn left_down(&mut self, event: MouseEvent, data: &mut EditSession) {
        let start = Self::snapped(event, data);
        self.line = Some(Line::new(start, start));
        self.measuring = true;
        tracing::debug!("Ruler: started at {:?}", start);
    }

    fn left_drag_began(&mut self, event: MouseEvent, _drag: Drag, data: &mut EditSession) {
        self.extend_to(event, data);
    }

    fn left_drag_changed(&mut self, event: MouseEvent, _drag: Drag, data: &mut EditSession) {
        self.extend_to(event, data);
    }

    fn left_up(&mut self, _event: MouseEvent, _data: &mut EditSession) {
        self.measuring = false;
        // Keep the line visible after release unless it measures nothing
        if let Some(line) = self.line
            && line.p0 == line.p1
        {
            self.line = None;
        }
        tracing::debug!("Ruler: finished");
    }

    fn cancel(&mut self, _data: &mut EditSession) {
        self.line = None;
        self.measuring = false;
        tracing::debug!("Ruler: cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolBox;
    use crate::tools::test_support::{Harness, square_session};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn measurement(harness: &Harness) -> Measurement {
        match harness.tool.overlay(&harness.session) {
            Some(Overlay::Ruler(m)) => m,
            other => panic!("expected ruler overlay, got {other:?}"),
        }
    }

    #[test]
    fn measures_across_the_square() {
        let mut h = Harness::new(ToolBox::for_id(ToolId::Ruler), square_session());
        h.drag((-50.0, 50.0), (150.0, 50.0));
        let m = measurement(&h);
        assert!(approx_eq(m.length, 200.0));
        assert!(approx_eq(m.angle, 0.0));
        assert_eq!(m.stops.len(), 4);
        assert!(approx_eq(m.stops[1], 0.25));
        assert!(approx_eq(m.stops[2], 0.75));
        let pieces: Vec<f64> = m.pieces.iter().map(|p| p.round()).collect();
        assert_eq!(pieces, vec![50.0, 100.0, 50.0]);
    }

    #[test]
    fn angle_is_counter_clockwise_in_canvas_space() {
        let glyph = Glyph::new("empty", 0.0);
        let up = Measurement::compute(&glyph, Line::new((0.0, 0.0), (0.0, 10.0)));
        assert!(approx_eq(up.angle, 90.0));
        let down = Measurement::compute(&glyph, Line::new((0.0, 0.0), (0.0, -10.0)));
        assert!(approx_eq(down.angle, 270.0));
        assert!(approx_eq(down.dy, -10.0));
    }

    #[test]
    fn press_snaps_to_points() {
        let mut h = Harness::new(ToolBox::for_id(ToolId::Ruler), square_session());
        h.drag((2.0, 1.0), (60.0, 40.0));
        let m = measurement(&h);
        assert_eq!(m.line.p0, Point::ZERO);
    }

    #[test]
    fn shift_constrains_to_axis() {
        let mut h = Harness::new(ToolBox::for_id(ToolId::Ruler), square_session());
        h.mods.shift = true;
        h.drag((-50.0, 50.0), (30.0, 58.0));
        let m = measurement(&h);
        assert!(approx_eq(m.dy, 0.0));
        assert!(approx_eq(m.dx, 80.0));
    }

    #[test]
    fn zero_length_release_leaves_no_overlay() {
        let mut h = Harness::new(ToolBox::for_id(ToolId::Ruler), square_session());
        h.click((40.0, 40.0));
        assert!(h.tool.overlay(&h.session).is_none());
    }

    #[test]
    fn coincident_crossings_merge() {
        // Ruler through a corner touches two segments at the same place
        let h = Harness::new(ToolBox::for_id(ToolId::Ruler), square_session());
        let m = Measurement::compute(&h.session.glyph, Line::new((-10.0, -10.0), (50.0, 50.0)));
        let interior: Vec<_> = m.stops.iter().filter(|t| **t > 0.0 && **t < 1.0).collect();
        assert_eq!(interior.len(), 1);
    }
}
