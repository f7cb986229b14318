// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Copy, cut and paste of the selected part of a glyph.
//!
//! The payload is a [`GlyphSnapshot`] of the selected sub-graph, tagged
//! with a private mime type. Contours contribute runs of consecutive
//! selected on-curve points together with the segments between them: a
//! fully selected closed contour stays closed, partial runs become open
//! contours.

use crate::editing::session::EditSession;
use crate::error::{EditError, Result};
use crate::model::{Anchor, Component, EntityId, Glyph, GlyphSnapshot, Guideline, SnapshotScope};
use crate::path::{Contour, PathPoint};

/// Mime type of outline clipboard payloads
pub const OUTLINE_MIME: &str = "application/x-outline-editor+json";

/// Serialized clipboard contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub mime: String,
    pub data: Vec<u8>,
}

/// Serialize the current selection
///
/// Returns `None` when nothing selected would produce any content.
pub fn copy_selection(session: &EditSession) -> Result<Option<ClipboardPayload>> {
    let selected = |id: &EntityId| session.selection.contains(id);
    let source = &session.glyph;

    let mut glyph = Glyph::new(source.name.clone(), source.width);
    for contour in &source.contours {
        glyph.contours.extend(selected_runs(contour, &selected));
    }
    glyph.anchors = source.anchors.iter().filter(|a| selected(&a.id)).cloned().collect();
    glyph.components = source
        .components
        .iter()
        .filter(|c| selected(&c.id))
        .cloned()
        .collect();
    glyph.guidelines = source
        .guidelines
        .iter()
        .filter(|g| selected(&g.id))
        .cloned()
        .collect();

    let items = glyph.contours.len() + glyph.anchors.len() + glyph.components.len() + glyph.guidelines.len();
    if items == 0 {
        return Ok(None);
    }
    let data = GlyphSnapshot::capture(&glyph, SnapshotScope::ALL).to_bytes()?;
    tracing::debug!("Copied {} items ({} bytes)", items, data.len());
    Ok(Some(ClipboardPayload {
        mime: OUTLINE_MIME.to_string(),
        data,
    }))
}

/// Copy the selection, then delete it
pub fn cut_selection(session: &mut EditSession) -> Result<Option<ClipboardPayload>> {
    let payload = copy_selection(session)?;
    if payload.is_some() {
        session.delete_selection()?;
    }
    Ok(payload)
}

/// Merge a payload into the session's glyph
///
/// Everything pasted gets fresh ids and becomes the selection. The whole
/// paste is one undo operation. Returns the number of items pasted.
pub fn paste(session: &mut EditSession, payload: &ClipboardPayload) -> Result<usize> {
    if payload.mime != OUTLINE_MIME {
        return Err(EditError::ClipboardType {
            found: payload.mime.clone(),
        });
    }
    let pasted = GlyphSnapshot::from_bytes(&payload.data)?.to_glyph();

    let mut new_ids = Vec::new();
    let count = session.with_operation(SnapshotScope::ALL, |session| {
        let glyph = &mut session.glyph;
        for contour in &pasted.contours {
            let points: Vec<PathPoint> = contour
                .points()
                .iter()
                .map(|pt| PathPoint::new(pt.point, pt.kind))
                .collect();
            new_ids.extend(points.iter().map(|pt| pt.id));
            glyph.contours.push(Contour::from_points(points, contour.closed));
        }
        for anchor in &pasted.anchors {
            let anchor = Anchor::new(anchor.name.clone(), anchor.position);
            new_ids.push(anchor.id);
            glyph.anchors.push(anchor);
        }
        for component in &pasted.components {
            let component = Component::new(component.base.clone(), component.transform);
            new_ids.push(component.id);
            glyph.components.push(component);
        }
        for guide in &pasted.guidelines {
            let mut fresh = Guideline::new(guide.position, guide.angle);
            fresh.name = guide.name.clone();
            new_ids.push(fresh.id);
            glyph.guidelines.push(fresh);
        }
        Ok(pasted.contours.len() + pasted.anchors.len() + pasted.components.len() + pasted.guidelines.len())
    })?;

    if count > 0 {
        session.outline_changed();
        session.set_selection(new_ids.into_iter().collect());
    }
    tracing::debug!("Pasted {} items", count);
    Ok(count)
}

/// The selected runs of one contour as standalone contours
fn selected_runs(contour: &Contour, selected: &impl Fn(&EntityId) -> bool) -> Vec<Contour> {
    let points = contour.points();
    let on_curve: Vec<usize> = (0..points.len()).filter(|&i| points[i].is_on_curve()).collect();
    let flags: Vec<bool> = on_curve.iter().map(|&i| selected(&points[i].id)).collect();
    if !flags.iter().any(|f| *f) {
        return Vec::new();
    }

    if flags.iter().all(|f| *f) {
        let mut copied: Vec<PathPoint> = points.to_vec();
        if contour.has_trailing_handle() {
            copied.pop();
        }
        return vec![Contour::from_points(copied, contour.closed)];
    }

    // Runs as lists of positions into `on_curve`; closed contours start
    // the scan after an unselected point so no run is split by the wrap
    let n = on_curve.len();
    let start = if contour.closed {
        flags.iter().position(|f| !*f).map_or(0, |k| k + 1)
    } else {
        0
    };
    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for step in 0..n {
        let k = (start + step) % n;
        if flags[k] {
            current.push(k);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs.into_iter()
        .filter_map(|run| {
            let (&first, &last) = (run.first()?, run.last()?);
            let (from, to) = (on_curve[first], on_curve[last]);
            let mut copied = vec![points[from]];
            let mut cursor = from;
            while cursor != to {
                cursor = contour.next_index(cursor)?;
                copied.push(points[cursor]);
            }
            Some(Contour::from_points(copied, false))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::selection::Selection;
    use crate::settings::Settings;
    use kurbo::Point;

    fn session() -> EditSession {
        let mut glyph = Glyph::new("o", 200.0);
        glyph.contours.push(Contour::from_points(
            vec![
                PathPoint::corner(Point::new(0.0, 0.0)),
                PathPoint::corner(Point::new(100.0, 0.0)),
                PathPoint::off_curve(Point::new(150.0, 30.0)),
                PathPoint::off_curve(Point::new(150.0, 70.0)),
                PathPoint::corner(Point::new(100.0, 100.0)),
                PathPoint::corner(Point::new(0.0, 100.0)),
            ],
            true,
        ));
        glyph.anchors.push(Anchor::new("top", Point::new(50.0, 120.0)));
        EditSession::new(glyph, Settings::default())
    }

    fn select_points(session: &mut EditSession, indices: &[usize]) {
        let points = session.glyph.contours[0].points();
        let selection: Selection = indices.iter().map(|&i| points[i].id).collect();
        session.set_selection(selection);
    }

    #[test]
    fn whole_contour_stays_closed() {
        let mut session = session();
        select_points(&mut session, &[0, 1, 4, 5]);
        let payload = copy_selection(&session).unwrap().unwrap();
        assert_eq!(payload.mime, OUTLINE_MIME);

        let count = paste(&mut session, &payload).unwrap();
        assert_eq!(count, 1);
        let pasted = &session.glyph.contours[1];
        assert!(pasted.closed);
        assert_eq!(pasted.len(), 6);
        // Fresh ids, selected
        assert_ne!(pasted.points()[0].id, session.glyph.contours[0].points()[0].id);
        assert!(session.selection.contains(&pasted.points()[0].id));
        assert_eq!(session.selection.len(), 6);
    }

    #[test]
    fn partial_run_keeps_curve_and_opens() {
        let mut session = session();
        select_points(&mut session, &[1, 4]);
        let payload = copy_selection(&session).unwrap().unwrap();
        paste(&mut session, &payload).unwrap();
        let pasted = &session.glyph.contours[1];
        assert!(!pasted.closed);
        assert_eq!(pasted.len(), 4);
        assert_eq!(pasted.points()[2].point, Point::new(150.0, 70.0));
    }

    #[test]
    fn run_across_the_wrap() {
        let mut session = session();
        // Points 5 and 0 are consecutive on the closed contour
        select_points(&mut session, &[5, 0]);
        let payload = copy_selection(&session).unwrap().unwrap();
        paste(&mut session, &payload).unwrap();
        assert_eq!(session.glyph.contours.len(), 2);
        let pasted = &session.glyph.contours[1];
        assert_eq!(pasted.points()[0].point, Point::new(0.0, 100.0));
        assert_eq!(pasted.points()[1].point, Point::new(0.0, 0.0));
    }

    #[test]
    fn anchors_travel_too() {
        let mut session = session();
        let id = session.glyph.anchors[0].id;
        session.select_only(id);
        let payload = cut_selection(&mut session).unwrap().unwrap();
        assert!(session.glyph.anchors.is_empty());
        paste(&mut session, &payload).unwrap();
        assert_eq!(session.glyph.anchors.len(), 1);
        assert_eq!(session.glyph.anchors[0].name, "top");
        assert_ne!(session.glyph.anchors[0].id, id);
    }

    #[test]
    fn paste_is_one_undo_step() {
        let mut session = session();
        select_points(&mut session, &[0, 1]);
        let payload = copy_selection(&session).unwrap().unwrap();
        paste(&mut session, &payload).unwrap();
        session.undo().unwrap();
        assert_eq!(session.glyph.contours.len(), 1);
        assert!(session.selection.is_empty());
    }

    #[test]
    fn foreign_mime_is_rejected() {
        let mut session = session();
        let payload = ClipboardPayload {
            mime: "text/plain".into(),
            data: b"hello".to_vec(),
        };
        assert!(matches!(
            paste(&mut session, &payload),
            Err(EditError::ClipboardType { .. })
        ));
        assert_eq!(session.undo_state().undo_depth(), 0);
    }

    #[test]
    fn empty_selection_copies_nothing() {
        let session = session();
        assert!(copy_selection(&session).unwrap().is_none());
    }
}
