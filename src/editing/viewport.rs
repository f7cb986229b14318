// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Mapping between view space (pixels, y down) and canvas space (design
//! units, y up).

use crate::settings::ZoomSettings;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Smallest scale the viewport will hold
pub const MIN_SCALE: f64 = 0.01;

/// Clamp `scale` to the configured limits
///
/// Inverted or NaN limits never panic; `max` wins over `min` and
/// [`MIN_SCALE`] wins over both.
fn clamp_zoom(scale: f64, limits: &ZoomSettings) -> f64 {
    scale.min(limits.max).max(limits.min).max(MIN_SCALE)
}

/// The fixed point of a zoom change
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomAnchor {
    /// A position in view space, usually the cursor
    View(Point),
    /// The middle of the visible area
    ViewportCenter,
    /// A position in canvas space
    Canvas(Point),
}

/// The transform from canvas space into the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPort {
    scale: f64,
    /// View position of the canvas origin
    pub offset: Vec2,
    /// Size of the visible area in view pixels
    pub size: Size,
}

impl Default for ViewPort {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewPort {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            size: Size::ZERO,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale without moving the offset; clamps to [`MIN_SCALE`]
    ///
    /// Returns whether the scale changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let scale = if scale.is_finite() {
            scale.max(MIN_SCALE)
        } else {
            MIN_SCALE
        };
        let changed = scale != self.scale;
        self.scale = scale;
        changed
    }

    /// View position to canvas position
    pub fn to_canvas(&self, view: Point) -> Point {
        Point::new(
            (view.x - self.offset.x) / self.scale,
            -(view.y - self.offset.y) / self.scale,
        )
    }

    /// Canvas position to view position
    pub fn to_view(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.scale + self.offset.x,
            -canvas.y * self.scale + self.offset.y,
        )
    }

    /// A view-space distance in canvas units
    pub fn view_to_canvas_distance(&self, distance: f64) -> f64 {
        distance / self.scale
    }

    /// The canvas-to-view transform, for painting
    pub fn affine(&self) -> Affine {
        Affine::new([
            self.scale,
            0.0,
            0.0,
            -self.scale,
            self.offset.x,
            self.offset.y,
        ])
    }

    /// The visible area in canvas space
    pub fn visible_canvas_rect(&self) -> Rect {
        let p0 = self.to_canvas(Point::ORIGIN);
        let p1 = self.to_canvas(Point::new(self.size.width, self.size.height));
        Rect::from_points(p0, p1)
    }

    /// Change the scale keeping `anchor` fixed on screen
    ///
    /// Returns whether the scale changed.
    pub fn zoom_to(&mut self, scale: f64, anchor: ZoomAnchor) -> bool {
        let (view, canvas) = match anchor {
            ZoomAnchor::View(view) => (view, self.to_canvas(view)),
            ZoomAnchor::ViewportCenter => {
                let center = self.size.to_rect().center();
                (center, self.to_canvas(center))
            }
            ZoomAnchor::Canvas(canvas) => (self.to_view(canvas), canvas),
        };
        let changed = self.set_scale(scale);
        self.offset = Vec2::new(
            view.x - canvas.x * self.scale,
            view.y + canvas.y * self.scale,
        );
        if changed {
            tracing::debug!("Zoom to {:.3} around {:?}", self.scale, anchor);
        }
        changed
    }

    /// Multiply the scale by `factor`, within the configured limits
    pub fn zoom_by(&mut self, factor: f64, anchor: ZoomAnchor, limits: &ZoomSettings) -> bool {
        let target = clamp_zoom(self.scale * factor, limits);
        self.zoom_to(target, anchor)
    }

    /// Scroll the view by a view-space delta
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Scale and center so `rect` fills the view with `padding` pixels
    /// to spare on each side
    ///
    /// Returns whether the scale changed.
    pub fn fit_rect(&mut self, rect: Rect, padding: f64, limits: &ZoomSettings) -> bool {
        let avail_w = self.size.width - 2.0 * padding;
        let avail_h = self.size.height - 2.0 * padding;
        let changed = if rect.width() > 0.0 && rect.height() > 0.0 && avail_w > 0.0 && avail_h > 0.0 {
            let scale = (avail_w / rect.width()).min(avail_h / rect.height());
            self.set_scale(clamp_zoom(scale, limits))
        } else {
            false
        };

        let center = rect.center();
        let view_center = self.size.to_rect().center();
        self.offset = Vec2::new(
            view_center.x - center.x * self.scale,
            view_center.y + center.y * self.scale,
        );
        changed
    }
}
