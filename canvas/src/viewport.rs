//! Viewport: maps browser pointer coordinates onto the canvas.
//!
//! The canvas element may be laid out at a CSS size different from its
//! backing size, so pointer events are offset by the element's client rect
//! and divided by the display scale.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::geometry::Point;

/// Placement of the canvas element on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Client-rect left edge in CSS pixels.
    pub left: f64,
    /// Client-rect top edge in CSS pixels.
    pub top: f64,
    /// CSS pixels per canvas pixel.
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, scale: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(left: f64, top: f64, scale: f64) -> Self {
        Self { left, top, scale }
    }

    /// The scale, or 1 when the stored value is unusable.
    #[must_use]
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > 0.0 { self.scale } else { 1.0 }
    }

    #[must_use]
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        let s = self.effective_scale();
        Point::new((p.x - self.left) / s, (p.y - self.top) / s)
    }

    #[must_use]
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        let s = self.effective_scale();
        Point::new(p.x * s + self.left, p.y * s + self.top)
    }

    /// Convert a screen distance (e.g. handle slop) into canvas units.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, d: f64) -> f64 {
        d / self.effective_scale()
    }
}
