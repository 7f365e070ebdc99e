//! Geometry: field defaults, bounding boxes, and point containment.
//!
//! Every consumer that needs an element's size or position goes through this
//! module, so a record with missing or unusable fields is resolved the same
//! way by hit-testing, drag clamping, and every renderer. A numeric field is
//! unusable when it is absent, non-finite, or not strictly positive; it then
//! falls back to the documented default.
//!
//! Text has no stored extent. Its width is approximated as
//! `chars * size * 0.6` and its height as `size`, with the box sitting above
//! the anchor `y`. Renderers place the baseline at `y + size`.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{
    DEFAULT_BORDER_COLOR, DEFAULT_COLOR, DEFAULT_FONT, DEFAULT_HEIGHT, DEFAULT_RADIUS, DEFAULT_TEXT_SIZE,
    DEFAULT_WIDTH, EMPTY_TEXT_WIDTH, TEXT_WIDTH_FACTOR,
};
use crate::doc::{CircleShape, Element, ImageShape, RectangleShape, Shape, TextShape};

/// A point in canvas or screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Closed containment: edges count as inside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => default,
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn non_blank_or<'a>(value: Option<&'a String>, default: &'a str) -> &'a str {
    match value {
        Some(c) if !c.trim().is_empty() => c.as_str(),
        _ => default,
    }
}

// =============================================================
// Per-field resolution
// =============================================================

/// Anchor point of an element, with non-finite coordinates treated as zero.
#[must_use]
pub fn origin(el: &Element) -> Point {
    Point::new(finite_or_zero(el.x), finite_or_zero(el.y))
}

#[must_use]
pub fn rect_size(r: &RectangleShape) -> (f64, f64) {
    (positive_or(r.width, DEFAULT_WIDTH), positive_or(r.height, DEFAULT_HEIGHT))
}

#[must_use]
pub fn image_size(i: &ImageShape) -> (f64, f64) {
    (positive_or(i.width, DEFAULT_WIDTH), positive_or(i.height, DEFAULT_HEIGHT))
}

#[must_use]
pub fn radius(c: &CircleShape) -> f64 {
    positive_or(c.radius, DEFAULT_RADIUS)
}

#[must_use]
pub fn text_size(t: &TextShape) -> f64 {
    positive_or(t.size, DEFAULT_TEXT_SIZE)
}

#[must_use]
pub fn text_body(t: &TextShape) -> &str {
    t.text.as_deref().unwrap_or("")
}

#[must_use]
pub fn text_font(t: &TextShape) -> &str {
    non_blank_or(t.font.as_ref(), DEFAULT_FONT)
}

/// Approximate rendered width of a text element.
#[must_use]
pub fn text_width(t: &TextShape) -> f64 {
    let body = text_body(t);
    if body.is_empty() {
        return EMPTY_TEXT_WIDTH;
    }
    #[allow(clippy::cast_precision_loss)]
    let chars = body.chars().count() as f64;
    chars * text_size(t) * TEXT_WIDTH_FACTOR
}

/// Position of the text baseline used by every renderer.
#[must_use]
pub fn text_baseline(el: &Element, t: &TextShape) -> Point {
    let o = origin(el);
    Point::new(o.x, o.y + text_size(t))
}

/// Fill color of a shape or text: `fillColor`, then `color`, then black.
#[must_use]
pub fn fill_color(shape: &Shape) -> Option<&str> {
    match shape {
        Shape::Rectangle(r) => Some(non_blank_or(r.fill_color.as_ref(), non_blank_or(r.color.as_ref(), DEFAULT_COLOR))),
        Shape::Circle(c) => Some(non_blank_or(c.fill_color.as_ref(), non_blank_or(c.color.as_ref(), DEFAULT_COLOR))),
        Shape::Text(t) => Some(non_blank_or(t.color.as_ref(), DEFAULT_COLOR)),
        Shape::Image(_) => None,
    }
}

/// Border stroke of a shape as `(color, width)`, when it has one.
#[must_use]
pub fn border(shape: &Shape) -> Option<(&str, f64)> {
    let (color, width) = match shape {
        Shape::Rectangle(r) => (r.border_color.as_ref(), r.border_width),
        Shape::Circle(c) => (c.border_color.as_ref(), c.border_width),
        Shape::Text(_) | Shape::Image(_) => return None,
    };
    match width {
        Some(w) if w.is_finite() && w > 0.0 => Some((non_blank_or(color, DEFAULT_BORDER_COLOR), w)),
        _ => None,
    }
}

// =============================================================
// Boxes and containment
// =============================================================

/// Bounding box of an element in canvas coordinates.
#[must_use]
pub fn bounding_box(el: &Element) -> Rect {
    let o = origin(el);
    match &el.shape {
        Shape::Rectangle(r) => {
            let (w, h) = rect_size(r);
            Rect::new(o.x, o.y, w, h)
        }
        Shape::Image(i) => {
            let (w, h) = image_size(i);
            Rect::new(o.x, o.y, w, h)
        }
        Shape::Circle(c) => {
            let d = radius(c) * 2.0;
            Rect::new(o.x, o.y, d, d)
        }
        Shape::Text(t) => {
            let size = text_size(t);
            Rect::new(o.x, o.y - size, text_width(t), size)
        }
    }
}

/// Width and height used when clamping a drag to the canvas.
#[must_use]
pub fn extent(el: &Element) -> (f64, f64) {
    let b = bounding_box(el);
    (b.w, b.h)
}

/// Whether the element covers the point.
#[must_use]
pub fn contains(el: &Element, p: Point) -> bool {
    match &el.shape {
        Shape::Circle(c) => {
            let o = origin(el);
            let r = radius(c);
            let dx = p.x - (o.x + r);
            let dy = p.y - (o.y + r);
            dx.hypot(dy) <= r
        }
        Shape::Rectangle(_) | Shape::Image(_) | Shape::Text(_) => bounding_box(el).contains(p),
    }
}

/// Clamp `value` into `[0, max]`. When `max` is negative (the element is
/// larger than the canvas) the lower bound wins.
#[must_use]
pub fn clamp_to_canvas(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}
