#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Element, ImageShape, RectangleShape, Shape, TextShape};

fn rect(x: f64, y: f64, w: Option<f64>, h: Option<f64>) -> Element {
    Element::new(x, y, Shape::Rectangle(RectangleShape { width: w, height: h, ..Default::default() }))
}

fn circle(x: f64, y: f64, r: Option<f64>) -> Element {
    Element::new(x, y, Shape::Circle(CircleShape { radius: r, ..Default::default() }))
}

fn text(x: f64, y: f64, body: Option<&str>, size: Option<f64>) -> Element {
    Element::new(
        x,
        y,
        Shape::Text(TextShape { text: body.map(str::to_owned), size, ..Default::default() }),
    )
}

// =============================================================
// Bounding boxes
// =============================================================

#[test]
fn rectangle_box_uses_fields() {
    assert_eq!(bounding_box(&rect(10.0, 20.0, Some(30.0), Some(40.0))), Rect::new(10.0, 20.0, 30.0, 40.0));
}

#[test]
fn rectangle_box_defaults_missing_size() {
    assert_eq!(bounding_box(&rect(0.0, 0.0, None, None)), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn zero_and_nan_sizes_fall_back() {
    assert_eq!(bounding_box(&rect(0.0, 0.0, Some(0.0), Some(f64::NAN))), Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(bounding_box(&circle(0.0, 0.0, Some(-3.0))).w, 100.0);
}

#[test]
fn circle_box_is_diameter_square() {
    assert_eq!(bounding_box(&circle(5.0, 6.0, Some(10.0))), Rect::new(5.0, 6.0, 20.0, 20.0));
    assert_eq!(bounding_box(&circle(0.0, 0.0, None)), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn image_box_uses_fields() {
    let el = Element::new(1.0, 2.0, Shape::Image(ImageShape { width: Some(3.0), ..Default::default() }));
    assert_eq!(bounding_box(&el), Rect::new(1.0, 2.0, 3.0, 100.0));
}

#[test]
fn text_box_sits_above_anchor() {
    let el = text(10.0, 50.0, Some("Hello"), Some(20.0));
    let b = bounding_box(&el);
    assert_eq!(b.x, 10.0);
    assert_eq!(b.y, 30.0);
    assert!((b.w - 60.0).abs() < 1e-9);
    assert_eq!(b.h, 20.0);
}

#[test]
fn text_width_counts_chars_not_bytes() {
    let t = TextShape { text: Some("héé".into()), size: Some(10.0), ..Default::default() };
    assert!((text_width(&t) - 18.0).abs() < 1e-9);
}

#[test]
fn empty_text_uses_fallback_width_and_default_size() {
    let b = bounding_box(&text(0.0, 16.0, None, None));
    assert_eq!(b.w, 100.0);
    assert_eq!(b.h, 16.0);
    assert_eq!(b.y, 0.0);
}

#[test]
fn text_baseline_is_below_anchor() {
    let el = text(4.0, 10.0, Some("x"), Some(12.0));
    let Shape::Text(t) = &el.shape else {
        panic!("expected text");
    };
    assert_eq!(text_baseline(&el, t), Point::new(4.0, 22.0));
}

#[test]
fn non_finite_origin_is_zero() {
    let el = rect(f64::INFINITY, f64::NAN, Some(1.0), Some(1.0));
    assert_eq!(origin(&el), Point::new(0.0, 0.0));
}

// =============================================================
// Containment
// =============================================================

#[test]
fn rectangle_contains_edges_inclusive() {
    let el = rect(10.0, 10.0, Some(50.0), Some(50.0));
    assert!(contains(&el, Point::new(10.0, 10.0)));
    assert!(contains(&el, Point::new(60.0, 60.0)));
    assert!(contains(&el, Point::new(35.0, 35.0)));
    assert!(!contains(&el, Point::new(60.1, 35.0)));
    assert!(!contains(&el, Point::new(5.0, 5.0)));
}

#[test]
fn circle_contains_uses_distance_not_box() {
    let el = circle(0.0, 0.0, Some(50.0));
    assert!(contains(&el, Point::new(50.0, 50.0)));
    assert!(contains(&el, Point::new(50.0, 0.0)));
    // Bounding-box corner is outside the disk.
    assert!(!contains(&el, Point::new(2.0, 2.0)));
}

#[test]
fn text_contains_area_above_anchor() {
    let el = text(0.0, 40.0, Some("abcd"), Some(20.0));
    assert!(contains(&el, Point::new(10.0, 30.0)));
    assert!(!contains(&el, Point::new(10.0, 45.0)));
    assert!(!contains(&el, Point::new(49.0, 30.0)));
}

// =============================================================
// Colors and borders
// =============================================================

#[test]
fn fill_color_prefers_fill_then_color_then_black() {
    let mut r = RectangleShape { color: Some("#111111".into()), ..Default::default() };
    assert_eq!(fill_color(&Shape::Rectangle(r.clone())), Some("#111111"));
    r.fill_color = Some("#222222".into());
    assert_eq!(fill_color(&Shape::Rectangle(r)), Some("#222222"));
    assert_eq!(fill_color(&Shape::Circle(CircleShape::default())), Some("#000000"));
    assert_eq!(fill_color(&Shape::Image(ImageShape::default())), None);
}

#[test]
fn blank_fill_color_falls_back() {
    let r = RectangleShape { color: Some("#abcdef".into()), fill_color: Some("  ".into()), ..Default::default() };
    assert_eq!(fill_color(&Shape::Rectangle(r)), Some("#abcdef"));
}

#[test]
fn border_requires_positive_width() {
    let mut r = RectangleShape { border_width: Some(0.0), ..Default::default() };
    assert_eq!(border(&Shape::Rectangle(r.clone())), None);
    r.border_width = Some(3.0);
    assert_eq!(border(&Shape::Rectangle(r.clone())), Some(("#000000", 3.0)));
    r.border_color = Some("#00ff00".into());
    assert_eq!(border(&Shape::Rectangle(r)), Some(("#00ff00", 3.0)));
}

// =============================================================
// Clamp
// =============================================================

#[test]
fn clamp_to_canvas_bounds() {
    assert_eq!(clamp_to_canvas(-50.0, 700.0), 0.0);
    assert_eq!(clamp_to_canvas(1000.0, 700.0), 700.0);
    assert_eq!(clamp_to_canvas(300.0, 700.0), 300.0);
    assert_eq!(clamp_to_canvas(10.0, -20.0), 0.0);
}

#[test]
fn extent_matches_box_size() {
    assert_eq!(extent(&circle(0.0, 0.0, Some(7.0))), (14.0, 14.0));
}
