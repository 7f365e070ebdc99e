//! Scene: backend-neutral paint instructions built from a canvas snapshot.
//!
//! Every renderer (raster, PDF, live preview) consumes a [`Scene`] instead of
//! reading element records directly. Field defaults and color fallbacks are
//! resolved once here via [`crate::geometry`], so a new element type is
//! taught to every backend by adding one arm to [`paint_element`].
//!
//! An element that cannot be painted (unparseable color, image without a
//! source) is recorded in [`Scene::skipped`] and left out of the draw list.
//! Callers decide how loudly to report it; the rest of the scene still draws.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::fmt;

use crate::color::Rgba;
use crate::doc::{CanvasState, Element, ElementId, ElementKind, Shape};
use crate::geometry::{self, Point, Rect};

/// One primitive drawing operation in canvas coordinates (y down).
#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    FillRect { rect: Rect, color: Rgba },
    StrokeRect { rect: Rect, color: Rgba, width: f64 },
    FillCircle { center: Point, radius: f64, color: Rgba },
    StrokeCircle { center: Point, radius: f64, color: Rgba, width: f64 },
    /// A single line of text with its left baseline point at `baseline`.
    Text { baseline: Point, text: String, size: f64, font: String, color: Rgba },
    /// An image-store reference drawn scaled into `rect`.
    Image { rect: Rect, src: String },
}

/// The paint operations produced by one element.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub element_id: ElementId,
    pub kind: ElementKind,
    pub ops: Vec<PaintOp>,
}

/// Why an element was left out of the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintError {
    /// A color field could not be parsed.
    BadColor { field: &'static str, value: String },
    /// An image element has no source reference.
    MissingSource,
}

impl fmt::Display for PaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadColor { field, value } => write!(f, "unparseable {field} `{value}`"),
            Self::MissingSource => f.write_str("image has no src"),
        }
    }
}

impl std::error::Error for PaintError {}

/// A canvas resolved into ordered paint instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Rgba,
    /// Items in render order; later items draw on top.
    pub items: Vec<SceneItem>,
    /// Elements that could not be painted, with the reason.
    pub skipped: Vec<(ElementId, PaintError)>,
}

impl Scene {
    /// Distinct image references in first-use order.
    #[must_use]
    pub fn image_sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for op in self.items.iter().flat_map(|item| &item.ops) {
            if let PaintOp::Image { src, .. } = op
                && !out.contains(&src.as_str())
            {
                out.push(src);
            }
        }
        out
    }

    /// Total number of paint operations.
    #[must_use]
    pub fn op_count(&self) -> usize {
        self.items.iter().map(|item| item.ops.len()).sum()
    }
}

/// Build the scene for a canvas snapshot.
///
/// An unparseable background falls back to white rather than failing the
/// whole render.
#[must_use]
pub fn build_scene(state: &CanvasState) -> Scene {
    let background = Rgba::parse(&state.background_color).unwrap_or(Rgba::WHITE);
    let mut items = Vec::with_capacity(state.elements.len());
    let mut skipped = Vec::new();

    for el in &state.elements {
        match paint_element(el) {
            Ok(ops) => items.push(SceneItem { element_id: el.id, kind: el.kind(), ops }),
            Err(e) => skipped.push((el.id, e)),
        }
    }

    Scene { width: state.width, height: state.height, background, items, skipped }
}

fn parse_color(field: &'static str, value: &str) -> Result<Rgba, PaintError> {
    Rgba::parse(value).ok_or_else(|| PaintError::BadColor { field, value: value.to_owned() })
}

fn push_border(ops: &mut Vec<PaintOp>, shape: &Shape, make: impl FnOnce(Rgba, f64) -> PaintOp) -> Result<(), PaintError> {
    if let Some((color, width)) = geometry::border(shape) {
        ops.push(make(parse_color("borderColor", color)?, width));
    }
    Ok(())
}

/// Paint operations for a single element.
///
/// # Errors
///
/// Returns [`PaintError`] when a color does not parse or an image has no
/// source. Nothing is emitted for such an element.
pub fn paint_element(el: &Element) -> Result<Vec<PaintOp>, PaintError> {
    let mut ops = Vec::new();
    let fill = geometry::fill_color(&el.shape);

    match &el.shape {
        Shape::Rectangle(_) => {
            let rect = geometry::bounding_box(el);
            if let Some(fill) = fill {
                ops.push(PaintOp::FillRect { rect, color: parse_color("fillColor", fill)? });
            }
            push_border(&mut ops, &el.shape, |color, width| PaintOp::StrokeRect { rect, color, width })?;
        }
        Shape::Circle(c) => {
            let o = geometry::origin(el);
            let radius = geometry::radius(c);
            let center = Point::new(o.x + radius, o.y + radius);
            if let Some(fill) = fill {
                ops.push(PaintOp::FillCircle { center, radius, color: parse_color("fillColor", fill)? });
            }
            push_border(&mut ops, &el.shape, |color, width| PaintOp::StrokeCircle { center, radius, color, width })?;
        }
        Shape::Text(t) => {
            let body = geometry::text_body(t);
            let color = parse_color("color", fill.unwrap_or(crate::consts::DEFAULT_COLOR))?;
            if !body.is_empty() {
                ops.push(PaintOp::Text {
                    baseline: geometry::text_baseline(el, t),
                    text: body.to_owned(),
                    size: geometry::text_size(t),
                    font: geometry::text_font(t).to_owned(),
                    color,
                });
            }
        }
        Shape::Image(i) => {
            let src = i.src.as_deref().map(str::trim).filter(|s| !s.is_empty()).ok_or(PaintError::MissingSource)?;
            ops.push(PaintOp::Image { rect: geometry::bounding_box(el), src: src.to_owned() });
        }
    }

    Ok(ops)
}
