//! Document model: the canvas singleton, its elements, and the client store.
//!
//! This module defines the core data types that describe what is on the
//! canvas (`Canvas`, `Element`, `Shape`), a sparse-update type for incremental
//! edits (`ElementPatch`), the resolved view served to clients and renderers
//! (`CanvasState`), and the client-side store that owns live elements during
//! editing (`DocStore`).
//!
//! Stored element records are deliberately loose: every per-type field is
//! optional so a partial record still loads. Defaults for missing fields are
//! resolved in one place, [`crate::geometry`], never here.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};

/// Unique identifier for an element.
pub type ElementId = Uuid;

// =============================================================
// Canvas
// =============================================================

/// The singleton canvas document. Owns the ordered list of element ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    /// Page width in pixels (raster) or points (PDF).
    pub width: u32,
    /// Page height in pixels (raster) or points (PDF).
    pub height: u32,
    /// CSS background color.
    pub background_color: String,
    /// Element ids in render order; later entries draw on top.
    #[serde(default)]
    pub elements: Vec<ElementId>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background_color: DEFAULT_BACKGROUND.to_owned(),
            elements: Vec::new(),
        }
    }
}

/// A canvas with its element references resolved, in render order.
///
/// This is the shape of `GET /canvas/state` and the consistent snapshot
/// handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl CanvasState {
    /// Pair a canvas with already-resolved elements.
    #[must_use]
    pub fn new(canvas: &Canvas, elements: Vec<Element>) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            background_color: canvas.background_color.clone(),
            elements,
        }
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(&Canvas::default(), Vec::new())
    }
}

// =============================================================
// Elements
// =============================================================

/// The kind of an element, without its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Text,
    Image,
}

impl ElementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A drawable element as stored and sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Stable identity; never changes across updates.
    pub id: ElementId,
    /// Left edge (or anchor) in canvas coordinates.
    #[serde(default)]
    pub x: f64,
    /// Top edge (or text baseline anchor) in canvas coordinates.
    #[serde(default)]
    pub y: f64,
    /// Per-type fields, tagged by `"type"`.
    #[serde(flatten)]
    pub shape: Shape,
}

/// Per-type element fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle(RectangleShape),
    Circle(CircleShape),
    Text(TextShape),
    Image(ImageShape),
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Rectangle(_) => ElementKind::Rectangle,
            Self::Circle(_) => ElementKind::Circle,
            Self::Text(_) => ElementKind::Text,
            Self::Image(_) => ElementKind::Image,
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
}

/// Circle whose bounding box is anchored at `(x, y)`; center is `(x + r, y + r)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
}

/// A single line of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Font size in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

/// A stored image drawn scaled into its box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Image-store reference, e.g. `/uploads/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl Element {
    /// Create an element with a fresh id.
    #[must_use]
    pub fn new(x: f64, y: f64, shape: Shape) -> Self {
        Self { id: Uuid::new_v4(), x, y, shape }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    /// Apply a sparse patch. Fails without mutating anything if the patch
    /// carries a field the element's kind does not have.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::NotApplicable`] naming the first foreign field.
    pub fn apply_patch(&mut self, patch: &ElementPatch) -> Result<(), PatchError> {
        let kind = self.kind();
        if let Some(field) = patch.present_fields().into_iter().find(|f| !field_applies(kind, f)) {
            return Err(PatchError::NotApplicable { field, kind });
        }

        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        match &mut self.shape {
            Shape::Rectangle(r) => {
                set(&mut r.width, patch.width);
                set(&mut r.height, patch.height);
                set(&mut r.color, patch.color.clone());
                set(&mut r.fill_color, patch.fill_color.clone());
                set(&mut r.border_color, patch.border_color.clone());
                set(&mut r.border_width, patch.border_width);
            }
            Shape::Circle(c) => {
                set(&mut c.radius, patch.radius);
                set(&mut c.color, patch.color.clone());
                set(&mut c.fill_color, patch.fill_color.clone());
                set(&mut c.border_color, patch.border_color.clone());
                set(&mut c.border_width, patch.border_width);
            }
            Shape::Text(t) => {
                set(&mut t.text, patch.text.clone());
                set(&mut t.size, patch.size);
                set(&mut t.color, patch.color.clone());
                set(&mut t.font, patch.font.clone());
            }
            Shape::Image(i) => {
                set(&mut i.width, patch.width);
                set(&mut i.height, patch.height);
            }
        }
        Ok(())
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn field_applies(kind: ElementKind, field: &str) -> bool {
    match field {
        "x" | "y" => true,
        "width" | "height" => matches!(kind, ElementKind::Rectangle | ElementKind::Image),
        "radius" => kind == ElementKind::Circle,
        "color" => kind != ElementKind::Image,
        "fillColor" | "borderColor" | "borderWidth" => {
            matches!(kind, ElementKind::Rectangle | ElementKind::Circle)
        }
        "text" | "size" | "font" => kind == ElementKind::Text,
        _ => false,
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

impl ElementPatch {
    /// A patch that moves an element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Default::default() }
    }

    /// Wire names of the fields this patch sets, in declaration order.
    #[must_use]
    pub fn present_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("x", self.x.is_some()),
            ("y", self.y.is_some()),
            ("width", self.width.is_some()),
            ("height", self.height.is_some()),
            ("radius", self.radius.is_some()),
            ("color", self.color.is_some()),
            ("fillColor", self.fill_color.is_some()),
            ("borderColor", self.border_color.is_some()),
            ("borderWidth", self.border_width.is_some()),
            ("text", self.text.is_some()),
            ("size", self.size.is_some()),
            ("font", self.font.is_some()),
        ];
        flags.into_iter().filter_map(|(name, present)| present.then_some(name)).collect()
    }

    /// Whether the patch sets nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Numeric fields this patch sets, paired with their wire names.
    #[must_use]
    pub fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
            ("radius", self.radius),
            ("borderWidth", self.border_width),
            ("size", self.size),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name, v)))
        .collect()
    }

    /// Fold a later patch into this one; fields set by `later` win.
    pub fn merge(&mut self, later: ElementPatch) {
        set(&mut self.x, later.x);
        set(&mut self.y, later.y);
        set(&mut self.width, later.width);
        set(&mut self.height, later.height);
        set(&mut self.radius, later.radius);
        set(&mut self.color, later.color);
        set(&mut self.fill_color, later.fill_color);
        set(&mut self.border_color, later.border_color);
        set(&mut self.border_width, later.border_width);
        set(&mut self.text, later.text);
        set(&mut self.size, later.size);
        set(&mut self.font, later.font);
    }
}

/// Why a patch could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The patch names a field the element's kind does not carry.
    NotApplicable { field: &'static str, kind: ElementKind },
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable { field, kind } => {
                write!(f, "field `{field}` does not apply to {kind} elements")
            }
        }
    }
}

impl std::error::Error for PatchError {}

// =============================================================
// Client store
// =============================================================

/// Client-side copy of the canvas used while editing.
///
/// Holds ephemeral state: drag and resize gestures mutate elements here on
/// every pointer move, and only the final values are committed.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    state: CanvasState,
}

impl DocStore {
    /// Create a store holding a default, empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a server snapshot.
    pub fn load(&mut self, state: CanvasState) {
        self.state = state;
    }

    /// The current canvas with resolved elements.
    #[must_use]
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (f64::from(self.state.width), f64::from(self.state.height))
    }

    /// Elements in render order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.state.elements
    }

    /// Append an element, or replace it in place if the id already exists.
    pub fn insert(&mut self, element: Element) {
        if let Some(slot) = self.state.elements.iter_mut().find(|e| e.id == element.id) {
            *slot = element;
        } else {
            self.state.elements.push(element);
        }
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let idx = self.state.elements.iter().position(|e| e.id == *id)?;
        Some(self.state.elements.remove(idx))
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.state.elements.iter().find(|e| e.id == *id)
    }

    /// Return a mutable reference to an element by id.
    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.state.elements.iter_mut().find(|e| e.id == *id)
    }

    /// Apply a partial update. Returns false if the element doesn't exist
    /// or the patch does not fit its kind.
    pub fn apply_patch(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        self.get_mut(id).is_some_and(|e| e.apply_patch(patch).is_ok())
    }

    /// Drop every element, keeping canvas dimensions and background.
    pub fn clear(&mut self) {
        self.state.elements.clear();
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.elements.is_empty()
    }
}
