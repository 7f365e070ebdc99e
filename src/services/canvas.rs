//! Canvas service: the singleton document and its element list.
//!
//! DESIGN
//! ======
//! One `CanvasService` owns the canvas lifecycle and a document lock. Every
//! mutation holds the write guard for its whole read-modify-write, so the
//! element list and the element records always change together. Adds write
//! the element before listing it; deletes and clears unlist before removing
//! records. A crash between the two steps can leave an orphan record, never
//! a dangling reference.
//!
//! Input is validated before anything is read or written, so a rejected
//! request leaves the document untouched.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use std::sync::Arc;

use canvas::color;
use canvas::consts::{
    DEFAULT_BACKGROUND, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_COLOR, DEFAULT_FONT, DEFAULT_HEIGHT,
    DEFAULT_RADIUS, DEFAULT_TEXT_SIZE, DEFAULT_WIDTH,
};
use canvas::doc::{
    Canvas, CanvasState, CircleShape, Element, ElementId, ElementKind, ElementPatch, ImageShape, PatchError,
    RectangleShape, Shape, TextShape,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::store::{DocumentStore, StoreError};

/// Smallest accepted canvas edge on initialize.
pub const MIN_CANVAS_EDGE: u32 = 100;
/// Largest accepted canvas edge on initialize.
pub const MAX_CANVAS_EDGE: u32 = 5_000;
/// Body of a text element created without one.
pub const DEFAULT_TEXT: &str = "Sample Text";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("element not found: {0}")]
    NotFound(ElementId),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl crate::error::ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "E_VALIDATION",
            Self::NotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<PatchError> for CanvasError {
    fn from(err: PatchError) -> Self {
        let PatchError::NotApplicable { field, .. } = &err;
        Self::Validation { field: *field, message: err.to_string() }
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> CanvasError {
    CanvasError::Validation { field, message: message.into() }
}

/// Body of `POST /initialize`. Omitted fields take the canvas defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeCanvas {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub background_color: Option<String>,
}

// =============================================================================
// SERVICE
// =============================================================================

pub struct CanvasService {
    store: Arc<dyn DocumentStore>,
    lock: RwLock<()>,
}

impl CanvasService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, lock: RwLock::new(()) }
    }

    /// Set dimensions and background, creating the canvas if needed.
    /// Existing elements are kept.
    ///
    /// # Errors
    ///
    /// `Validation` for an out-of-range size or bad color; `Storage` on
    /// store failure.
    pub async fn initialize(&self, req: InitializeCanvas) -> Result<Canvas, CanvasError> {
        let width = canvas_edge("width", req.width, DEFAULT_CANVAS_WIDTH)?;
        let height = canvas_edge("height", req.height, DEFAULT_CANVAS_HEIGHT)?;
        let background_color = req.background_color.unwrap_or_else(|| DEFAULT_BACKGROUND.to_owned());
        if !color::is_valid(&background_color) {
            return Err(invalid("backgroundColor", format!("backgroundColor `{background_color}` is not a valid color")));
        }

        let _guard = self.lock.write().await;
        let mut canvas = self.store.get_canvas().await?.unwrap_or_default();
        canvas.width = width;
        canvas.height = height;
        canvas.background_color = background_color;
        self.store.put_canvas(&canvas).await?;

        info!(width, height, background = %canvas.background_color, "canvas initialized");
        Ok(canvas)
    }

    /// The canvas with resolved elements, creating the default canvas on
    /// first read.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on store failure.
    pub async fn state(&self) -> Result<CanvasState, CanvasError> {
        {
            let _guard = self.lock.read().await;
            if let Some(canvas) = self.store.get_canvas().await? {
                return self.resolve(&canvas).await;
            }
        }
        let _guard = self.lock.write().await;
        let canvas = self.load_or_create().await?;
        self.resolve(&canvas).await
    }

    /// A consistent copy of the document for rendering. Never writes; a
    /// missing canvas reads as the default one.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on store failure.
    pub async fn snapshot(&self) -> Result<CanvasState, CanvasError> {
        let _guard = self.lock.read().await;
        let canvas = self.store.get_canvas().await?.unwrap_or_default();
        self.resolve(&canvas).await
    }

    /// Create a rectangle, circle, or text element from optional fields.
    ///
    /// # Errors
    ///
    /// `Validation` for bad field values or an image kind; `Storage` on
    /// store failure.
    pub async fn add_shape(&self, kind: ElementKind, fields: &ElementPatch) -> Result<Element, CanvasError> {
        validate_fields(fields)?;
        let element = new_shape(kind, fields)?;
        self.insert(element).await
    }

    /// Create an image element pointing at an already stored upload.
    ///
    /// # Errors
    ///
    /// `Validation` for bad placement values; `Storage` on store failure.
    pub async fn add_image(&self, src: &str, fields: &ElementPatch) -> Result<Element, CanvasError> {
        validate_fields(fields)?;
        let shape = Shape::Image(ImageShape {
            width: Some(fields.width.unwrap_or(DEFAULT_WIDTH)),
            height: Some(fields.height.unwrap_or(DEFAULT_HEIGHT)),
            src: Some(src.to_owned()),
        });
        self.insert(Element::new(fields.x.unwrap_or(0.0), fields.y.unwrap_or(0.0), shape)).await
    }

    /// Apply a partial update to one element.
    ///
    /// # Errors
    ///
    /// `Validation` for bad values or fields foreign to the element's kind;
    /// `NotFound` if the element does not exist; `Storage` on store failure.
    pub async fn update_element(&self, id: ElementId, patch: &ElementPatch) -> Result<Element, CanvasError> {
        validate_fields(patch)?;

        let _guard = self.lock.write().await;
        let mut element = self.store.get_element(id).await?.ok_or(CanvasError::NotFound(id))?;
        element.apply_patch(patch)?;
        self.store.put_element(&element).await?;

        info!(element_id = %id, fields = ?patch.present_fields(), "element updated");
        Ok(element)
    }

    /// Remove one element from the list and the store.
    ///
    /// # Errors
    ///
    /// `NotFound` if the element is neither listed nor stored; `Storage` on
    /// store failure.
    pub async fn delete_element(&self, id: ElementId) -> Result<(), CanvasError> {
        let _guard = self.lock.write().await;
        let stored = self.store.get_element(id).await?.is_some();

        let mut listed = false;
        if let Some(mut canvas) = self.store.get_canvas().await? {
            let before = canvas.elements.len();
            canvas.elements.retain(|e| *e != id);
            listed = canvas.elements.len() != before;
            if listed {
                self.store.put_canvas(&canvas).await?;
            }
        }
        if !stored && !listed {
            return Err(CanvasError::NotFound(id));
        }
        if stored {
            self.store.delete_element(id).await?;
        }

        info!(element_id = %id, "element deleted");
        Ok(())
    }

    /// Remove every element, keeping size and background.
    ///
    /// # Errors
    ///
    /// Returns `Storage` on store failure.
    pub async fn clear(&self) -> Result<(), CanvasError> {
        let _guard = self.lock.write().await;
        if let Some(mut canvas) = self.store.get_canvas().await?
            && !canvas.elements.is_empty()
        {
            canvas.elements.clear();
            self.store.put_canvas(&canvas).await?;
        }
        self.store.delete_all_elements().await?;

        info!("canvas cleared");
        Ok(())
    }

    // -------------------------------------------------------------------------

    async fn insert(&self, element: Element) -> Result<Element, CanvasError> {
        let _guard = self.lock.write().await;
        let mut canvas = self.load_or_create().await?;
        self.store.put_element(&element).await?;
        canvas.elements.push(element.id);
        self.store.put_canvas(&canvas).await?;

        info!(element_id = %element.id, kind = %element.kind(), "element added");
        Ok(element)
    }

    /// Caller must hold the write guard.
    async fn load_or_create(&self) -> Result<Canvas, CanvasError> {
        if let Some(canvas) = self.store.get_canvas().await? {
            return Ok(canvas);
        }
        let canvas = Canvas::default();
        self.store.put_canvas(&canvas).await?;
        info!(width = canvas.width, height = canvas.height, "default canvas created");
        Ok(canvas)
    }

    async fn resolve(&self, canvas: &Canvas) -> Result<CanvasState, CanvasError> {
        let elements = self.store.get_elements(&canvas.elements).await?;
        Ok(CanvasState::new(canvas, elements))
    }
}

// =============================================================================
// VALIDATION + DEFAULTS
// =============================================================================

fn canvas_edge(field: &'static str, value: Option<f64>, default: u32) -> Result<u32, CanvasError> {
    let Some(v) = value else {
        return Ok(default);
    };
    let range = f64::from(MIN_CANVAS_EDGE)..=f64::from(MAX_CANVAS_EDGE);
    if !v.is_finite() || v.fract() != 0.0 || !range.contains(&v) {
        return Err(invalid(
            field,
            format!("{field} must be an integer between {MIN_CANVAS_EDGE} and {MAX_CANVAS_EDGE}"),
        ));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let edge = v as u32;
    Ok(edge)
}

/// Check every present field's value. Does not check kind applicability.
///
/// # Errors
///
/// Returns `Validation` naming the first offending field.
pub fn validate_fields(fields: &ElementPatch) -> Result<(), CanvasError> {
    for (field, v) in fields.numeric_fields() {
        if !v.is_finite() {
            return Err(invalid(field, format!("{field} must be a finite number")));
        }
        let may_be_zero = matches!(field, "x" | "y" | "borderWidth");
        if may_be_zero && v < 0.0 {
            return Err(invalid(field, format!("{field} must not be negative")));
        }
        if !may_be_zero && v <= 0.0 {
            return Err(invalid(field, format!("{field} must be greater than 0")));
        }
    }
    let colors = [("color", &fields.color), ("fillColor", &fields.fill_color), ("borderColor", &fields.border_color)];
    for (field, value) in colors {
        if let Some(c) = value
            && !color::is_valid(c)
        {
            return Err(invalid(field, format!("{field} `{c}` is not a valid color")));
        }
    }
    if let Some(font) = &fields.font
        && font.trim().is_empty()
    {
        return Err(invalid("font", "font must not be empty"));
    }
    Ok(())
}

/// Build a new element, filling omitted fields with creation defaults.
fn new_shape(kind: ElementKind, f: &ElementPatch) -> Result<Element, CanvasError> {
    let color = f.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_owned());
    let shape = match kind {
        ElementKind::Rectangle => Shape::Rectangle(RectangleShape {
            width: Some(f.width.unwrap_or(DEFAULT_WIDTH)),
            height: Some(f.height.unwrap_or(DEFAULT_HEIGHT)),
            fill_color: Some(f.fill_color.clone().unwrap_or_else(|| color.clone())),
            color: Some(color),
            border_color: f.border_color.clone(),
            border_width: Some(f.border_width.unwrap_or(0.0)),
        }),
        ElementKind::Circle => Shape::Circle(CircleShape {
            radius: Some(f.radius.unwrap_or(DEFAULT_RADIUS)),
            fill_color: Some(f.fill_color.clone().unwrap_or_else(|| color.clone())),
            color: Some(color),
            border_color: f.border_color.clone(),
            border_width: Some(f.border_width.unwrap_or(0.0)),
        }),
        ElementKind::Text => Shape::Text(TextShape {
            text: Some(f.text.clone().unwrap_or_else(|| DEFAULT_TEXT.to_owned())),
            size: Some(f.size.unwrap_or(DEFAULT_TEXT_SIZE)),
            color: Some(color),
            font: Some(f.font.clone().unwrap_or_else(|| DEFAULT_FONT.to_owned())),
        }),
        ElementKind::Image => return Err(invalid("type", "image elements are created by upload")),
    };
    Ok(Element::new(f.x.unwrap_or(0.0), f.y.unwrap_or(0.0), shape))
}
