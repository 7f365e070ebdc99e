//! Export backends: turn a [`Scene`] into file bytes.
//!
//! DESIGN
//! ======
//! Both backends consume the shared `canvas::scene::Scene`, so geometry
//! defaults and color fallbacks are resolved exactly once. Image bytes are
//! resolved by the caller before rendering and handed in as an [`ImageSet`];
//! rendering itself is synchronous CPU work with no I/O, which lets the
//! export service run it on the blocking pool.
//!
//! ERROR HANDLING
//! ==============
//! A single element that cannot be drawn (missing image, undecodable bytes,
//! no usable font) is reported as an [`ElementFailure`] in
//! [`Rendered::skipped`] and the rest of the page still renders. Only an
//! unusable surface or an encoder failure fails the whole export.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

pub mod fonts;
pub mod pdf;
pub mod raster;

use std::collections::HashMap;

use canvas::doc::ElementId;
use canvas::scene::{PaintError, Scene};

/// Resolved image bytes keyed by image-store reference. `Err` carries the
/// reason the reference could not be resolved.
pub type ImageSet = HashMap<String, Result<Vec<u8>, String>>;

/// Largest page edge either backend accepts.
pub const MAX_PAGE_EDGE: u32 = 10_000;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("cannot render canvas: {0}")]
    Fatal(String),
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl crate::error::ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Fatal(_) => "E_RENDER_FATAL",
            Self::Encode(_) => "E_RENDER_ENCODE",
        }
    }
}

/// Why one element was left out of an export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElementFailure {
    #[error("{0}")]
    Paint(#[from] PaintError),
    #[error("image {src} unavailable: {reason}")]
    ImageUnavailable { src: String, reason: String },
    #[error("image {src} could not be decoded: {reason}")]
    ImageDecode { src: String, reason: String },
    #[error("no usable font for family `{0}`")]
    Font(String),
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Encoded export plus the elements that were skipped while drawing it.
#[derive(Debug)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub skipped: Vec<(ElementId, ElementFailure)>,
}

/// Output file type for `GET /export/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Parse the `{format}` segment of `/export/image/{format}`.
    #[must_use]
    pub fn from_image_param(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

/// Page size check shared by both backends.
///
/// # Errors
///
/// Returns [`RenderError::Fatal`] for a zero or oversized edge.
pub fn check_page(scene: &Scene) -> Result<(u32, u32), RenderError> {
    let (w, h) = (scene.width, scene.height);
    if w == 0 || h == 0 {
        return Err(RenderError::Fatal(format!("canvas has non-positive size {w}x{h}")));
    }
    if w > MAX_PAGE_EDGE || h > MAX_PAGE_EDGE {
        return Err(RenderError::Fatal(format!("canvas size {w}x{h} exceeds {MAX_PAGE_EDGE}px")));
    }
    Ok((w, h))
}

/// Look up and decode an image reference into straight-alpha RGBA.
pub(crate) fn decode_image(images: &ImageSet, src: &str) -> Result<image::RgbaImage, ElementFailure> {
    let bytes = match images.get(src) {
        Some(Ok(bytes)) => bytes,
        Some(Err(reason)) => {
            return Err(ElementFailure::ImageUnavailable { src: src.to_owned(), reason: reason.clone() });
        }
        None => {
            return Err(ElementFailure::ImageUnavailable { src: src.to_owned(), reason: "not resolved".into() });
        }
    };
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| ElementFailure::ImageDecode { src: src.to_owned(), reason: e.to_string() })
}
