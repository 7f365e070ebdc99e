//! Canvas document routes under `/api/canvas`.
//!
//! Handlers parse input, call the services, and map service errors onto
//! [`ApiError`]. Successful mutations answer `{ "success": true, … }`;
//! `GET /state` answers the bare document.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use canvas::doc::{CanvasState, ElementKind, ElementPatch};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;
use crate::images::{self, ImageStoreError};
use crate::render::ExportFormat;
use crate::services::canvas::{CanvasError, InitializeCanvas, validate_fields};
use crate::services::export::ExportError;
use crate::state::AppState;

// =============================================================================
// DOCUMENT
// =============================================================================

/// `POST /api/canvas/initialize`: set size and background.
pub async fn initialize(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let req: InitializeCanvas = parse_body(&body)?;
    let canvas = state.canvas.initialize(req).await.map_err(canvas_error)?;
    Ok(Json(json!({ "success": true, "canvas": canvas })))
}

/// `GET /api/canvas/state`: the document with resolved elements.
pub async fn state(State(state): State<AppState>) -> Result<Json<CanvasState>, ApiError> {
    let doc = state.canvas.state().await.map_err(canvas_error)?;
    Ok(Json(doc))
}

/// `DELETE /api/canvas/clear`: remove every element.
pub async fn clear(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.canvas.clear().await.map_err(canvas_error)?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// `POST /api/canvas/add/rectangle`
pub async fn add_rectangle(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    add_shape(&state, ElementKind::Rectangle, &body).await
}

/// `POST /api/canvas/add/circle`
pub async fn add_circle(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    add_shape(&state, ElementKind::Circle, &body).await
}

/// `POST /api/canvas/add/text`
pub async fn add_text(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    add_shape(&state, ElementKind::Text, &body).await
}

async fn add_shape(state: &AppState, kind: ElementKind, body: &Bytes) -> Result<Json<Value>, ApiError> {
    let fields: ElementPatch = parse_body(body)?;
    let element = state.canvas.add_shape(kind, &fields).await.map_err(canvas_error)?;
    Ok(Json(json!({ "success": true, "element": element })))
}

/// `POST /api/canvas/add/image`: an `image` file upload plus
/// optional `x`, `y`, `width`, `height` text fields.
pub async fn add_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let max_bytes = state.config.max_upload_bytes;
    let mut upload: Option<(String, Bytes)> = None;
    let mut fields = ElementPatch::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::validation("image", e.body_text()))? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("image").to_owned();
                let bytes = field.bytes().await.map_err(|e| ApiError::validation("image", e.body_text()))?;
                upload = Some((filename, bytes));
            }
            "x" => fields.x = number_field("x", field.text().await)?,
            "y" => fields.y = number_field("y", field.text().await)?,
            "width" => fields.width = number_field("width", field.text().await)?,
            "height" => fields.height = number_field("height", field.text().await)?,
            _ => {}
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::validation("image", "no image file provided"));
    };
    if bytes.is_empty() {
        return Err(ApiError::validation("image", "image file is empty"));
    }
    if bytes.len() > max_bytes {
        return Err(ApiError::validation("image", format!("image exceeds {max_bytes} bytes")));
    }
    if images::sniff_format(&bytes).is_none() {
        return Err(ApiError::validation("image", "image must be PNG, JPEG, or GIF"));
    }

    // Placement is checked before the file lands on disk.
    validate_fields(&fields).map_err(canvas_error)?;

    let src = state.images.store_upload(&bytes, &filename).await.map_err(image_store_error)?;
    let element = state.canvas.add_image(&src, &fields).await.map_err(canvas_error)?;
    Ok(Json(json!({ "success": true, "element": element })))
}

/// `PUT /api/canvas/element/{id}`: partial update.
pub async fn update_element(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let patch: ElementPatch = parse_body(&body)?;
    let element = state.canvas.update_element(id, &patch).await.map_err(canvas_error)?;
    Ok(Json(json!({ "success": true, "element": element })))
}

/// `DELETE /api/canvas/element/{id}`
pub async fn delete_element(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.canvas.delete_element(id).await.map_err(canvas_error)?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// EXPORT
// =============================================================================

/// `GET /api/canvas/export/pdf`
pub async fn export_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = state.export.export(ExportFormat::Pdf).await.map_err(export_error)?;
    Ok(attachment(ExportFormat::Pdf, "pdf", bytes))
}

/// `GET /api/canvas/export/image/{format}`: `png`, `jpg`, or `jpeg`.
pub async fn export_image(State(state): State<AppState>, Path(format): Path<String>) -> Result<Response, ApiError> {
    let Some(export_format) = ExportFormat::from_image_param(&format) else {
        return Err(ApiError::validation("format", format!("unsupported image format `{format}`")));
    };
    let bytes = state.export.export(export_format).await.map_err(export_error)?;
    Ok(attachment(export_format, &format.to_ascii_lowercase(), bytes))
}

fn attachment(format: ExportFormat, extension: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, format.content_type().to_owned()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"canvas-export.{extension}\"")),
        ],
        bytes,
    )
        .into_response()
}

// =============================================================================
// INPUT
// =============================================================================

/// Parse a JSON body; an empty body reads as all fields omitted.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::validation("body", format!("invalid JSON body: {e}")))
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("id", format!("`{raw}` is not a valid element id")))
}

fn number_field(name: &'static str, text: Result<String, MultipartError>) -> Result<Option<f64>, ApiError> {
    let text = text.map_err(|e| ApiError::validation(name, e.body_text()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ApiError::validation(name, format!("{name} must be a number")))
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn canvas_error(err: CanvasError) -> ApiError {
    match &err {
        CanvasError::Validation { field, .. } => ApiError::from_code(StatusCode::BAD_REQUEST, &err).with_field(*field),
        CanvasError::NotFound(_) => ApiError::from_code(StatusCode::NOT_FOUND, &err),
        CanvasError::Storage(_) => ApiError::from_code(StatusCode::INTERNAL_SERVER_ERROR, &err),
    }
}

pub(crate) fn export_error(err: ExportError) -> ApiError {
    match err {
        ExportError::Canvas(e) => canvas_error(e),
        other => ApiError::from_code(StatusCode::INTERNAL_SERVER_ERROR, &other),
    }
}

pub(crate) fn image_store_error(err: ImageStoreError) -> ApiError {
    match &err {
        ImageStoreError::Invalid(_) => ApiError::from_code(StatusCode::BAD_REQUEST, &err).with_field("image"),
        ImageStoreError::NotFound(_) => ApiError::from_code(StatusCode::NOT_FOUND, &err),
        ImageStoreError::Io(_) => ApiError::from_code(StatusCode::INTERNAL_SERVER_ERROR, &err),
    }
}
