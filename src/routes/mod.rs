//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the canvas JSON API under `/api/canvas`, serves stored
//! uploads as static files under `/uploads`, and exposes `/healthz`.

pub mod canvas;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Room for multipart boundaries and the placement text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn canvas_routes() -> Router<AppState> {
    Router::new()
        .route("/initialize", post(canvas::initialize))
        .route("/state", get(canvas::state))
        .route("/add/rectangle", post(canvas::add_rectangle))
        .route("/add/circle", post(canvas::add_circle))
        .route("/add/text", post(canvas::add_text))
        .route("/add/image", post(canvas::add_image))
        .route("/element/{id}", put(canvas::update_element).delete(canvas::delete_element))
        .route("/clear", delete(canvas::clear))
        .route("/export/pdf", get(canvas::export_pdf))
        .route("/export/image/{format}", get(canvas::export_image))
}

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let uploads = ServeDir::new(&state.config.upload_dir);
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .nest("/api/canvas", canvas_routes())
        .route("/healthz", get(healthz))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
