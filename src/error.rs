//! Error codes and the JSON error body returned by every HTTP handler.
//!
//! DESIGN
//! ======
//! Each layer defines its own `thiserror` enum and implements [`ErrorCode`]
//! for it. Route handlers map those enums onto [`ApiError`], which renders
//! `{ "success": false, "error", "code", "field"? }`.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// An error on its way to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub field: Option<&'static str>,
}

impl ApiError {
    /// Build from any coded error. Server-side failures are logged here.
    #[must_use]
    pub fn from_code(status: StatusCode, err: &impl ErrorCode) -> Self {
        if status.is_server_error() {
            tracing::error!(code = err.error_code(), retryable = err.retryable(), error = %err, "request failed");
        }
        Self { status, code: err.error_code(), message: err.to_string(), field: None }
    }

    /// A 400 naming the offending input field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: "E_VALIDATION", message: message.into(), field: Some(field) }
    }

    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.message,
            "code": self.code,
        });
        if let Some(field) = self.field {
            body["field"] = json!(field);
        }
        (self.status, Json(body)).into_response()
    }
}
