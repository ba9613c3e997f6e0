//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`sc_core::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` on library calls.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: sc_core::Error,
}

impl AppError {
    pub fn new(inner: sc_core::Error) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &sc_core::Error {
        &self.inner
    }

    fn code(&self) -> &'static str {
        match &self.inner {
            sc_core::Error::NotFound { .. } => "not_found",
            sc_core::Error::Validation(_) => "validation_error",
            sc_core::Error::Input(_) => "input_error",
            sc_core::Error::Conflict(_) => "conflict",
            sc_core::Error::Io { .. } => "io_error",
            sc_core::Error::Tool { .. } => "tool_error",
            sc_core::Error::MissingInput { .. } => "missing_input",
            sc_core::Error::Pipeline { .. } => "pipeline_error",
            sc_core::Error::Cancelled => "cancelled",
            sc_core::Error::Internal(_) => "internal_error",
        }
    }
}

impl From<sc_core::Error> for AppError {
    fn from(e: sc_core::Error) -> Self {
        Self::new(e)
    }
}

/// A malformed upload is the client's fault.
impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        Self::new(sc_core::Error::Validation(format!("invalid upload: {e}")))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
