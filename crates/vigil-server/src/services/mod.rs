//! HTTP handlers for predict-service and quote-service.
//!
//! Both follow the same instrumentation order: count the request, start the
//! latency timer, call the backend, then count either the outcome or the
//! error. The timer guard observes once on every exit path.

pub mod predict;
pub mod quote;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use vigil_core::error::VigilError;

/// Error rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<VigilError> for ApiError {
    fn from(e: VigilError) -> Self {
        let code = e.client_code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() && !matches!(e, VigilError::Backend(_)) {
            // Metric wiring bugs land here; make them loud.
            tracing::error!(error = %e, code = code.as_str(), "internal error in handler");
        }
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
