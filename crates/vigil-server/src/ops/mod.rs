//! Operational HTTP endpoints shared by both services.
//!
//! - `/health`  : liveness
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use vigil_core::metrics::CONTENT_TYPE;

use crate::app_state::MetricsSource;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Scrapes are not counted; live gauges are refreshed before encoding.
pub async fn metrics<S: MetricsSource>(State(state): State<S>) -> Response {
    state.refresh_live_gauges();
    let body = state.registry().render();

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
