use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::app_state::QuoteState;
use crate::services::ApiError;

/// Toggleable artificial latency in front of the upstream lookup.
///
/// Only the on/off flag is shared; it carries no data, so relaxed ordering
/// is enough and requests already in flight keep whatever they read.
pub struct ChaosDelay {
    enabled: AtomicBool,
    min: Duration,
    max: Duration,
}

impl ChaosDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            min,
            max: max.max(min),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Sleep for a random duration in `[min, max]` when enabled.
    pub async fn maybe_delay(&self) {
        if !self.is_enabled() {
            return;
        }
        let delay = rand::thread_rng().gen_range(self.min..=self.max);
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StockResponse {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `GET /stock/:symbol`
pub async fn get_stock(
    State(state): State<QuoteState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockResponse>, ApiError> {
    let m = state.metrics();
    m.requests.inc(&[])?;
    let _timer = m.latency.start_timer();

    state.chaos().maybe_delay().await;
    match state.quotes().fetch_quote(&symbol).await {
        Ok(q) => Ok(Json(StockResponse {
            symbol: symbol.to_uppercase(),
            price: round2(q.price),
            change: round2(q.price - q.previous_close),
        })),
        Err(e) => {
            m.errors.inc(&[])?;
            tracing::warn!(%symbol, error = %e, "stock fetch failed");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Stock fetch failed",
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChaosQuery {
    pub enable: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChaosResponse {
    pub delay_enabled: bool,
}

/// `POST /chaos/delay?enable=<bool>`
pub async fn chaos_delay(
    State(state): State<QuoteState>,
    Query(q): Query<ChaosQuery>,
) -> Json<ChaosResponse> {
    state.chaos().set_enabled(q.enable);
    tracing::info!(enabled = q.enable, "chaos delay toggled");
    Json(ChaosResponse {
        delay_enabled: state.chaos().is_enabled(),
    })
}
