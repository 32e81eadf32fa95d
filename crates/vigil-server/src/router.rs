//! Axum router wiring for predict-service and quote-service.

use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::{AppState, PredictState, QuoteState};
use crate::{ops, services};

pub fn predict_router(state: PredictState) -> Router {
    Router::new()
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics::<PredictState>))
        .route("/model-info", get(services::predict::model_info))
        .route("/predict", post(services::predict::predict))
        .with_state(state)
}

pub fn quote_router(state: QuoteState) -> Router {
    Router::new()
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics::<QuoteState>))
        .route("/stock/:symbol", get(services::quote::get_stock))
        .route("/chaos/delay", post(services::quote::chaos_delay))
        .with_state(state)
}

pub fn build_router(state: AppState) -> Router {
    match state {
        AppState::Predict(s) => predict_router(s),
        AppState::Quote(s) => quote_router(s),
    }
}
