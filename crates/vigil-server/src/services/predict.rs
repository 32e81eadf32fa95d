use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use vigil_core::error::Result;

use crate::app_state::PredictState;
use crate::backend::{ModelInfo, FEATURE_COUNT};
use crate::services::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct IrisRequest {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl IrisRequest {
    /// Features in `Feature::ALL` order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub prediction: i64,
}

/// `POST /predict`
pub async fn predict(
    State(state): State<PredictState>,
    Json(req): Json<IrisRequest>,
) -> std::result::Result<Json<PredictResponse>, ApiError> {
    let m = state.metrics();
    m.requests.inc(&[])?;
    let _timer = m.latency.start_timer();

    match classify(&state, &req) {
        Ok(prediction) => Ok(Json(PredictResponse { prediction })),
        Err(e) => {
            m.errors.inc(&[])?;
            tracing::warn!(error = %e, "prediction failed");
            Err(e.into())
        }
    }
}

/// Backend call plus success-path metric updates; any failure here is one error.
fn classify(state: &PredictState, req: &IrisRequest) -> Result<i64> {
    let features = req.features();
    let class = state.classifier().predict(&features)?;
    let m = state.metrics();
    m.record_class(class)?;
    m.features.record(&features)?;
    Ok(class)
}

/// `GET /model-info`
pub async fn model_info(State(state): State<PredictState>) -> Json<ModelInfo> {
    Json(state.classifier().info())
}
