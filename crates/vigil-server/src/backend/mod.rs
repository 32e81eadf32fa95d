//! Opaque backends wrapped by the services.
//!
//! The metrics layer never looks inside these; any failure is reported as
//! `VigilError::Backend` and counted uniformly by the handler.

pub mod model;
pub mod yahoo;

use async_trait::async_trait;
use serde::Serialize;

use vigil_core::error::Result;

pub use model::LinearModel;
pub use yahoo::YahooQuotes;

/// Number of input features the classifier takes.
pub const FEATURE_COUNT: usize = 4;

/// Static description served by `/model-info`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub model: String,
    pub dataset: String,
    pub accuracy: String,
    pub features: usize,
    pub classes: Vec<i64>,
}

/// Precomputed classifier, loaded once at startup.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> Result<i64>;
    fn info(&self) -> ModelInfo;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub previous_close: f64,
}

/// Market-data lookup.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}
