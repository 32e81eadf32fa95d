//! Metric sets owned by each service.
//!
//! Everything is registered up front so a duplicate or malformed instrument
//! stops the process before the listener binds.

use std::sync::Arc;

use vigil_core::error::{Result, VigilError};
use vigil_core::metrics::{Counter, Gauge, Histogram, Registry};

use crate::backend::FEATURE_COUNT;

/// Input features of the iris classifier, in model column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::SepalLength,
        Feature::SepalWidth,
        Feature::PetalLength,
        Feature::PetalWidth,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Feature::SepalLength => "sepal_length",
            Feature::SepalWidth => "sepal_width",
            Feature::PetalLength => "petal_length",
            Feature::PetalWidth => "petal_width",
        }
    }

    fn help(self) -> &'static str {
        match self {
            Feature::SepalLength => "Sepal length",
            Feature::SepalWidth => "Sepal width",
            Feature::PetalLength => "Petal length",
            Feature::PetalWidth => "Petal width",
        }
    }
}

/// One gauge per [`Feature`], holding the last raw input value.
pub struct FeatureGauges {
    gauges: [Arc<Gauge>; FEATURE_COUNT],
}

impl FeatureGauges {
    fn register(registry: &Registry) -> Result<Self> {
        let gauges: Vec<Arc<Gauge>> = Feature::ALL
            .iter()
            .map(|f| registry.register_gauge(&format!("feature_{}", f.key()), f.help()))
            .collect::<Result<_>>()?;
        let gauges = gauges
            .try_into()
            .map_err(|_| VigilError::Internal("feature gauge count mismatch".into()))?;
        Ok(Self { gauges })
    }

    pub fn get(&self, feature: Feature) -> &Gauge {
        &self.gauges[feature as usize]
    }

    /// Set every gauge from a feature vector in [`Feature::ALL`] order.
    pub fn record(&self, values: &[f64; FEATURE_COUNT]) -> Result<()> {
        for (gauge, v) in self.gauges.iter().zip(values) {
            gauge.set(*v)?;
        }
        Ok(())
    }
}

pub struct PredictMetrics {
    pub requests: Arc<Counter>,
    pub errors: Arc<Counter>,
    pub latency: Arc<Histogram>,
    pub classes: Arc<Counter>,
    pub features: FeatureGauges,
}

impl PredictMetrics {
    pub const CLASS_LABEL: &'static str = "pred_class";

    pub fn register(registry: &Registry, latency_buckets: &[f64]) -> Result<Self> {
        Ok(Self {
            requests: registry
                .register_counter("prediction_requests_total", "Total prediction requests")?,
            errors: registry.register_counter("prediction_errors_total", "Total prediction errors")?,
            latency: registry.register_histogram(
                "prediction_latency_seconds",
                "Prediction latency",
                latency_buckets,
            )?,
            classes: registry.register_counter_vec(
                "prediction_class_total",
                "Prediction class distribution",
                &[Self::CLASS_LABEL],
            )?,
            features: FeatureGauges::register(registry)?,
        })
    }

    pub fn record_class(&self, class: i64) -> Result<()> {
        let class = class.to_string();
        self.classes.inc(&[(Self::CLASS_LABEL, class.as_str())])
    }
}

pub struct QuoteMetrics {
    pub requests: Arc<Counter>,
    pub errors: Arc<Counter>,
    pub latency: Arc<Histogram>,
    pub cpu_usage: Arc<Gauge>,
    pub memory_usage: Arc<Gauge>,
}

impl QuoteMetrics {
    pub fn register(registry: &Registry, latency_buckets: &[f64]) -> Result<Self> {
        Ok(Self {
            requests: registry.register_counter("api_requests_total", "Total API requests")?,
            errors: registry.register_counter("api_errors_total", "Total API errors")?,
            latency: registry.register_histogram(
                "api_response_latency_seconds",
                "API latency",
                latency_buckets,
            )?,
            cpu_usage: registry.register_gauge("cpu_usage_percent", "CPU usage")?,
            memory_usage: registry.register_gauge("memory_usage_percent", "Memory usage")?,
        })
    }
}
