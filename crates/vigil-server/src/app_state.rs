//! Shared application state for the two services.
//!
//! One `Registry` is built per process and injected into the service state;
//! handlers reach instruments only through these handles.

use std::sync::Arc;
use std::time::Duration;

use vigil_core::error::Result;
use vigil_core::metrics::Registry;

use crate::backend::{Classifier, LinearModel, QuoteSource, YahooQuotes};
use crate::config::{ServerConfig, ServiceSection};
use crate::obs::{PredictMetrics, QuoteMetrics, SystemSampler};
use crate::services::quote::ChaosDelay;

/// State a `/metrics` scrape needs.
pub trait MetricsSource: Clone + Send + Sync + 'static {
    fn registry(&self) -> &Registry;

    /// Refresh gauges that are sampled at scrape time.
    fn refresh_live_gauges(&self) {}
}

#[derive(Clone)]
pub struct PredictState {
    inner: Arc<PredictInner>,
}

struct PredictInner {
    registry: Arc<Registry>,
    metrics: PredictMetrics,
    classifier: Arc<dyn Classifier>,
}

impl PredictState {
    pub fn new(
        registry: Arc<Registry>,
        classifier: Arc<dyn Classifier>,
        latency_buckets: &[f64],
    ) -> Result<Self> {
        let metrics = PredictMetrics::register(&registry, latency_buckets)?;
        Ok(Self {
            inner: Arc::new(PredictInner {
                registry,
                metrics,
                classifier,
            }),
        })
    }

    pub fn metrics(&self) -> &PredictMetrics {
        &self.inner.metrics
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.inner.classifier.as_ref()
    }
}

impl MetricsSource for PredictState {
    fn registry(&self) -> &Registry {
        &self.inner.registry
    }
}

#[derive(Clone)]
pub struct QuoteState {
    inner: Arc<QuoteInner>,
}

struct QuoteInner {
    registry: Arc<Registry>,
    metrics: QuoteMetrics,
    quotes: Arc<dyn QuoteSource>,
    chaos: ChaosDelay,
    sampler: SystemSampler,
}

impl QuoteState {
    pub fn new(
        registry: Arc<Registry>,
        quotes: Arc<dyn QuoteSource>,
        chaos: ChaosDelay,
        latency_buckets: &[f64],
    ) -> Result<Self> {
        let metrics = QuoteMetrics::register(&registry, latency_buckets)?;
        Ok(Self {
            inner: Arc::new(QuoteInner {
                registry,
                metrics,
                quotes,
                chaos,
                sampler: SystemSampler::new(),
            }),
        })
    }

    pub fn metrics(&self) -> &QuoteMetrics {
        &self.inner.metrics
    }

    pub fn quotes(&self) -> &dyn QuoteSource {
        self.inner.quotes.as_ref()
    }

    pub fn chaos(&self) -> &ChaosDelay {
        &self.inner.chaos
    }
}

impl MetricsSource for QuoteState {
    fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    fn refresh_live_gauges(&self) {
        let m = &self.inner.metrics;
        let sampler = &self.inner.sampler;
        if let Err(e) = m.cpu_usage.set(sampler.cpu_percent()) {
            tracing::warn!(error = %e, "cpu gauge refresh failed");
        }
        if let Err(e) = m.memory_usage.set(sampler.memory_percent()) {
            tracing::warn!(error = %e, "memory gauge refresh failed");
        }
    }
}

/// The service this process runs, built from config.
#[derive(Clone)]
pub enum AppState {
    Predict(PredictState),
    Quote(QuoteState),
}

impl AppState {
    /// Build state from config.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn from_config(cfg: &ServerConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        match &cfg.service {
            ServiceSection::Predict(p) => {
                let model = LinearModel::load_from_file(&p.model_path)?;
                tracing::info!(path = %p.model_path, classes = ?model.classes, "model loaded");
                let state = PredictState::new(registry, Arc::new(model), &p.latency_buckets)?;
                Ok(AppState::Predict(state))
            }
            ServiceSection::Quote(q) => {
                let quotes = YahooQuotes::new(&q.upstream_url, Duration::from_millis(q.timeout_ms))?;
                let chaos = ChaosDelay::new(
                    Duration::from_millis(q.chaos.min_delay_ms),
                    Duration::from_millis(q.chaos.max_delay_ms),
                );
                let state = QuoteState::new(registry, Arc::new(quotes), chaos, &q.latency_buckets)?;
                Ok(AppState::Quote(state))
            }
        }
    }
}
