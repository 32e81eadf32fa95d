use std::net::SocketAddr;

use serde::Deserialize;
use vigil_core::error::{Result, VigilError};
use vigil_core::metrics::DEFAULT_BUCKETS;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    pub service: ServiceSection,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VigilError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.service.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            VigilError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}

/// Which service this process runs.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceSection {
    Predict(PredictSection),
    Quote(QuoteSection),
}

impl ServiceSection {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceSection::Predict(_) => "predict",
            ServiceSection::Quote(_) => "quote",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ServiceSection::Predict(p) => p.validate(),
            ServiceSection::Quote(q) => q.validate(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictSection {
    pub model_path: String,

    #[serde(default = "default_predict_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl PredictSection {
    pub fn validate(&self) -> Result<()> {
        if self.model_path.trim().is_empty() {
            return Err(VigilError::BadRequest("service.model_path must not be empty".into()));
        }
        validate_buckets(&self.latency_buckets)
    }
}

fn default_predict_buckets() -> Vec<f64> {
    vec![0.01, 0.05, 0.1, 0.3, 0.5, 1.0, 2.0]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteSection {
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_quote_buckets")]
    pub latency_buckets: Vec<f64>,

    #[serde(default)]
    pub chaos: ChaosSection,
}

impl QuoteSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.upstream_url.starts_with("http://") || self.upstream_url.starts_with("https://")) {
            return Err(VigilError::BadRequest(
                "service.upstream_url must be an http(s) URL".into(),
            ));
        }
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(VigilError::BadRequest(
                "service.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        validate_buckets(&self.latency_buckets)?;
        self.chaos.validate()
    }
}

fn default_upstream_url() -> String {
    "https://query1.finance.yahoo.com".into()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_quote_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}

/// Injected latency range for the chaos toggle.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChaosSection {
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for ChaosSection {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl ChaosSection {
    pub fn validate(&self) -> Result<()> {
        if self.min_delay_ms > self.max_delay_ms {
            return Err(VigilError::BadRequest(
                "service.chaos.min_delay_ms must not exceed max_delay_ms".into(),
            ));
        }
        if self.max_delay_ms > 60000 {
            return Err(VigilError::BadRequest(
                "service.chaos.max_delay_ms must be at most 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_min_delay_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    5000
}

fn validate_buckets(b: &[f64]) -> Result<()> {
    if b.iter().any(|v| !v.is_finite()) || b.windows(2).any(|w| w[0] >= w[1]) {
        return Err(VigilError::BadRequest(
            "service.latency_buckets must be finite and strictly increasing".into(),
        ));
    }
    Ok(())
}
