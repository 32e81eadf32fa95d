//! Service metric sets and live host sampling.
//!
//! Instruments come from `vigil_core::metrics`; this module only decides
//! which ones each service registers and how the live gauges are refreshed.

pub mod metrics;
pub mod sysstat;

pub use metrics::{Feature, FeatureGauges, PredictMetrics, QuoteMetrics};
pub use sysstat::SystemSampler;
