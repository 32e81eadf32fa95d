use crate::error::{Result, VigilError};

use super::atomic::AtomicF64;
use super::labels::{validate_label_name, validate_metric_name};
use super::Sample;

/// Last-write-wins value with optional constant labels.
///
/// Live gauges (CPU, memory) are refreshed by their owner right before a
/// scrape; the gauge itself never samples anything.
#[derive(Debug)]
pub struct Gauge {
    name: String,
    help: String,
    const_labels: Vec<(String, String)>,
    value: AtomicF64,
}

impl Gauge {
    pub(crate) fn new(name: &str, help: &str, const_labels: &[(String, String)]) -> Result<Self> {
        validate_metric_name(name)?;
        let mut labels = const_labels.to_vec();
        for (k, _) in &labels {
            validate_label_name(k)?;
        }
        labels.sort();
        if labels.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(VigilError::InvalidArgument(format!(
                "gauge {name} has duplicate constant labels"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            const_labels: labels,
            value: AtomicF64::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn set(&self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(VigilError::InvalidArgument(format!(
                "gauge {} value must be finite, got {value}",
                self.name
            )));
        }
        self.value.set(value);
        Ok(())
    }

    pub fn value(&self) -> f64 {
        self.value.get()
    }

    pub(crate) fn snapshot(&self) -> Vec<Sample> {
        vec![Sample {
            labels: self.const_labels.clone(),
            value: self.value.get(),
        }]
    }
}
