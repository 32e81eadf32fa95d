//! Metric/label name validation and label-key construction.
//!
//! Label children are keyed by their values laid out in sorted label-name
//! order, so the order callers pass labels in never produces a second child.

use crate::error::{Result, VigilError};

fn is_name_char(c: char, first: bool, allow_colon: bool) -> bool {
    c == '_' || c.is_ascii_alphabetic() || (allow_colon && c == ':') || (!first && c.is_ascii_digit())
}

/// Metric names follow `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub(crate) fn validate_metric_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| is_name_char(c, i == 0, true));
    if ok {
        Ok(())
    } else {
        Err(VigilError::InvalidArgument(format!("invalid metric name: {name:?}")))
    }
}

/// Label names follow `[a-zA-Z_][a-zA-Z0-9_]*`; `__` prefixes are reserved.
pub(crate) fn validate_label_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && !name.starts_with("__")
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| is_name_char(c, i == 0, false));
    if ok {
        Ok(())
    } else {
        Err(VigilError::InvalidArgument(format!("invalid label name: {name:?}")))
    }
}

/// Declared label names of a partitioned instrument.
#[derive(Debug, Clone, Default)]
pub(crate) struct LabelNames {
    names: Vec<String>,
}

impl LabelNames {
    pub(crate) fn new(names: &[&str]) -> Result<Self> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        for n in &names {
            validate_label_name(n)?;
        }
        names.sort();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(VigilError::InvalidArgument(format!(
                "duplicate label names: [{}]",
                names.join(",")
            )));
        }
        Ok(Self { names })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Build the child key, requiring exactly the declared label names.
    pub(crate) fn key(&self, metric: &str, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        let mismatch = || VigilError::InvalidLabels {
            metric: metric.to_string(),
            expected: self.names.join(","),
            got: labels.iter().map(|(k, _)| *k).collect::<Vec<_>>().join(","),
        };

        if labels.len() != self.names.len() {
            return Err(mismatch());
        }
        let mut values = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let mut hits = labels.iter().filter(|(k, _)| *k == name.as_str());
            match (hits.next(), hits.next()) {
                (Some((_, v)), None) => values.push(v.to_string()),
                _ => return Err(mismatch()),
            }
        }
        Ok(values)
    }

    /// Zip a child key back into `(name, value)` pairs.
    pub(crate) fn pairs(&self, values: &[String]) -> Vec<(String, String)> {
        self.names
            .iter()
            .cloned()
            .zip(values.iter().cloned())
            .collect()
    }
}
