use dashmap::DashMap;

use crate::error::{Result, VigilError};

use super::atomic::AtomicF64;
use super::labels::{validate_metric_name, LabelNames};
use super::Sample;

/// Monotonic counter, optionally partitioned by a fixed set of label names.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    labels: LabelNames,
    children: DashMap<Vec<String>, AtomicF64>,
}

impl Counter {
    pub(crate) fn new(name: &str, help: &str, label_names: &[&str]) -> Result<Self> {
        validate_metric_name(name)?;
        let labels = LabelNames::new(label_names)?;
        let children = DashMap::new();
        // Unlabeled counters are exported as 0 before the first increment.
        if labels.is_empty() {
            children.insert(Vec::new(), AtomicF64::default());
        }
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            labels,
            children,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) -> Result<()> {
        self.inc_by(1.0, labels)
    }

    /// Increment by a non-negative, finite amount.
    pub fn inc_by(&self, amount: f64, labels: &[(&str, &str)]) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(VigilError::InvalidArgument(format!(
                "counter {} increment must be finite and >= 0, got {amount}",
                self.name
            )));
        }
        let key = self.labels.key(&self.name, labels)?;

        // Fast path: existing child under a shard read lock.
        if let Some(child) = self.children.get(&key) {
            child.add(amount);
            return Ok(());
        }
        self.children
            .entry(key)
            .or_insert_with(AtomicF64::default)
            .add(amount);
        Ok(())
    }

    /// Current value for a label combination; 0 if never incremented.
    pub fn value(&self, labels: &[(&str, &str)]) -> Result<f64> {
        let key = self.labels.key(&self.name, labels)?;
        Ok(self.children.get(&key).map(|c| c.get()).unwrap_or(0.0))
    }

    /// Number of distinct label combinations seen so far.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Children sorted by label values so encoding is deterministic.
    pub(crate) fn snapshot(&self) -> Vec<Sample> {
        let mut rows: Vec<(Vec<String>, f64)> = self
            .children
            .iter()
            .map(|r| (r.key().clone(), r.value().get()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.into_iter()
            .map(|(key, value)| Sample {
                labels: self.labels.pairs(&key),
                value,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn unlabeled_counter_starts_at_zero() {
        let c = Counter::new("requests_total", "Requests", &[]).unwrap();
        assert_eq!(c.value(&[]).unwrap(), 0.0);
        assert_eq!(c.snapshot().len(), 1);
        c.inc(&[]).unwrap();
        c.inc_by(2.5, &[]).unwrap();
        assert_eq!(c.value(&[]).unwrap(), 3.5);
    }

    #[test]
    fn rejects_negative_and_non_finite_amounts() {
        let c = Counter::new("c_total", "c", &[]).unwrap();
        assert!(matches!(c.inc_by(-1.0, &[]), Err(VigilError::InvalidArgument(_))));
        assert!(c.inc_by(f64::NAN, &[]).is_err());
        assert!(c.inc_by(f64::INFINITY, &[]).is_err());
        assert_eq!(c.value(&[]).unwrap(), 0.0);
    }

    #[test]
    fn labeled_children_are_independent_and_lazy() {
        let c = Counter::new("class_total", "Classes", &["pred_class"]).unwrap();
        assert_eq!(c.child_count(), 0);
        assert_eq!(c.value(&[("pred_class", "0")]).unwrap(), 0.0);
        assert_eq!(c.child_count(), 0, "value() must not create children");

        c.inc(&[("pred_class", "0")]).unwrap();
        c.inc(&[("pred_class", "1")]).unwrap();
        c.inc(&[("pred_class", "1")]).unwrap();
        assert_eq!(c.value(&[("pred_class", "0")]).unwrap(), 1.0);
        assert_eq!(c.value(&[("pred_class", "1")]).unwrap(), 2.0);
        assert_eq!(c.child_count(), 2);
    }

    #[test]
    fn wrong_labels_are_rejected() {
        let c = Counter::new("class_total", "Classes", &["pred_class"]).unwrap();
        let err = c.inc(&[("class", "0")]).unwrap_err();
        assert!(matches!(err, VigilError::InvalidLabels { .. }));
        assert!(c.inc(&[]).is_err());
        assert_eq!(c.child_count(), 0);
    }

    #[test]
    fn concurrent_first_use_creates_one_child() {
        let c = Arc::new(Counter::new("race_total", "race", &["k"]).unwrap());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || c.inc_by(i as f64, &[("k", "same")]).unwrap())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.child_count(), 1);
        assert_eq!(c.value(&[("k", "same")]).unwrap(), (0..16).sum::<i32>() as f64);
    }

    #[test]
    fn snapshot_is_sorted_by_label_values() {
        let c = Counter::new("class_total", "Classes", &["pred_class"]).unwrap();
        for v in ["2", "0", "1"] {
            c.inc(&[("pred_class", v)]).unwrap();
        }
        let values: Vec<_> = c
            .snapshot()
            .into_iter()
            .map(|s| s.labels[0].1.clone())
            .collect();
        assert_eq!(values, vec!["0", "1", "2"]);
    }
}
