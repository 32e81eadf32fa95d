//! Process-wide instrument table.
//!
//! Registration is expected during single-threaded startup; lookups and
//! snapshots are safe from any task afterwards. Entries remember a
//! registration sequence number so snapshots come back in registration
//! order without holding one lock over the whole table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;

use crate::error::{Result, VigilError};

use super::counter::Counter;
use super::encode::encode;
use super::gauge::Gauge;
use super::histogram::{Histogram, DEFAULT_BUCKETS};
use super::{InstrumentSnapshot, MetricKind, SnapshotValue};

/// Shared handle to a registered instrument.
#[derive(Debug, Clone)]
pub enum Instrument {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    Histogram(Arc<Histogram>),
}

impl Instrument {
    pub fn kind(&self) -> MetricKind {
        match self {
            Instrument::Counter(_) => MetricKind::Counter,
            Instrument::Gauge(_) => MetricKind::Gauge,
            Instrument::Histogram(_) => MetricKind::Histogram,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Instrument::Counter(c) => c.name(),
            Instrument::Gauge(g) => g.name(),
            Instrument::Histogram(h) => h.name(),
        }
    }

    pub fn counter(&self) -> Result<Arc<Counter>> {
        match self {
            Instrument::Counter(c) => Ok(Arc::clone(c)),
            other => Err(other.wrong_kind(MetricKind::Counter)),
        }
    }

    pub fn gauge(&self) -> Result<Arc<Gauge>> {
        match self {
            Instrument::Gauge(g) => Ok(Arc::clone(g)),
            other => Err(other.wrong_kind(MetricKind::Gauge)),
        }
    }

    pub fn histogram(&self) -> Result<Arc<Histogram>> {
        match self {
            Instrument::Histogram(h) => Ok(Arc::clone(h)),
            other => Err(other.wrong_kind(MetricKind::Histogram)),
        }
    }

    fn wrong_kind(&self, expected: MetricKind) -> VigilError {
        VigilError::WrongKind {
            name: self.name().to_string(),
            expected: expected.as_str(),
            actual: self.kind().as_str(),
        }
    }

    fn snapshot(&self) -> InstrumentSnapshot {
        let (name, help, value) = match self {
            Instrument::Counter(c) => (c.name(), c.help(), SnapshotValue::Counter(c.snapshot())),
            Instrument::Gauge(g) => (g.name(), g.help(), SnapshotValue::Gauge(g.snapshot())),
            Instrument::Histogram(h) => {
                (h.name(), h.help(), SnapshotValue::Histogram(h.snapshot()))
            }
        };
        InstrumentSnapshot {
            name: name.to_string(),
            help: help.to_string(),
            value,
        }
    }
}

/// Kind-specific registration parameters.
///
/// `label_names` applies to counters, `const_labels` to gauges and
/// `buckets` to histograms; setting a field the kind does not use is an error.
#[derive(Debug, Clone, Default)]
pub struct InstrumentConfig {
    pub label_names: Vec<String>,
    pub const_labels: Vec<(String, String)>,
    pub buckets: Option<Vec<f64>>,
}

impl InstrumentConfig {
    pub fn labels(names: &[&str]) -> Self {
        Self {
            label_names: names.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn const_labels(pairs: &[(&str, &str)]) -> Self {
        Self {
            const_labels: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn buckets(bounds: &[f64]) -> Self {
        Self {
            buckets: Some(bounds.to_vec()),
            ..Self::default()
        }
    }

    fn build(&self, name: &str, help: &str, kind: MetricKind) -> Result<Instrument> {
        let unused = |field: &str| {
            VigilError::InvalidArgument(format!("{field} is not valid for {} {name}", kind.as_str()))
        };
        match kind {
            MetricKind::Counter => {
                if !self.const_labels.is_empty() {
                    return Err(unused("const_labels"));
                }
                if self.buckets.is_some() {
                    return Err(unused("buckets"));
                }
                let names: Vec<&str> = self.label_names.iter().map(String::as_str).collect();
                Ok(Instrument::Counter(Arc::new(Counter::new(name, help, &names)?)))
            }
            MetricKind::Gauge => {
                if !self.label_names.is_empty() {
                    return Err(unused("label_names"));
                }
                if self.buckets.is_some() {
                    return Err(unused("buckets"));
                }
                Ok(Instrument::Gauge(Arc::new(Gauge::new(name, help, &self.const_labels)?)))
            }
            MetricKind::Histogram => {
                if !self.label_names.is_empty() {
                    return Err(unused("label_names"));
                }
                if !self.const_labels.is_empty() {
                    return Err(unused("const_labels"));
                }
                let bounds = self.buckets.as_deref().unwrap_or(&DEFAULT_BUCKETS);
                Ok(Instrument::Histogram(Arc::new(Histogram::new(name, help, bounds)?)))
            }
        }
    }
}

struct Entry {
    seq: u64,
    instrument: Instrument,
}

#[derive(Default)]
pub struct Registry {
    entries: DashMap<String, Entry>,
    seq: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new instrument; fails if the name is taken or the config is invalid.
    pub fn register(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        config: InstrumentConfig,
    ) -> Result<Instrument> {
        let instrument = config.build(name, help, kind)?;
        match self.entries.entry(name.to_string()) {
            MapEntry::Occupied(_) => Err(VigilError::DuplicateName(name.to_string())),
            MapEntry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(Entry {
                    seq,
                    instrument: instrument.clone(),
                });
                tracing::debug!(metric = %name, kind = kind.as_str(), "metric registered");
                Ok(instrument)
            }
        }
    }

    pub fn register_counter(&self, name: &str, help: &str) -> Result<Arc<Counter>> {
        self.register(name, help, MetricKind::Counter, InstrumentConfig::default())?
            .counter()
    }

    pub fn register_counter_vec(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Arc<Counter>> {
        self.register(name, help, MetricKind::Counter, InstrumentConfig::labels(label_names))?
            .counter()
    }

    pub fn register_gauge(&self, name: &str, help: &str) -> Result<Arc<Gauge>> {
        self.register(name, help, MetricKind::Gauge, InstrumentConfig::default())?
            .gauge()
    }

    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        buckets: &[f64],
    ) -> Result<Arc<Histogram>> {
        self.register(name, help, MetricKind::Histogram, InstrumentConfig::buckets(buckets))?
            .histogram()
    }

    pub fn get(&self, name: &str) -> Result<Instrument> {
        self.entries
            .get(name)
            .map(|e| e.instrument.clone())
            .ok_or_else(|| VigilError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot every instrument in registration order.
    pub fn snapshot(&self) -> Vec<InstrumentSnapshot> {
        let mut instruments: Vec<(u64, Instrument)> = self
            .entries
            .iter()
            .map(|e| (e.value().seq, e.value().instrument.clone()))
            .collect();
        instruments.sort_by_key(|(seq, _)| *seq);
        instruments.iter().map(|(_, i)| i.snapshot()).collect()
    }

    /// Render the current state in Prometheus text format.
    pub fn render(&self) -> String {
        encode(&self.snapshot())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let r = Registry::new();
        r.register_counter("requests_total", "Requests").unwrap();
        let err = r.register_gauge("requests_total", "again").unwrap_err();
        assert!(matches!(err, VigilError::DuplicateName(n) if n == "requests_total"));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn get_returns_shared_handle() {
        let r = Registry::new();
        let c = r.register_counter("requests_total", "Requests").unwrap();
        c.inc(&[]).unwrap();
        let again = r.get("requests_total").unwrap().counter().unwrap();
        assert_eq!(again.value(&[]).unwrap(), 1.0);
        assert!(Arc::ptr_eq(&c, &again));
    }

    #[test]
    fn get_missing_and_wrong_kind() {
        let r = Registry::new();
        assert!(matches!(r.get("nope"), Err(VigilError::NotFound(_))));
        r.register_gauge("cpu_usage_percent", "CPU").unwrap();
        let err = r.get("cpu_usage_percent").unwrap().counter().unwrap_err();
        assert!(matches!(err, VigilError::WrongKind { expected: "counter", actual: "gauge", .. }));
    }

    #[test]
    fn config_fields_must_match_kind() {
        let r = Registry::new();
        assert!(r
            .register("c", "c", MetricKind::Counter, InstrumentConfig::buckets(&[1.0]))
            .is_err());
        assert!(r
            .register("g", "g", MetricKind::Gauge, InstrumentConfig::labels(&["a"]))
            .is_err());
        assert!(r
            .register("h", "h", MetricKind::Histogram, InstrumentConfig::labels(&["a"]))
            .is_err());
        assert!(r.is_empty());
    }

    #[test]
    fn invalid_instrument_does_not_reserve_name() {
        let r = Registry::new();
        assert!(r.register_histogram("latency", "L", &[2.0, 1.0]).is_err());
        assert!(r.register_histogram("latency", "L", &[1.0, 2.0]).is_ok());
    }

    #[test]
    fn histogram_defaults_to_standard_buckets() {
        let r = Registry::new();
        let h = r
            .register("latency", "L", MetricKind::Histogram, InstrumentConfig::default())
            .unwrap()
            .histogram()
            .unwrap();
        assert_eq!(h.bounds(), &DEFAULT_BUCKETS);
    }

    #[test]
    fn snapshot_follows_registration_order() {
        let r = Registry::new();
        for name in ["zeta_total", "alpha_total", "mid_total"] {
            r.register_counter(name, "x").unwrap();
        }
        let names: Vec<_> = r.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["zeta_total", "alpha_total", "mid_total"]);
    }
}
