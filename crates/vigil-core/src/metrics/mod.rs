//! In-process metrics: counters, gauges, histograms and their registry.
//!
//! Instruments are plain atomics; label-partitioned counters keep their
//! children in a `DashMap` so first use of a label combination creates
//! exactly one child. The registry is built once at startup and shared by
//! `Arc`; `/metrics` renders its snapshot with [`encode`].

mod atomic;
pub mod counter;
pub mod encode;
pub mod gauge;
pub mod histogram;
mod labels;
pub mod registry;

pub use counter::Counter;
pub use encode::{encode, CONTENT_TYPE};
pub use gauge::Gauge;
pub use histogram::{Histogram, HistogramTimer, DEFAULT_BUCKETS};
pub use registry::{Instrument, InstrumentConfig, Registry};

/// Instrument variant, as written on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// One labeled value of a counter or gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// `(name, value)` pairs sorted by label name.
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

/// Point-in-time state of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSample {
    /// `(upper_bound, cumulative_count)` for every finite bound, ascending.
    pub buckets: Vec<(f64, u64)>,
    /// Total observations; also the `+Inf` bucket.
    pub count: u64,
    pub sum: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotValue {
    Counter(Vec<Sample>),
    Gauge(Vec<Sample>),
    Histogram(HistogramSample),
}

/// Snapshot of a single instrument, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSnapshot {
    pub name: String,
    pub help: String,
    pub value: SnapshotValue,
}

impl InstrumentSnapshot {
    pub fn kind(&self) -> MetricKind {
        match self.value {
            SnapshotValue::Counter(_) => MetricKind::Counter,
            SnapshotValue::Gauge(_) => MetricKind::Gauge,
            SnapshotValue::Histogram(_) => MetricKind::Histogram,
        }
    }
}
