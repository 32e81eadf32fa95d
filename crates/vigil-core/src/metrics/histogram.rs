use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::{Result, VigilError};

use super::atomic::AtomicF64;
use super::labels::validate_metric_name;
use super::HistogramSample;

/// Default latency buckets, in seconds.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Cumulative bucketed distribution with running sum and count.
///
/// Each bucket counter holds the number of observations `<= bound`, so the
/// stored values are already cumulative. The `+Inf` bucket is `count`.
#[derive(Debug)]
pub struct Histogram {
    name: String,
    help: String,
    bounds: Vec<f64>,
    buckets: Vec<AtomicU64>,
    count: AtomicU64,
    sum: AtomicF64,
}

impl Histogram {
    /// `bounds` must be finite and strictly increasing; a trailing `+Inf`
    /// is accepted and dropped since that bucket is always implied.
    pub(crate) fn new(name: &str, help: &str, bounds: &[f64]) -> Result<Self> {
        validate_metric_name(name)?;
        let mut bounds = bounds.to_vec();
        if bounds.last() == Some(&f64::INFINITY) {
            bounds.pop();
        }
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(VigilError::InvalidArgument(format!(
                "histogram {name} bucket bounds must be finite"
            )));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(VigilError::InvalidArgument(format!(
                "histogram {name} bucket bounds must be strictly increasing"
            )));
        }
        let buckets = bounds.iter().map(|_| AtomicU64::new(0)).collect();
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            bounds,
            buckets,
            count: AtomicU64::new(0),
            sum: AtomicF64::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation. Negative values are allowed; NaN/Inf are not.
    pub fn observe(&self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(VigilError::InvalidArgument(format!(
                "histogram {} observation must be finite, got {value}",
                self.name
            )));
        }

        // Writers bump count first, then buckets from the highest bound down;
        // snapshot reads buckets lowest-first and count last. Under SeqCst this
        // keeps every snapshot cumulative and bounded by count.
        self.count.fetch_add(1, Ordering::SeqCst);
        for (bound, bucket) in self.bounds.iter().zip(&self.buckets).rev() {
            if value > *bound {
                break;
            }
            bucket.fetch_add(1, Ordering::SeqCst);
        }
        self.sum.add(value);
        Ok(())
    }

    /// Start a scoped timer that observes elapsed seconds once when dropped.
    pub fn start_timer(&self) -> HistogramTimer<'_> {
        HistogramTimer {
            histogram: self,
            start: Instant::now(),
            observed: false,
        }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    pub(crate) fn snapshot(&self) -> HistogramSample {
        let buckets = self
            .bounds
            .iter()
            .zip(&self.buckets)
            .map(|(b, c)| (*b, c.load(Ordering::SeqCst)))
            .collect();
        HistogramSample {
            buckets,
            count: self.count.load(Ordering::SeqCst),
            sum: self.sum.get(),
        }
    }
}

/// Observes wall-clock time into a histogram exactly once.
///
/// Dropping the guard (normal return, `?`, or unwinding) records the elapsed
/// seconds; [`HistogramTimer::observe_duration`] records early instead.
#[must_use = "dropping the timer immediately records a near-zero duration"]
pub struct HistogramTimer<'a> {
    histogram: &'a Histogram,
    start: Instant,
    observed: bool,
}

impl HistogramTimer<'_> {
    /// Stop now and return the recorded duration in seconds.
    pub fn observe_duration(mut self) -> f64 {
        self.record()
    }

    fn record(&mut self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        if !self.observed {
            self.observed = true;
            // elapsed is always finite
            let _ = self.histogram.observe(elapsed);
        }
        elapsed
    }
}

impl Drop for HistogramTimer<'_> {
    fn drop(&mut self) {
        if !self.observed {
            self.record();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn counts(h: &Histogram) -> Vec<u64> {
        h.snapshot().buckets.iter().map(|(_, c)| *c).collect()
    }

    #[test]
    fn observations_fill_cumulative_buckets() {
        let h = Histogram::new("latency", "Latency", &[0.01, 0.05, 0.1]).unwrap();
        for v in [0.02, 0.06, 0.2] {
            h.observe(v).unwrap();
        }
        assert_eq!(counts(&h), vec![0, 1, 2]);
        assert_eq!(h.count(), 3);
        assert!((h.sum() - 0.28).abs() < 1e-12);
    }

    #[test]
    fn boundary_value_lands_in_its_bucket() {
        let h = Histogram::new("h", "h", &[1.0, 2.0]).unwrap();
        h.observe(1.0).unwrap();
        assert_eq!(counts(&h), vec![1, 1]);
    }

    #[test]
    fn overflow_only_counts_in_inf() {
        let h = Histogram::new("h", "h", &[0.1]).unwrap();
        h.observe(1000.0).unwrap();
        assert_eq!(counts(&h), vec![0]);
        assert_eq!(h.count(), 1);
    }

    #[test]
    fn negative_values_are_allowed_and_non_finite_rejected() {
        let h = Histogram::new("h", "h", &[0.0, 1.0]).unwrap();
        h.observe(-3.0).unwrap();
        assert_eq!(counts(&h), vec![1, 1]);
        assert!(h.observe(f64::NAN).is_err());
        assert!(h.observe(f64::INFINITY).is_err());
        assert_eq!(h.count(), 1);
        assert_eq!(h.sum(), -3.0);
    }

    #[test]
    fn bounds_are_validated() {
        assert!(Histogram::new("h", "h", &[0.1, 0.1]).is_err());
        assert!(Histogram::new("h", "h", &[0.5, 0.1]).is_err());
        assert!(Histogram::new("h", "h", &[f64::NAN]).is_err());
        let h = Histogram::new("h", "h", &[0.1, f64::INFINITY]).unwrap();
        assert_eq!(h.bounds(), &[0.1]);
        assert!(Histogram::new("h", "h", &[]).is_ok());
    }

    #[test]
    fn timer_observes_once_on_drop() {
        let h = Histogram::new("h", "h", &DEFAULT_BUCKETS).unwrap();
        {
            let _t = h.start_timer();
        }
        assert_eq!(h.count(), 1);

        let t = h.start_timer();
        let secs = t.observe_duration();
        assert!(secs >= 0.0);
        assert_eq!(h.count(), 2);
    }

    #[test]
    fn timer_observes_on_error_path() {
        fn failing(h: &Histogram) -> Result<()> {
            let _t = h.start_timer();
            Err(VigilError::Backend("boom".into()))
        }
        let h = Histogram::new("h", "h", &DEFAULT_BUCKETS).unwrap();
        assert!(failing(&h).is_err());
        assert_eq!(h.count(), 1);
    }

    #[test]
    fn timer_observes_on_panic() {
        let h = Histogram::new("h", "h", &DEFAULT_BUCKETS).unwrap();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _t = h.start_timer();
            panic!("handler blew up");
        }));
        assert!(res.is_err());
        assert_eq!(h.count(), 1);
    }

    #[test]
    fn concurrent_snapshots_stay_cumulative() {
        let h = Arc::new(Histogram::new("h", "h", &[1.0, 2.0, 3.0]).unwrap());
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let h = Arc::clone(&h);
                std::thread::spawn(move || {
                    for n in 0..2000 {
                        h.observe(((n + i) % 5) as f64).unwrap();
                    }
                })
            })
            .collect();
        for _ in 0..200 {
            let s = h.snapshot();
            let mut prev = 0;
            for (_, c) in &s.buckets {
                assert!(*c >= prev);
                prev = *c;
            }
            assert!(prev <= s.count);
        }
        for w in writers {
            w.join().unwrap();
        }
        assert_eq!(h.count(), 8000);
    }
}
