//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use super::{InstrumentSnapshot, Sample, SnapshotValue};

/// Content type advertised on `/metrics`.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// HELP text escapes backslash and newline only.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// `{k="v",...}`, or nothing when there are no labels.
fn label_block(labels: &[(String, String)], le: Option<&str>) -> String {
    let mut parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some(le) = le {
        parts.push(format!("le=\"{le}\""));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

fn render_samples(name: &str, samples: &[Sample], out: &mut String) {
    for s in samples {
        let _ = writeln!(out, "{}{} {}", name, label_block(&s.labels, None), fmt_value(s.value));
    }
}

/// Encode a registry snapshot. Deterministic for a given snapshot.
pub fn encode(snapshots: &[InstrumentSnapshot]) -> String {
    let mut out = String::new();
    for snap in snapshots {
        let name = &snap.name;
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&snap.help));
        let _ = writeln!(out, "# TYPE {} {}", name, snap.kind().as_str());
        match &snap.value {
            SnapshotValue::Counter(samples) | SnapshotValue::Gauge(samples) => {
                render_samples(name, samples, &mut out);
            }
            SnapshotValue::Histogram(h) => {
                for (bound, count) in &h.buckets {
                    let le = fmt_value(*bound);
                    let _ = writeln!(out, "{}_bucket{} {}", name, label_block(&[], Some(le.as_str())), count);
                }
                let _ = writeln!(out, "{}_bucket{} {}", name, label_block(&[], Some("+Inf")), h.count);
                let _ = writeln!(out, "{}_sum {}", name, fmt_value(h.sum));
                let _ = writeln!(out, "{}_count {}", name, h.count);
            }
        }
    }
    out
}
