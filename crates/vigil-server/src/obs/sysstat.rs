//! Host CPU and memory utilisation read from procfs.
//!
//! CPU percent is computed between consecutive samples, so the first call
//! after startup reports 0. Hosts without `/proc` report 0 for both.

use std::fs;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CpuTimes {
    busy: u64,
    total: u64,
}

/// Parse the aggregate `cpu` line of `/proc/stat`.
fn parse_cpu_times(stat: &str) -> Option<CpuTimes> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().ok())
        .collect::<Option<_>>()?;
    if fields.len() < 4 {
        return None;
    }
    // user nice system idle iowait irq softirq steal [guest guest_nice]
    let total: u64 = fields.iter().take(8).sum();
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    Some(CpuTimes {
        busy: total.saturating_sub(idle),
        total,
    })
}

/// Used memory as a percentage of `MemTotal`, from `/proc/meminfo`.
fn parse_memory_percent(meminfo: &str) -> Option<f64> {
    let field = |name: &str| -> Option<u64> {
        meminfo
            .lines()
            .find(|l| l.starts_with(name))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(available) as f64 * 100.0 / total as f64)
}

fn cpu_percent_between(prev: CpuTimes, now: CpuTimes) -> f64 {
    let total = now.total.saturating_sub(prev.total);
    if total == 0 {
        return 0.0;
    }
    let busy = now.busy.saturating_sub(prev.busy);
    (busy as f64 * 100.0 / total as f64).clamp(0.0, 100.0)
}

#[derive(Default)]
pub struct SystemSampler {
    last_cpu: Mutex<Option<CpuTimes>>,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU utilisation since the previous call, in percent.
    pub fn cpu_percent(&self) -> f64 {
        let Some(now) = fs::read_to_string("/proc/stat")
            .ok()
            .and_then(|s| parse_cpu_times(&s))
        else {
            return 0.0;
        };
        // Poisoned mutex means a prior sampler panicked; report 0 rather than propagate.
        let Ok(mut last) = self.last_cpu.lock() else {
            return 0.0;
        };
        let pct = last.map(|prev| cpu_percent_between(prev, now)).unwrap_or(0.0);
        *last = Some(now);
        pct
    }

    pub fn memory_percent(&self) -> f64 {
        fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|s| parse_memory_percent(&s))
            .unwrap_or(0.0)
    }
}
