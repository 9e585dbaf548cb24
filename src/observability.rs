//! Tracing setup and dashboard cycle counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Counters recorded by the dispatcher
#[derive(Debug, Default)]
pub struct Metrics {
    cycles_run: AtomicU64,
    transport_failures: AtomicU64,
    instance_errors: AtomicU64,
    triggers_coalesced: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cycle_run(&self) {
        self.cycles_run.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cycles_run", "Metric incremented");
    }

    pub fn transport_failed(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "transport_failures", "Metric incremented");
    }

    pub fn instance_errors(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.instance_errors.fetch_add(count, Ordering::Relaxed);
        tracing::debug!(counter = "instance_errors", count, "Metric incremented");
    }

    pub fn trigger_coalesced(&self) {
        self.triggers_coalesced.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "triggers_coalesced", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_run: self.cycles_run.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            instance_errors: self.instance_errors.load(Ordering::Relaxed),
            triggers_coalesced: self.triggers_coalesced.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cycles_run: u64,
    pub transport_failures: u64,
    pub instance_errors: u64,
    pub triggers_coalesced: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.cycle_run();
        metrics.cycle_run();
        metrics.instance_errors(3);
        metrics.instance_errors(0);
        metrics.trigger_coalesced();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cycles_run, 2);
        assert_eq!(snapshot.instance_errors, 3);
        assert_eq!(snapshot.triggers_coalesced, 1);
        assert_eq!(snapshot.transport_failures, 0);
    }
}
