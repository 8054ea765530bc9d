//! In-process request counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// How a protocol request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Success,
    NotFound,
    Failed,
}

/// Request counters exposed on the health endpoint
#[derive(Debug)]
pub struct MetricsCollector {
    requests: AtomicU64,
    not_found: AtomicU64,
    failed: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Count one finished request
    pub fn record(&self, outcome: RequestOutcome) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        super::record_counter("http.requests.total", 1);
        match outcome {
            RequestOutcome::Success => {}
            RequestOutcome::NotFound => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
                super::record_counter("http.requests.not_found", 1);
            }
            RequestOutcome::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                super::record_counter("http.requests.failed", 1);
            }
        }
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics snapshot for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub not_found: u64,
    pub failed: u64,
}
