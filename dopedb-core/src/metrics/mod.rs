//! Metrics collection for observability
//!
//! Counters go through the `metrics` facade; whichever recorder the binary
//! installs (Prometheus by default) picks them up. Without a recorder the
//! calls are no-ops.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Instant;

mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot, RequestOutcome};

/// Initialize metrics with descriptions
pub fn init_metrics() {
    // Store metrics
    describe_counter!("store.operations.read", "Store read operations");
    describe_counter!("store.operations.write", "Store insert operations");
    describe_counter!("store.operations.delete", "Store delete operations");
    describe_counter!("store.operations.namespace", "Namespace create requests");
    describe_counter!("store.namespaces.created", "Namespaces actually created, ancestors included");
    describe_gauge!("store.entries", "Number of entries across all namespaces");
    describe_gauge!("store.namespaces", "Number of namespaces, root included");

    // HTTP metrics
    describe_counter!("http.requests.total", "Total API requests");
    describe_counter!("http.requests.not_found", "API requests answered with not-found");
    describe_counter!("http.requests.failed", "API requests answered with a failure");
    describe_histogram!("http.request.duration_ms", "API request duration in milliseconds");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Record a gauge metric
pub fn record_gauge(name: &'static str, value: f64) {
    gauge!(name).set(value);
}

/// Record a histogram metric
pub fn record_histogram(name: &'static str, value: f64) {
    histogram!(name).record(value);
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    /// Create a new timer
    pub fn new(name: &'static str) -> Self {
        Self { name, start: Instant::now() }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let duration = self.start.elapsed();
        record_histogram(self.name, duration.as_secs_f64() * 1000.0);
    }
}
