//! Metrics aggregation and reporting
//!
//! This module provides:
//! - Cross-worker aggregation over completed workers
//! - Latency histogram summaries
//! - Text, short and JSON output

pub mod aggregate;
pub mod reporter;

pub use aggregate::{ratio, AggregateReport, LatencySummary, WorkerSummary};
pub use reporter::MetricsReporter;

use hdrhistogram::Histogram;

/// Latency histogram in microseconds, 1us to 1h, 3 significant digits
pub fn new_latency_histogram() -> Histogram<u64> {
    Histogram::new_with_bounds(1, 3_600_000_000, 3).expect("Failed to create histogram")
}
