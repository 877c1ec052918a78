//! Cross-worker aggregation
//!
//! Only workers whose loop completed contribute. Every ratio is `None`
//! when its denominator is zero.

use hdrhistogram::Histogram;
use serde::Serialize;

use super::new_latency_histogram;
use crate::benchmark::WorkerResult;

/// Summary of one completed worker
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSummary {
    pub worker_id: usize,
    pub count: u64,
    pub success: u64,
    pub elapsed_secs: f64,
    pub requests_per_second: Option<f64>,
}

/// Latency distribution in milliseconds
#[derive(Debug, Clone, Serialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub p999_ms: f64,
    pub max_ms: f64,
}

impl LatencySummary {
    /// `None` for an empty histogram
    pub fn from_histogram(hist: &Histogram<u64>) -> Option<Self> {
        if hist.is_empty() {
            return None;
        }
        let ms = |us: u64| us as f64 / 1000.0;
        Some(Self {
            samples: hist.len(),
            mean_ms: hist.mean() / 1000.0,
            p50_ms: ms(hist.value_at_percentile(50.0)),
            p90_ms: ms(hist.value_at_percentile(90.0)),
            p95_ms: ms(hist.value_at_percentile(95.0)),
            p99_ms: ms(hist.value_at_percentile(99.0)),
            p999_ms: ms(hist.value_at_percentile(99.9)),
            max_ms: ms(hist.max()),
        })
    }
}

/// Aggregate statistics for one run
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    /// Configured concurrency
    pub concurrency: usize,
    pub workers_completed: usize,
    pub total_count: u64,
    pub total_success: u64,
    /// Sum of every completed worker's loop time
    pub total_elapsed_secs: f64,
    /// `total_elapsed / concurrency`, dividing by the configured
    /// concurrency even when some workers did not complete
    pub avg_elapsed_secs: Option<f64>,
    pub requests_per_second: Option<f64>,
    /// Percent, 0..=100
    pub success_rate: Option<f64>,
    /// Wall clock from the first worker start to the last worker end
    pub time_taken_secs: f64,
    /// `concurrency * time_taken / total_count`, in ms
    pub time_per_request_ms: Option<f64>,
    /// `time_taken / total_count`, in ms
    pub time_per_request_all_ms: Option<f64>,
    pub latency: Option<LatencySummary>,
    pub workers: Vec<WorkerSummary>,
}

impl AggregateReport {
    /// Aggregate the completed subset of `results`
    pub fn from_results(results: &[WorkerResult], concurrency: usize) -> Self {
        let completed: Vec<&WorkerResult> = results.iter().filter(|r| r.completed).collect();

        let total_count: u64 = completed.iter().map(|r| r.count).sum();
        let total_success: u64 = completed.iter().map(|r| r.success).sum();
        let total_elapsed_secs: f64 = completed.iter().map(|r| r.elapsed_secs).sum();

        let avg_elapsed_secs = ratio(total_elapsed_secs, concurrency as f64);
        let (requests_per_second, success_rate) = if total_count == 0 {
            (None, None)
        } else {
            (
                avg_elapsed_secs.and_then(|avg| ratio(total_count as f64, avg)),
                ratio(total_success as f64 * 100.0, total_count as f64),
            )
        };

        let first_start = completed.iter().filter_map(|r| r.start_time).min();
        let last_end = completed.iter().filter_map(|r| r.end_time).max();
        let time_taken_secs = match (first_start, last_end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_secs_f64(),
            _ => 0.0,
        };
        let time_taken_ms = time_taken_secs * 1000.0;

        let mut merged = new_latency_histogram();
        for r in &completed {
            // Same bounds everywhere, so add cannot fail
            merged.add(&r.histogram).ok();
        }

        Self {
            concurrency,
            workers_completed: completed.len(),
            total_count,
            total_success,
            total_elapsed_secs,
            avg_elapsed_secs,
            requests_per_second,
            success_rate,
            time_taken_secs,
            time_per_request_ms: ratio(concurrency as f64 * time_taken_ms, total_count as f64),
            time_per_request_all_ms: ratio(time_taken_ms, total_count as f64),
            latency: LatencySummary::from_histogram(&merged),
            workers: completed
                .iter()
                .map(|r| WorkerSummary {
                    worker_id: r.worker_id,
                    count: r.count,
                    success: r.success,
                    elapsed_secs: r.elapsed_secs,
                    requests_per_second: r.requests_per_second(),
                })
                .collect(),
        }
    }

    /// Whether any request was counted
    pub fn has_data(&self) -> bool {
        self.total_count > 0
    }
}

/// `num / den`, or `None` when `den` is not positive
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}
