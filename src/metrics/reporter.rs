//! Metrics reporter - output formatting
//!
//! Supports three renderings of an [`AggregateReport`]:
//! - Text (human-readable, ab-style)
//! - Short (one line: concurrency, rps, success rate)
//! - JSON

use std::fmt::Write;

use super::aggregate::AggregateReport;
use crate::config::{BenchmarkConfig, OutputFormat};
use crate::utils::Result;

/// Metrics reporter
#[derive(Debug, Clone)]
pub struct MetricsReporter {
    format: OutputFormat,
    short: bool,
    verbose: bool,
    histogram: bool,
}

impl MetricsReporter {
    /// Create new reporter with specified format
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            short: false,
            verbose: false,
            histogram: false,
        }
    }

    /// Reporter configured from the run's output flags
    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self {
            format: config.format,
            short: config.short,
            verbose: config.verbose > 0,
            histogram: config.histogram,
        }
    }

    /// Render the report as it would be printed
    pub fn render(&self, report: &AggregateReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Text if self.short => Ok(render_short(report)),
            OutputFormat::Text => Ok(self.render_text(report)),
        }
    }

    /// Report to stdout
    pub fn report(&self, report: &AggregateReport) -> Result<()> {
        println!("{}", self.render(report)?);
        Ok(())
    }

    fn render_text(&self, report: &AggregateReport) -> String {
        let mut out = String::new();

        if self.verbose {
            for w in &report.workers {
                let _ = writeln!(
                    out,
                    "Worker {}: {} req, {} req/sec, {:.3} sec",
                    w.worker_id,
                    w.count,
                    fmt_opt(w.requests_per_second, 2),
                    w.elapsed_secs
                );
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "Concurrency Level: {}", report.concurrency);
        let _ = writeln!(out, "Total Requests: {}", report.total_count);
        let _ = writeln!(out, "Success Requests: {}", report.total_success);
        let _ = writeln!(out, "Success Rate: {}", fmt_percent(report.success_rate));
        let _ = writeln!(
            out,
            "Time taken for tests: {:.3} seconds",
            report.time_taken_secs
        );
        let _ = writeln!(
            out,
            "Requests per second: {} [#/sec] (mean)",
            fmt_opt(report.requests_per_second, 2)
        );
        let _ = writeln!(
            out,
            "Time per request: {} [ms] (mean)",
            fmt_opt(report.time_per_request_ms, 3)
        );
        let _ = write!(
            out,
            "Time per request: {} [ms] (mean, across all concurrent requests)",
            fmt_opt(report.time_per_request_all_ms, 3)
        );

        if self.histogram {
            let _ = writeln!(out, "\n\nLatency (ms):");
            match &report.latency {
                Some(l) => {
                    let _ = writeln!(out, "  avg: {:.3}", l.mean_ms);
                    let _ = writeln!(out, "  p50: {:.3}", l.p50_ms);
                    let _ = writeln!(out, "  p90: {:.3}", l.p90_ms);
                    let _ = writeln!(out, "  p95: {:.3}", l.p95_ms);
                    let _ = writeln!(out, "  p99: {:.3}", l.p99_ms);
                    let _ = writeln!(out, "  p99.9: {:.3}", l.p999_ms);
                    let _ = write!(out, "  max: {:.3}", l.max_ms);
                }
                None => {
                    let _ = write!(out, "  n/a");
                }
            }
        }

        out
    }
}

fn render_short(report: &AggregateReport) -> String {
    format!(
        "{} {} {}",
        report.concurrency,
        fmt_opt(report.requests_per_second, 2),
        fmt_percent(report.success_rate)
    )
}

/// Fixed-precision number, or `n/a`
fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

/// Percentage truncated to an integer, or `n/a`
fn fmt_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", v as u64),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::WorkerResult;
    use std::time::{Duration, Instant};

    fn sample_report() -> AggregateReport {
        let start = Instant::now();
        let results: Vec<WorkerResult> = (0..2)
            .map(|id| {
                let mut r = WorkerResult::new(id);
                r.count = 5;
                r.success = if id == 0 { 5 } else { 3 };
                r.elapsed_secs = 1.0;
                r.start_time = Some(start);
                r.end_time = Some(start + Duration::from_secs(1));
                r.completed = true;
                r.histogram.record(1500).unwrap();
                r
            })
            .collect();
        AggregateReport::from_results(&results, 2)
    }

    #[test]
    fn test_text_report() {
        let text = MetricsReporter::new(OutputFormat::Text)
            .render(&sample_report())
            .unwrap();

        assert!(text.starts_with("Concurrency Level: 2\n"));
        assert!(text.contains("Total Requests: 10\n"));
        assert!(text.contains("Success Requests: 8\n"));
        assert!(text.contains("Success Rate: 80%\n"));
        assert!(text.contains("Time taken for tests: 1.000 seconds\n"));
        assert!(text.contains("Requests per second: 10.00 [#/sec] (mean)\n"));
        assert!(text.contains("Time per request: 200.000 [ms] (mean)\n"));
        assert!(text.ends_with("Time per request: 100.000 [ms] (mean, across all concurrent requests)"));
        assert!(!text.contains("Worker 0"));
    }

    #[test]
    fn test_verbose_lists_workers_first() {
        let mut reporter = MetricsReporter::new(OutputFormat::Text);
        reporter.verbose = true;
        let text = reporter.render(&sample_report()).unwrap();

        assert!(text.starts_with("Worker 0: 5 req, 5.00 req/sec, 1.000 sec\n"));
        assert!(text.contains("Worker 1: 5 req, 5.00 req/sec, 1.000 sec\n"));
    }

    #[test]
    fn test_short_report() {
        let mut reporter = MetricsReporter::new(OutputFormat::Text);
        reporter.short = true;
        assert_eq!(reporter.render(&sample_report()).unwrap(), "2 10.00 80%");
    }

    #[test]
    fn test_no_data_renders_na() {
        let report = AggregateReport::from_results(&[], 3);
        let text = MetricsReporter::new(OutputFormat::Text)
            .render(&report)
            .unwrap();

        assert!(text.contains("Total Requests: 0\n"));
        assert!(text.contains("Success Rate: n/a\n"));
        assert!(text.contains("Requests per second: n/a [#/sec] (mean)\n"));
    }

    #[test]
    fn test_histogram_block() {
        let mut reporter = MetricsReporter::new(OutputFormat::Text);
        reporter.histogram = true;
        let text = reporter.render(&sample_report()).unwrap();

        assert!(text.contains("\n\nLatency (ms):\n"));
        assert!(text.contains("  p99: 1.500\n"));
    }

    #[test]
    fn test_json_report() {
        let json = MetricsReporter::new(OutputFormat::Json)
            .render(&sample_report())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_count"], 10);
        assert_eq!(value["success_rate"], 80.0);
        assert_eq!(value["workers"].as_array().unwrap().len(), 2);

        let empty = MetricsReporter::new(OutputFormat::Json)
            .render(&AggregateReport::from_results(&[], 1))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&empty).unwrap();
        assert!(value["requests_per_second"].is_null());
    }
}
