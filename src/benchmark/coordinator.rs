//! Benchmark coordinator
//!
//! Spawns the worker pool, installs cancellation triggers, blocks on every
//! worker thread and hands the completed results to the reporter.

use std::sync::Arc;

use tracing::{error, info};

use super::cancellation::CancellationSignal;
use super::triggers::SignalTriggers;
use super::worker::{StartGate, Worker, WorkerHandle, WorkerResult};
use crate::config::BenchmarkConfig;
use crate::jobs::JobStrategy;
use crate::metrics::{AggregateReport, MetricsReporter};
use crate::utils::Result;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Interrupted; no report was produced
    Aborted,
    /// Finished by exhaustion or timeout
    Completed(AggregateReport),
}

/// Benchmark coordinator
pub struct Coordinator {
    config: Arc<BenchmarkConfig>,
    signal: Arc<CancellationSignal>,
    os_signals: bool,
}

impl Coordinator {
    /// Coordinator for a process-level run, listening for SIGINT/SIGALRM
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config: Arc::new(config),
            signal: Arc::new(CancellationSignal::new()),
            os_signals: true,
        }
    }

    /// Coordinator driven by a caller-owned signal, without OS handlers.
    /// The time limit, if configured, still applies.
    pub fn with_signal(config: BenchmarkConfig, signal: Arc<CancellationSignal>) -> Self {
        Self {
            config: Arc::new(config),
            signal,
            os_signals: false,
        }
    }

    pub fn signal(&self) -> Arc<CancellationSignal> {
        Arc::clone(&self.signal)
    }

    /// Spawn one worker per concurrency slot and wait for all of them.
    ///
    /// Installs no triggers and prints nothing. Results are ordered by
    /// worker id.
    pub fn execute<J, F>(&self, mut make_job: F) -> Vec<WorkerResult>
    where
        J: JobStrategy,
        F: FnMut(usize) -> J,
    {
        let concurrency = self.config.concurrency;
        let gate = Arc::new(StartGate::new(concurrency));
        let mut handles: Vec<WorkerHandle> = Vec::with_capacity(concurrency);
        let mut results = Vec::with_capacity(concurrency);

        for worker_id in 0..concurrency {
            let worker = Worker::new(
                Arc::clone(&self.config),
                worker_id,
                make_job(worker_id),
                Arc::clone(&self.signal),
            )
            .with_start_gate(Arc::clone(&gate));

            match worker.start() {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!("Worker {}: failed to spawn: {}", worker_id, e);
                    gate.withdraw();
                    results.push(WorkerResult::failed(worker_id, e.to_string()));
                }
            }
        }
        info!("Started {} of {} workers", handles.len(), concurrency);

        results.extend(handles.into_iter().map(WorkerHandle::join));
        results.sort_by_key(|r| r.worker_id);
        results
    }

    /// Run the benchmark to completion and print the outcome
    pub fn run<J, F>(&self, make_job: F) -> Result<RunOutcome>
    where
        J: JobStrategy,
        F: FnMut(usize) -> J,
    {
        let triggers = SignalTriggers::install(
            Arc::clone(&self.signal),
            self.os_signals,
            self.config.time_limit,
        )?;
        let results = self.execute(make_job);
        drop(triggers);

        let outcome = self.summarize(&results);
        match &outcome {
            RunOutcome::Aborted => println!("Aborted."),
            RunOutcome::Completed(report) => {
                MetricsReporter::from_config(&self.config).report(report)?;
            }
        }
        Ok(outcome)
    }

    /// Turn joined results into an outcome without printing
    pub fn summarize(&self, results: &[WorkerResult]) -> RunOutcome {
        if self.signal.is_aborted() {
            info!("Run aborted");
            return RunOutcome::Aborted;
        }

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        if failed > 0 {
            info!("{} of {} workers failed", failed, results.len());
        }
        RunOutcome::Completed(AggregateReport::from_results(
            results,
            self.config.concurrency,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::cancellation::Cancellation;
    #[cfg(unix)]
    use crate::benchmark::triggers;
    use crate::client::ConnectionFactory;
    use crate::utils::BenchmarkError;
    use std::thread;
    use std::time::Duration;

    /// Fixed outcome for every request
    struct FixedJob {
        outcome: bool,
    }

    impl JobStrategy for FixedJob {
        type Connection = ();

        fn setup(&mut self, _factory: &ConnectionFactory) -> Result<()> {
            Ok(())
        }

        fn request(&mut self, _conn: &mut ()) -> Result<bool> {
            Ok(self.outcome)
        }
    }

    /// Worker 0 cannot connect; others always succeed
    struct FirstWorkerBroken {
        worker_id: usize,
    }

    impl JobStrategy for FirstWorkerBroken {
        type Connection = ();

        fn setup(&mut self, _factory: &ConnectionFactory) -> Result<()> {
            if self.worker_id == 0 {
                Err(BenchmarkError::Worker("bind refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn request(&mut self, _conn: &mut ()) -> Result<bool> {
            Ok(true)
        }
    }

    struct SlowJob;

    impl JobStrategy for SlowJob {
        type Connection = ();

        fn setup(&mut self, _factory: &ConnectionFactory) -> Result<()> {
            Ok(())
        }

        fn request(&mut self, _conn: &mut ()) -> Result<bool> {
            thread::sleep(Duration::from_millis(5));
            Ok(true)
        }
    }

    /// Delivers SIGALRM to the process on its `k`th request
    #[cfg(unix)]
    struct AlarmJob {
        k: u64,
        calls: u64,
        signal: Arc<CancellationSignal>,
    }

    #[cfg(unix)]
    impl JobStrategy for AlarmJob {
        type Connection = ();

        fn setup(&mut self, _factory: &ConnectionFactory) -> Result<()> {
            Ok(())
        }

        fn request(&mut self, _conn: &mut ()) -> Result<bool> {
            self.calls += 1;
            if self.calls == self.k {
                triggers::tests::raise("ALRM");
                assert!(triggers::tests::wait_for(|| self.signal.is_timed_out()));
            }
            Ok(true)
        }
    }

    fn coordinator(requests: u64, concurrency: usize) -> Coordinator {
        Coordinator::with_signal(
            BenchmarkConfig::new("ldap://localhost/", requests, concurrency),
            Arc::new(CancellationSignal::new()),
        )
    }

    fn completed_report(outcome: RunOutcome) -> AggregateReport {
        match outcome {
            RunOutcome::Completed(report) => report,
            RunOutcome::Aborted => panic!("run was aborted"),
        }
    }

    #[test]
    fn test_all_succeed() {
        let coord = coordinator(10, 2);
        let results = coord.execute(|_| FixedJob { outcome: true });

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].worker_id, 0);
        assert_eq!(results[1].worker_id, 1);

        let report = completed_report(coord.summarize(&results));
        assert_eq!(report.total_count, 10);
        assert_eq!(report.total_success, 10);
        assert_eq!(report.success_rate, Some(100.0));
    }

    #[test]
    fn test_all_fail() {
        let coord = coordinator(1, 1);
        let results = coord.execute(|_| FixedJob { outcome: false });

        let report = completed_report(coord.summarize(&results));
        assert_eq!(report.total_count, 1);
        assert_eq!(report.total_success, 0);
        assert_eq!(report.success_rate, Some(0.0));
    }

    #[test]
    fn test_one_worker_fails_setup() {
        let coord = coordinator(10, 2);
        let results = coord.execute(|worker_id| FirstWorkerBroken { worker_id });

        assert!(!results[0].completed);
        assert!(results[0].error.is_some());
        assert!(results[1].completed);

        let report = completed_report(coord.summarize(&results));
        assert_eq!(report.workers_completed, 1);
        assert_eq!(report.total_count, 5);
        assert_eq!(report.total_success, 5);
    }

    #[test]
    fn test_abort_before_start() {
        let coord = coordinator(10, 4);
        coord.signal().set(Cancellation::Abort);

        let results = coord.execute(|_| FixedJob { outcome: true });
        assert!(results.iter().all(|r| !r.completed));
        assert!(matches!(coord.summarize(&results), RunOutcome::Aborted));
    }

    #[test]
    fn test_run_reports_aborted() {
        let coord = coordinator(10, 2);
        coord.signal().set(Cancellation::Abort);

        let outcome = coord.run(|_| FixedJob { outcome: true }).unwrap();
        assert!(matches!(outcome, RunOutcome::Aborted));
    }

    #[test]
    fn test_time_limit_stops_run_with_report() {
        let mut config = BenchmarkConfig::new("ldap://localhost/", 1_000_000, 2);
        config.time_limit = Some(Duration::from_millis(50));
        let coord = Coordinator::with_signal(config, Arc::new(CancellationSignal::new()));

        let report = completed_report(coord.run(|_| SlowJob).unwrap());
        assert!(coord.signal().is_timed_out());
        assert_eq!(report.workers_completed, 2);
        assert!(report.total_count > 0);
        assert!(report.total_count < 1_000_000);
        assert_eq!(report.total_count, report.total_success);
    }

    #[cfg(unix)]
    #[test]
    fn test_process_run_stops_on_alarm() {
        let _guard = triggers::tests::OS_SIGNAL_LOCK.lock();
        let coord = Coordinator::new(BenchmarkConfig::new("ldap://localhost/", 100, 1));
        let signal = coord.signal();

        let outcome = coord
            .run(|_| AlarmJob {
                k: 3,
                calls: 0,
                signal: Arc::clone(&signal),
            })
            .unwrap();

        let report = completed_report(outcome);
        assert!(signal.is_timed_out());
        assert_eq!(report.workers_completed, 1);
        assert_eq!(report.total_count, 3);
        assert_eq!(report.total_success, 3);
    }

    #[test]
    fn test_independent_runs_do_not_share_signal() {
        let first = coordinator(4, 1);
        let second = coordinator(4, 1);
        first.signal().set(Cancellation::Abort);

        let results = second.execute(|_| FixedJob { outcome: true });
        assert!(matches!(second.summarize(&results), RunOutcome::Completed(_)));
    }
}
