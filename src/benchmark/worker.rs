//! Benchmark worker thread implementation
//!
//! Each worker owns its job and connection exclusively. The only
//! synchronization points are the shared cancellation flags, checked once
//! per iteration, and the start gate every worker passes exactly once.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info};

use super::cancellation::CancellationSignal;
use crate::client::ConnectionFactory;
use crate::config::BenchmarkConfig;
use crate::jobs::JobStrategy;
use crate::metrics::new_latency_histogram;
use crate::utils::Result;

/// Result from a worker thread
///
/// Written only by its worker; read-only once the thread has exited.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    /// Worker ID
    pub worker_id: usize,
    /// Requests attempted
    pub count: u64,
    /// Requests that succeeded
    pub success: u64,
    /// Seconds spent in the request loop
    pub elapsed_secs: f64,
    /// False until the loop exits by exhaustion or timeout.
    /// Aborted and failed workers never complete.
    pub completed: bool,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    /// Request latencies in microseconds
    pub histogram: Histogram<u64>,
    /// Fatal error that stopped the worker, if any
    pub error: Option<String>,
}

impl WorkerResult {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            count: 0,
            success: 0,
            elapsed_secs: 0.0,
            completed: false,
            start_time: None,
            end_time: None,
            histogram: new_latency_histogram(),
            error: None,
        }
    }

    /// Result for a worker that never ran its loop
    pub fn failed(worker_id: usize, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::new(worker_id)
        }
    }

    /// Requests per second, `None` for a zero-length loop
    pub fn requests_per_second(&self) -> Option<f64> {
        if self.elapsed_secs > 0.0 {
            Some(self.count as f64 / self.elapsed_secs)
        } else {
            None
        }
    }

    /// Record one request latency in microseconds, clamping to the
    /// histogram bounds
    pub fn record_latency(&mut self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros.max(1));
    }

    fn finish(&mut self, start: Instant, end: Instant) {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self.elapsed_secs = end.duration_since(start).as_secs_f64();
        self.completed = true;
    }
}

/// One-shot gate that releases every worker once all have finished setup
///
/// A worker whose setup fails still arrives, so the others are never held
/// back by it. The coordinator withdraws parties it failed to spawn.
#[derive(Debug)]
pub struct StartGate {
    state: Mutex<GateState>,
    cvar: Condvar,
}

#[derive(Debug)]
struct GateState {
    arrived: usize,
    expected: usize,
}

impl StartGate {
    pub fn new(parties: usize) -> Self {
        Self {
            state: Mutex::new(GateState {
                arrived: 0,
                expected: parties,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Block until every expected party has arrived
    pub fn arrive(&self) {
        let mut state = self.state.lock();
        state.arrived += 1;
        if state.arrived >= state.expected {
            self.cvar.notify_all();
            return;
        }
        while state.arrived < state.expected {
            self.cvar.wait(&mut state);
        }
    }

    /// Stop waiting for a party that will never arrive
    pub fn withdraw(&self) {
        let mut state = self.state.lock();
        state.expected = state.expected.saturating_sub(1);
        if state.arrived >= state.expected {
            self.cvar.notify_all();
        }
    }
}

/// Benchmark worker (runs in dedicated OS thread)
pub struct Worker<J: JobStrategy> {
    id: usize,
    config: Arc<BenchmarkConfig>,
    job: J,
    signal: Arc<CancellationSignal>,
    factory: ConnectionFactory,
    start_gate: Option<Arc<StartGate>>,
}

impl<J: JobStrategy> Worker<J> {
    /// Create new worker
    pub fn new(
        config: Arc<BenchmarkConfig>,
        id: usize,
        job: J,
        signal: Arc<CancellationSignal>,
    ) -> Self {
        let factory = config.connection_factory();
        Self {
            id,
            config,
            job,
            signal,
            factory,
            start_gate: None,
        }
    }

    /// Wait at `gate` between setup and the first request
    pub fn with_start_gate(mut self, gate: Arc<StartGate>) -> Self {
        self.start_gate = Some(gate);
        self
    }

    /// Spawn the worker thread and return immediately
    pub fn start(self) -> Result<WorkerHandle> {
        let id = self.id;
        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || self.run())?;
        Ok(WorkerHandle { id, handle })
    }

    /// Main worker loop (blocking)
    pub fn run(mut self) -> WorkerResult {
        let mut result = WorkerResult::new(self.id);
        let setup = self.job.setup(&self.factory);

        if let Some(ref gate) = self.start_gate {
            gate.arrive();
        }

        let mut conn = match setup {
            Ok(conn) => conn,
            Err(e) => {
                error!("Worker {}: setup failed: {}", self.id, e);
                result.error = Some(e.to_string());
                return result;
            }
        };

        info!("Worker {}: starting job", self.id);

        let start = Instant::now();
        for _ in 0..self.config.requests_per_worker {
            if self.signal.is_aborted() {
                debug!("Worker {}: aborted after {} requests", self.id, result.count);
                self.job.teardown(conn);
                return result;
            }
            if self.signal.is_timed_out() {
                debug!("Worker {}: timeout after {} requests", self.id, result.count);
                break;
            }

            let sent = Instant::now();
            let outcome = self.job.request(&mut conn);
            result.record_latency(sent.elapsed());
            result.count += 1;

            match outcome {
                Ok(true) => result.success += 1,
                Ok(false) => {
                    info!("Worker {}: request {} unsuccessful", self.id, result.count);
                }
                Err(e) if e.is_request_failure() => {
                    info!("Worker {}: {}", self.id, e);
                }
                Err(e) => {
                    error!("Worker {}: stopped by fatal error: {}", self.id, e);
                    result.error = Some(e.to_string());
                    self.job.teardown(conn);
                    return result;
                }
            }
        }
        result.finish(start, Instant::now());

        self.job.teardown(conn);
        debug!("Worker {}: finalized", self.id);
        result
    }
}

/// Handle to a running worker thread
pub struct WorkerHandle {
    id: usize,
    handle: JoinHandle<WorkerResult>,
}

impl WorkerHandle {
    /// Block until the worker exits. A panicked worker yields a failed result.
    pub fn join(self) -> WorkerResult {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!("Worker {}: thread panicked", self.id);
                WorkerResult::failed(self.id, "worker thread panicked")
            }
        }
    }
}
