//! Benchmark coordination and workers
//!
//! This module provides the multi-threaded benchmark execution system:
//! - CancellationSignal: lock-free abort/timeout flags shared by all workers
//! - Worker: one OS thread running a bounded request loop
//! - SignalTriggers: SIGINT/SIGALRM/time-limit listener
//! - Coordinator: spawns workers, joins them and reports

pub mod cancellation;
pub mod coordinator;
pub mod triggers;
pub mod worker;

pub use cancellation::{Cancellation, CancellationSignal};
pub use coordinator::{Coordinator, RunOutcome};
pub use triggers::SignalTriggers;
pub use worker::{StartGate, Worker, WorkerHandle, WorkerResult};
