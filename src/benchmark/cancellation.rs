//! One-shot cancellation flags shared by all workers
//!
//! These are the ONLY mutable state shared between worker threads.
//! Each flag is monotonic: once set it is never cleared for the lifetime
//! of the run, so a worker observing a stale value for one extra
//! iteration is harmless.

use std::sync::atomic::{AtomicBool, Ordering};

/// Which flag to set or test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// User requested immediate termination (interrupt)
    Abort,
    /// Deadline elapsed (alarm or time limit)
    TimeoutReached,
}

/// Abort/timeout flags for one benchmark run
///
/// Created once per run and handed to the coordinator, every worker and
/// the trigger listener by `Arc`. Independent runs in one process use
/// independent instances.
#[derive(Debug, Default)]
pub struct CancellationSignal {
    abort: AtomicBool,
    timeout: AtomicBool,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, kind: Cancellation) -> &AtomicBool {
        match kind {
            Cancellation::Abort => &self.abort,
            Cancellation::TimeoutReached => &self.timeout,
        }
    }

    /// Set a flag. Idempotent, lock-free, never unsets.
    pub fn set(&self, kind: Cancellation) {
        self.flag(kind).store(true, Ordering::SeqCst);
    }

    /// Check a flag without blocking
    #[inline]
    pub fn is_set(&self, kind: Cancellation) -> bool {
        self.flag(kind).load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.is_set(Cancellation::Abort)
    }

    #[inline]
    pub fn is_timed_out(&self) -> bool {
        self.is_set(Cancellation::TimeoutReached)
    }
}
