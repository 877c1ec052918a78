//! External triggers that set cancellation flags
//!
//! A dedicated listener thread runs a single-threaded tokio runtime that
//! waits for SIGINT (abort), SIGALRM (timeout) and the optional time limit.
//! Workers never touch this thread; they only read the flags it sets.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::cancellation::{Cancellation, CancellationSignal};
use crate::utils::Result;

/// Running trigger listener, stopped on drop
pub struct SignalTriggers {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SignalTriggers {
    /// Start listening.
    ///
    /// OS signal handlers are registered before this returns, so a signal
    /// delivered while workers are starting is not lost.
    pub fn install(
        signal: Arc<CancellationSignal>,
        os_signals: bool,
        time_limit: Option<Duration>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let os = if os_signals {
            let _guard = runtime.enter();
            Some(OsSignals::register()?)
        } else {
            None
        };

        let (tx, rx) = oneshot::channel();
        let handle = thread::Builder::new()
            .name("signal-listener".to_string())
            .spawn(move || runtime.block_on(listen(signal, os, time_limit, rx)))?;

        Ok(Self {
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }
}

impl Drop for SignalTriggers {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Signal listener thread panicked");
            }
        }
    }
}

async fn listen(
    signal: Arc<CancellationSignal>,
    mut os: Option<OsSignals>,
    time_limit: Option<Duration>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let deadline = async {
        match time_limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);
    let mut deadline_fired = false;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = &mut deadline, if !deadline_fired => {
                info!("Time limit reached");
                signal.set(Cancellation::TimeoutReached);
                deadline_fired = true;
            }
            kind = next_os_signal(&mut os) => {
                debug!("Received {:?} signal", kind);
                signal.set(kind);
            }
        }
    }
}

async fn next_os_signal(os: &mut Option<OsSignals>) -> Cancellation {
    match os {
        Some(os) => os.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(unix)]
struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    alarm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Must be called inside a runtime context
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            alarm: signal(SignalKind::alarm())?,
        })
    }

    async fn recv(&mut self) -> Cancellation {
        tokio::select! {
            _ = self.interrupt.recv() => Cancellation::Abort,
            _ = self.alarm.recv() => Cancellation::TimeoutReached,
        }
    }
}

#[cfg(not(unix))]
struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Cancellation {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        Cancellation::Abort
    }
}
