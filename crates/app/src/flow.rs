//! Flow abstraction — a pluggable control mode for the building.
//!
//! A flow is created once at startup and then started and stopped any
//! number of times by the [`FlowController`]. Every run observes a single
//! [`CancellationToken`]: a child of the process-wide shutdown token that
//! [`Flow::stop`] cancels on its own. Waiting on that one token therefore
//! covers both a flow switch and a global shutdown.

pub mod controller;

pub use controller::{FlowController, FlowExit};

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use khrushchevka_domain::error::KhrushchevkaError;

/// Terminal result of a flow run: `Ok` for a cooperative stop.
pub type FlowResult = Result<(), KhrushchevkaError>;

/// Owned, sendable future returned by [`Flow::start`].
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A named, restartable unit of behaviour.
pub trait Flow: Send + Sync {
    /// Stable identifier used to select the flow.
    fn name(&self) -> &str;

    /// Arm the flow's stop signal and return the run future.
    ///
    /// The signal is armed *before* this returns, so a [`stop`](Self::stop)
    /// issued right after `start` is never lost even if the future has not
    /// been polled yet.
    fn start(self: Arc<Self>, shutdown: &CancellationToken) -> BoxFuture<FlowResult>;

    /// Request a cooperative stop. Idempotent; a no-op when not running.
    fn stop(&self);
}

/// Per-flow stop signal, cancelled at most once per run.
#[derive(Debug, Default)]
pub struct StopSignal {
    current: Mutex<Option<CancellationToken>>,
}

impl StopSignal {
    /// Create the token for a new run, derived from `shutdown`.
    ///
    /// A run that was never stopped is cancelled first so a flow never runs
    /// twice at once.
    pub fn arm(&self, shutdown: &CancellationToken) -> CancellationToken {
        let token = shutdown.child_token();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancel the current run. Returns `false` when nothing was armed.
    pub fn trigger(&self) -> bool {
        match self.lock().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
