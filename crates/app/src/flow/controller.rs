//! Flow controller — keeps exactly one flow selected and reports how runs end.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;

use khrushchevka_domain::error::{FlowNotFoundError, KhrushchevkaError};

use super::{Flow, FlowResult};

/// How a flow run ended, as delivered on the controller's exit channel.
#[derive(Debug)]
pub struct FlowExit {
    /// Name of the flow that ended.
    pub flow: String,
    /// `Ok` for a cooperative stop, the terminal error otherwise.
    pub result: FlowResult,
}

/// State machine over a fixed registry of flows: idle, or one flow active.
///
/// Switching is non-blocking: the previous flow is only *signalled* to stop,
/// so its tasks may briefly overlap with the next flow's. Every run's
/// terminal result is sent on a single shared channel; whoever holds the
/// receiver must drain it continuously or the forwarding tasks stall.
pub struct FlowController {
    registry: Vec<Arc<dyn Flow>>,
    current: Mutex<Option<Arc<dyn Flow>>>,
    exits_tx: mpsc::Sender<FlowExit>,
    exits_rx: Mutex<Option<mpsc::Receiver<FlowExit>>>,
}

impl FlowController {
    /// Create an idle controller over `flows`.
    #[must_use]
    pub fn new(flows: Vec<Arc<dyn Flow>>) -> Self {
        let (exits_tx, exits_rx) = mpsc::channel(1);
        Self {
            registry: flows,
            current: Mutex::new(None),
            exits_tx,
            exits_rx: Mutex::new(Some(exits_rx)),
        }
    }

    /// Take the receiving end of the exit channel.
    ///
    /// The channel has a single consumer: the first call gets it, later
    /// calls return `None`.
    pub fn subscribe_to_errors(&self) -> Option<mpsc::Receiver<FlowExit>> {
        self.exits_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Stop the active flow (if any) and start `name` in the background.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`KhrushchevkaError::FlowNotFound`] when `name` is not
    /// registered; the active flow keeps running in that case.
    pub fn select_flow(
        &self,
        shutdown: &CancellationToken,
        name: &str,
    ) -> Result<(), KhrushchevkaError> {
        let flow = self
            .registry
            .iter()
            .find(|flow| flow.name() == name)
            .cloned()
            .ok_or_else(|| FlowNotFoundError {
                name: name.to_string(),
            })?;

        let mut current = self.lock_current();
        if let Some(previous) = current.take() {
            tracing::info!(flow = previous.name(), next = name, "stopping flow");
            previous.stop();
        }
        *current = Some(Arc::clone(&flow));

        let flow_name = flow.name().to_string();
        let span = tracing::info_span!("flow", flow = %flow_name);
        let run = flow.start(shutdown);
        let exits = self.exits_tx.clone();
        tokio::spawn(
            async move {
                let result = run.await;
                // receiver gone means nobody reports exits anymore
                let _ = exits
                    .send(FlowExit {
                        flow: flow_name,
                        result,
                    })
                    .await;
            }
            .instrument(span),
        );

        Ok(())
    }

    /// Names of every registered flow, in registration order.
    #[must_use]
    pub fn list_flows(&self) -> Vec<String> {
        self.registry
            .iter()
            .map(|flow| flow.name().to_string())
            .collect()
    }

    /// Name of the currently selected flow.
    #[must_use]
    pub fn active(&self) -> Option<String> {
        self.lock_current()
            .as_ref()
            .map(|flow| flow.name().to_string())
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<Arc<dyn Flow>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
