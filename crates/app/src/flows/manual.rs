//! Manual flow — every light off, then hands off.
//!
//! While this flow is selected the operator drives individual lights through
//! the shared [`LightsController`], e.g. to check a freshly wired board.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::flow::{BoxFuture, Flow, FlowResult, StopSignal};
use crate::ports::LightsController;

pub struct ManualFlow<L> {
    lights: Arc<L>,
    signal: StopSignal,
}

impl<L: LightsController + 'static> ManualFlow<L> {
    pub const NAME: &'static str = "manual";

    #[must_use]
    pub fn new(lights: Arc<L>) -> Self {
        Self {
            lights,
            signal: StopSignal::default(),
        }
    }
}

impl<L: LightsController + 'static> Flow for ManualFlow<L> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn start(self: Arc<Self>, shutdown: &CancellationToken) -> BoxFuture<FlowResult> {
        let done = self.signal.arm(shutdown);
        Box::pin(async move {
            self.lights.reset()?;
            tracing::info!("manual flow started, all lights off");
            done.cancelled().await;
            tracing::info!("manual flow stopped");
            Ok(())
        })
    }

    fn stop(&self) {
        if self.signal.trigger() {
            tracing::info!(flow = Self::NAME, "stop requested");
        }
    }
}
