//! Validate flow — walks every pin of every board, one at a time.
//!
//! Used while wiring the model: each line is lit alone for `delay`, so the
//! person at the building can check that the right window comes on.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use khrushchevka_domain::light::{LightAddress, Pin};

use crate::flow::{BoxFuture, Flow, FlowResult, StopSignal};
use crate::ports::LightsController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// How long each pin stays lit before moving to the next one.
    pub delay: Duration,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
        }
    }
}

pub struct ValidateFlow<L> {
    lights: Arc<L>,
    options: ValidateOptions,
    signal: StopSignal,
}

impl<L: LightsController + 'static> ValidateFlow<L> {
    pub const NAME: &'static str = "validate";

    #[must_use]
    pub fn new(lights: Arc<L>, options: ValidateOptions) -> Self {
        Self {
            lights,
            options,
            signal: StopSignal::default(),
        }
    }

    async fn run(&self, done: CancellationToken) -> FlowResult {
        self.lights.reset()?;
        let boards = self.lights.boards();
        tracing::info!(?boards, delay = ?self.options.delay, "validate flow started");
        if boards.is_empty() {
            tracing::warn!("no boards to validate");
            done.cancelled().await;
            return Ok(());
        }

        let mut rounds: u64 = 0;
        'walk: while !done.is_cancelled() {
            for &board in &boards {
                for pin in Pin::ALL {
                    if done.is_cancelled() {
                        break 'walk;
                    }
                    let addr = LightAddress::new(board, pin);
                    tracing::info!(%addr, "lit for validation");
                    self.lights.set(addr, true)?;

                    let stopped = tokio::select! {
                        biased;
                        () = done.cancelled() => true,
                        () = tokio::time::sleep(self.options.delay) => false,
                    };
                    self.lights.set(addr, false)?;
                    if stopped {
                        break 'walk;
                    }
                }
            }
            rounds += 1;
            tracing::debug!(rounds, "every pin walked, starting over");
        }

        tracing::info!(rounds, "validate flow stopped");
        Ok(())
    }
}

impl<L: LightsController + 'static> Flow for ValidateFlow<L> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn start(self: Arc<Self>, shutdown: &CancellationToken) -> BoxFuture<FlowResult> {
        let done = self.signal.arm(shutdown);
        Box::pin(async move { self.run(done).await })
    }

    fn stop(&self) {
        if self.signal.trigger() {
            tracing::info!(flow = Self::NAME, "stop requested");
        }
    }
}
