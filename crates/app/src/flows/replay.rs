//! Replay flow — plays a recorded light sequence over and over.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::flow::{BoxFuture, Flow, FlowResult, StopSignal};
use crate::ports::Replayer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// How long each frame stays lit.
    pub showtime: Duration,
    pub replay_file: PathBuf,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            showtime: Duration::from_secs(1),
            replay_file: PathBuf::from("snapshot.jsonl"),
        }
    }
}

pub struct ReplayFlow<R> {
    replayer: Arc<R>,
    options: ReplayOptions,
    signal: StopSignal,
}

impl<R: Replayer + 'static> ReplayFlow<R> {
    pub const NAME: &'static str = "replay";

    #[must_use]
    pub fn new(replayer: Arc<R>, options: ReplayOptions) -> Self {
        Self {
            replayer,
            options,
            signal: StopSignal::default(),
        }
    }

    async fn run(&self, done: CancellationToken) -> FlowResult {
        let path = &self.options.replay_file;
        tracing::info!(file = %path.display(), showtime = ?self.options.showtime, "replay flow started");

        let mut rounds: u64 = 0;
        while !done.is_cancelled() {
            self.replayer
                .replay(&done, path, self.options.showtime)
                .await
                .inspect_err(|err| {
                    tracing::warn!(file = %path.display(), %err, "replay aborted");
                })?;
            rounds += 1;
            tracing::debug!(rounds, "replay finished, starting over");
            // pause between passes
            tokio::select! {
                biased;
                () = done.cancelled() => {}
                () = tokio::time::sleep(self.options.showtime) => {}
            }
        }

        tracing::info!(rounds, "replay flow stopped");
        Ok(())
    }
}

impl<R: Replayer + 'static> Flow for ReplayFlow<R> {
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
