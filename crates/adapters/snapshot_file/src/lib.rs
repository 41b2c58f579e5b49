//! # khrushchevka-adapter-snapshot-file
//!
//! Records and plays back light frames as newline-delimited JSON.
//!
//! ```text
//! [{"board":32,"pin":"A1","is_on":true},{"board":32,"pin":"A2","is_on":false}]
//! [{"board":33,"pin":"B0","is_on":true}]
//! ```
//!
//! [`JsonLinesStore`] implements both [`Snapshotter`] (append the current
//! state of every light of the building as one line) and [`Replayer`] (play
//! a file front to back, one frame per `delay`).
//!
//! ## Dependency rule
//!
//! Depends on `khrushchevka-app` (port traits) and `khrushchevka-domain` only.

pub mod error;
pub mod frame;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use khrushchevka_app::ports::{LightsController, Replayer, Snapshotter};
use khrushchevka_domain::building::BuildingMap;
use khrushchevka_domain::error::KhrushchevkaError;

use crate::error::SnapshotError;
use crate::frame::{Frame, FrameLight};

/// JSON-lines recorder and player bound to one lights controller.
pub struct JsonLinesStore<L> {
    lights: Arc<L>,
    building: Arc<BuildingMap>,
    path: PathBuf,
    // one snapshot or replay at a time
    busy: Mutex<()>,
}

impl<L: LightsController> JsonLinesStore<L> {
    /// Snapshots are appended to `path`; replays read whatever path they are given.
    pub fn new(lights: Arc<L>, building: Arc<BuildingMap>, path: impl Into<PathBuf>) -> Self {
        Self {
            lights,
            building,
            path: path.into(),
            busy: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn capture(&self) -> Result<Frame, KhrushchevkaError> {
        self.building
            .addresses()
            .into_iter()
            .map(|addr| Ok(FrameLight::new(addr, self.lights.is_on(addr)?)))
            .collect()
    }

    fn show(&self, frame: &[FrameLight], lit: bool) -> Result<(), KhrushchevkaError> {
        for light in frame {
            self.lights.set(light.addr(), lit && light.is_on)?;
        }
        Ok(())
    }

    async fn append(&self, line: String) -> Result<(), SnapshotError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| SnapshotError::Open {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

impl<L: LightsController> Snapshotter for JsonLinesStore<L> {
    async fn snapshot(&self) -> Result<(), KhrushchevkaError> {
        let _busy = self.busy.lock().await;

        let frame = self.capture()?;
        let line = frame::encode(&frame)?;
        self.append(line).await?;

        tracing::info!(
            path = %self.path.display(),
            lights = frame.len(),
            lit = frame.iter().filter(|light| light.is_on).count(),
            "snapshot appended"
        );
        Ok(())
    }
}

impl<L: LightsController> Replayer for JsonLinesStore<L> {
    async fn replay(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        delay: Duration,
    ) -> Result<(), KhrushchevkaError> {
        let _busy = self.busy.lock().await;

        let file = File::open(path)
            .await
            .map_err(|source| SnapshotError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let mut lines = BufReader::new(file).lines();
        let mut number = 0;

        while let Some(text) = lines.next_line().await.map_err(SnapshotError::from)? {
            number += 1;
            if cancel.is_cancelled() {
                return Ok(());
            }
            if text.trim().is_empty() {
                continue;
            }

            let frame = frame::decode(number, &text)?;
            tracing::debug!(line = number, lights = frame.len(), "showing frame");
            self.show(&frame, true)?;
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                () = tokio::time::sleep(delay) => {}
            }
            self.show(&frame, false)?;
        }

        tracing::debug!(path = %path.display(), frames = number, "replay finished");
        Ok(())
    }
}
