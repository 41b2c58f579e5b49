//! Recording ports — capture light frames and play them back.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use khrushchevka_domain::error::KhrushchevkaError;

/// Plays a recorded light sequence once, front to back.
pub trait Replayer: Send + Sync {
    /// Play every frame of `path`, holding each for `delay`.
    ///
    /// Returns `Ok(())` at end of file or as soon as `cancel` fires.
    fn replay(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        delay: Duration,
    ) -> impl Future<Output = Result<(), KhrushchevkaError>> + Send;
}

/// Appends the current light state as one frame of a recording.
pub trait Snapshotter: Send + Sync {
    fn snapshot(&self) -> impl Future<Output = Result<(), KhrushchevkaError>> + Send;
}

impl<T: Replayer> Replayer for Arc<T> {
    fn replay(
        &self,
        cancel: &CancellationToken,
        path: &Path,
        delay: Duration,
    ) -> impl Future<Output = Result<(), KhrushchevkaError>> + Send {
        (**self).replay(cancel, path, delay)
    }
}

impl<T: Snapshotter> Snapshotter for Arc<T> {
    fn snapshot(&self) -> impl Future<Output = Result<(), KhrushchevkaError>> + Send {
        (**self).snapshot()
    }
}
