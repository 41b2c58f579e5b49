//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use khrushchevka_app::flow::FlowController;
use khrushchevka_app::ports::{LightsController, Snapshotter};
use khrushchevka_domain::building::BuildingMap;

/// Application state shared across all axum handlers.
///
/// Generic over the lights controller and the snapshotter to avoid dynamic
/// dispatch. `Clone` is implemented manually so neither needs to be `Clone`.
pub struct AppState<L, S> {
    pub flows: Arc<FlowController>,
    pub lights: Arc<L>,
    pub building: Arc<BuildingMap>,
    pub snapshotter: Arc<S>,
    /// Process-wide shutdown token; flows selected over HTTP run under it.
    pub shutdown: CancellationToken,
}

impl<L, S> Clone for AppState<L, S> {
    fn clone(&self) -> Self {
        Self {
            flows: Arc::clone(&self.flows),
            lights: Arc::clone(&self.lights),
            building: Arc::clone(&self.building),
            snapshotter: Arc::clone(&self.snapshotter),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<L, S> AppState<L, S>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    pub fn new(
        flows: Arc<FlowController>,
        lights: Arc<L>,
        building: Arc<BuildingMap>,
        snapshotter: Arc<S>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            flows,
            lights,
            building,
            snapshotter,
            shutdown,
        }
    }
}
