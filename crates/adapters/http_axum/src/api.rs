//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod building;
#[allow(clippy::missing_errors_doc)]
pub mod flows;
#[allow(clippy::missing_errors_doc)]
pub mod lights;
#[allow(clippy::missing_errors_doc)]
pub mod snapshot;
pub mod sse;

use axum::Router;
use axum::routing::{get, post, put};

use khrushchevka_app::ports::{LightsController, Snapshotter};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<L, S>() -> Router<AppState<L, S>>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    Router::new()
        // Flows
        .route("/flows", get(flows::list::<L, S>))
        .route("/flows/active", put(flows::select::<L, S>))
        // Building
        .route("/building", get(building::get::<L, S>))
        .route("/boards", get(building::boards::<L, S>))
        // Lights
        .route("/lights", get(lights::list::<L, S>))
        .route("/lights/stream", get(sse::stream::<L, S>))
        .route("/lights/{board}/{pin}", put(lights::set::<L, S>))
        // Snapshots
        .route("/snapshot", post(snapshot::create::<L, S>))
}
