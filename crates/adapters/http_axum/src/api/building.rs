//! Static layout of the model.

use axum::Json;
use axum::extract::State;

use khrushchevka_app::ports::{LightsController, Snapshotter};
use khrushchevka_domain::building::BuildingMap;

use crate::state::AppState;

/// `GET /api/building`
pub async fn get<L, S>(State(state): State<AppState<L, S>>) -> Json<BuildingMap>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    Json(BuildingMap::clone(&state.building))
}

/// `GET /api/boards` — addresses of the expander boards the controller knows.
pub async fn boards<L, S>(State(state): State<AppState<L, S>>) -> Json<Vec<u8>>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    Json(state.lights.boards())
}
