//! Snapshot trigger.

use axum::extract::State;
use axum::http::StatusCode;

use khrushchevka_app::ports::{LightsController, Snapshotter};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/snapshot` — append the current light state to the recording.
pub async fn create<L, S>(State(state): State<AppState<L, S>>) -> Result<StatusCode, ApiError>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    state.snapshotter.snapshot().await?;
    Ok(StatusCode::NO_CONTENT)
}
