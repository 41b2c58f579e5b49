//! Flow selection.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use khrushchevka_app::ports::{LightsController, Snapshotter};

use crate::error::ApiError;
use crate::state::AppState;

/// Registered flows and the one currently selected.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowsResponse {
    pub flows: Vec<String>,
    pub active: Option<String>,
}

/// Request body for switching flows.
#[derive(Deserialize)]
pub struct SelectFlowRequest {
    pub name: String,
}

fn describe<L, S>(state: &AppState<L, S>) -> FlowsResponse {
    FlowsResponse {
        flows: state.flows.list_flows(),
        active: state.flows.active(),
    }
}

/// `GET /api/flows`
pub async fn list<L, S>(State(state): State<AppState<L, S>>) -> Json<FlowsResponse>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    Json(describe(&state))
}

/// `PUT /api/flows/active`
///
/// Stops the running flow and starts the requested one. Answers once the new
/// flow is started, not once the old one has finished.
pub async fn select<L, S>(
    State(state): State<AppState<L, S>>,
    Json(req): Json<SelectFlowRequest>,
) -> Result<Json<FlowsResponse>, ApiError>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    state.flows.select_flow(&state.shutdown, &req.name)?;
    tracing::info!(flow = %req.name, "flow selected over http");
    Ok(Json(describe(&state)))
}
