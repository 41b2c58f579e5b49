//! Direct light access.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use khrushchevka_app::ports::{LightsController, Snapshotter};
use khrushchevka_domain::light::{LightAddress, LightKind, Pin, PinState};

use crate::error::ApiError;
use crate::state::AppState;

/// One addressed light of the building with its current state.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LightView {
    pub level: usize,
    pub number: u32,
    pub kind: LightKind,
    pub addr: LightAddress,
    pub is_on: bool,
}

/// Request body for switching a light.
#[derive(Deserialize)]
pub struct SetLightRequest {
    pub is_on: bool,
}

/// Board addresses are accepted in decimal (`32`) or hex (`0x20`).
fn parse_board(raw: &str) -> Result<u8, ApiError> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| ApiError::BadRequest(format!("invalid board address {raw:?}")))
}

/// `GET /api/lights`
pub async fn list<L, S>(
    State(state): State<AppState<L, S>>,
) -> Result<Json<Vec<LightView>>, ApiError>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    let mut views = Vec::new();
    for (level, lights) in state.building.levels.iter().enumerate() {
        for light in &lights.lights {
            let Some(addr) = light.hardware_address() else {
                continue;
            };
            views.push(LightView {
                level,
                number: light.number,
                kind: light.kind,
                addr,
                is_on: state.lights.is_on(addr)?,
            });
        }
    }
    Ok(Json(views))
}

/// `PUT /api/lights/{board}/{pin}`
///
/// Writes straight to the hardware. A running flow may overwrite the value
/// on its next step; select `manual` first to keep it.
pub async fn set<L, S>(
    State(state): State<AppState<L, S>>,
    Path((board, pin)): Path<(String, String)>,
    Json(req): Json<SetLightRequest>,
) -> Result<Json<PinState>, ApiError>
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    let board = parse_board(&board)?;
    let pin = Pin::from_str(&pin).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    let addr = LightAddress::new(board, pin);

    state.lights.set(addr, req.is_on)?;
    match state.building.light_at(addr) {
        Some(light) => tracing::debug!(
            board,
            %pin,
            is_on = req.is_on,
            unit = light.number,
            kind = ?light.kind,
            "light set over http"
        ),
        None => tracing::debug!(board, %pin, is_on = req.is_on, "unmapped line set over http"),
    }
    Ok(Json(PinState::now(addr, req.is_on)))
}
