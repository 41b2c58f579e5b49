//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use khrushchevka_app::ports::{LightsController, Snapshotter};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the JSON API under `/api` and adds a [`TraceLayer`] that logs each
/// request/response through `tracing`.
pub fn build<L, S>(state: AppState<L, S>) -> Router
where
    L: LightsController + 'static,
    S: Snapshotter + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
