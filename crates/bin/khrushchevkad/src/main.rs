//! # khrushchevkad — building light daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Load the building map and check it against the configured boards
//! - Construct the lights controller and the snapshot store (adapters)
//! - Register the flows and select the initial one
//! - Build the axum router and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod building;
mod config;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use khrushchevka_adapter_http_axum::state::AppState;
use khrushchevka_adapter_snapshot_file::JsonLinesStore;
use khrushchevka_adapter_virtual::VirtualLights;
use khrushchevka_app::flow::{Flow, FlowController, FlowExit};
use khrushchevka_app::flows::{LiveFlow, ManualFlow, ReplayFlow, ValidateFlow};

use crate::config::Config;

/// How long flows get to wind down after the server stopped.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Building and hardware
    let building = Arc::new(building::load(
        config.building.map_file.as_deref(),
        &config.hardware.boards,
    )?);
    let lights = Arc::new(VirtualLights::new(config.hardware.boards.iter().copied()));
    tracing::info!(
        boards = ?config.hardware.boards,
        units = building.units().len(),
        "building loaded"
    );

    // One store records and replays, so a snapshot never lands mid-replay
    let store = Arc::new(JsonLinesStore::new(
        Arc::clone(&lights),
        Arc::clone(&building),
        config.snapshot.path.clone(),
    ));
    tracing::info!(
        snapshots = %store.path().display(),
        replay = %config.replay.replay_file.display(),
        "recording store ready"
    );

    // Flows
    let flows: Vec<Arc<dyn Flow>> = vec![
        Arc::new(LiveFlow::new(
            Arc::clone(&lights),
            Arc::clone(&building),
            config.live_options(),
        )),
        Arc::new(ManualFlow::new(Arc::clone(&lights))),
        Arc::new(ReplayFlow::new(Arc::clone(&store), config.replay_options())),
        Arc::new(ValidateFlow::new(
            Arc::clone(&lights),
            config.validate_options(),
        )),
    ];
    let controller = Arc::new(FlowController::new(flows));
    let shutdown = CancellationToken::new();

    let exits = controller
        .subscribe_to_errors()
        .ok_or("flow exit channel already taken")?;
    let reporter = tokio::spawn(report_exits(exits));

    controller.select_flow(&shutdown, &config.flows.initial)?;
    tracing::info!(flow = %config.flows.initial, "initial flow selected");

    // HTTP
    let state = AppState::new(
        Arc::clone(&controller),
        lights,
        building,
        store,
        shutdown.clone(),
    );
    let app = khrushchevka_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "khrushchevkad listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // The controller holds the last sender, so the reporter only ends once
    // every flow task has delivered its exit and the controller is dropped.
    drop(controller);
    if tokio::time::timeout(SHUTDOWN_GRACE, reporter).await.is_err() {
        tracing::warn!("flows did not stop in time");
    }
    tracing::info!("khrushchevkad stopped");

    Ok(())
}

/// Log every flow exit until all senders are gone.
async fn report_exits(mut exits: mpsc::Receiver<FlowExit>) {
    while let Some(exit) = exits.recv().await {
        match exit.result {
            Ok(()) => tracing::info!(flow = %exit.flow, "flow stopped"),
            Err(err) => tracing::error!(flow = %exit.flow, error = %err, "flow failed"),
        }
    }
}

/// Resolve on Ctrl-C or SIGTERM, cancelling every running flow.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown requested");
    shutdown.cancel();
}
