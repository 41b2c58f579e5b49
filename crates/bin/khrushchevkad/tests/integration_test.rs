//! End-to-end tests for the full khrushchevkad stack.
//!
//! Each test wires the real adapters (virtual boards, JSON-lines store, real
//! flows, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot` — no TCP port is bound.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use khrushchevka_adapter_http_axum::router;
use khrushchevka_adapter_http_axum::state::AppState;
use khrushchevka_adapter_snapshot_file::JsonLinesStore;
use khrushchevka_adapter_virtual::VirtualLights;
use khrushchevka_app::flow::{Flow, FlowController, FlowExit};
use khrushchevka_app::flows::{
    LiveFlow, LiveOptions, ManualFlow, ReplayFlow, ReplayOptions, ValidateFlow, ValidateOptions,
};
use khrushchevka_app::ports::LightsController;
use khrushchevka_domain::building::BuildingMap;
use khrushchevka_domain::light::{Light, LightAddress, LightKind, Pin, PinState, Side};
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const WINDOWS: u8 = 0x20;
const SERVICE: u8 = 0x21;
const PATIENCE: Duration = Duration::from_secs(2);

struct Stack {
    app: axum::Router,
    lights: Arc<VirtualLights>,
    exits: mpsc::Receiver<FlowExit>,
    shutdown: CancellationToken,
}

impl Drop for Stack {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn light(number: u32, kind: LightKind, addr: Option<(u8, Pin)>) -> Light {
    Light {
        number,
        side: Side::Front,
        kind,
        addr: addr.map(|(board, pin)| LightAddress::new(board, pin)),
    }
}

// e w(1) _ w(1) w(2) w(2)
// s w(3) _ w(3) w(4) w(4)
fn building() -> Arc<BuildingMap> {
    Arc::new(BuildingMap::new(vec![
        vec![
            light(0, LightKind::ServiceEntrance, Some((SERVICE, Pin::A0))),
            light(1, LightKind::ShortWindow, Some((WINDOWS, Pin::A0))),
            light(1, LightKind::WallStub, None),
            light(1, LightKind::LongWindow, Some((WINDOWS, Pin::A1))),
            light(2, LightKind::LongWindow, Some((WINDOWS, Pin::A2))),
            light(2, LightKind::ShortWindow, Some((WINDOWS, Pin::A3))),
        ],
        vec![
            light(0, LightKind::ServiceNoManLand, Some((SERVICE, Pin::A1))),
            light(3, LightKind::ShortWindow, Some((WINDOWS, Pin::B0))),
            light(3, LightKind::WallStub, None),
            light(3, LightKind::LongWindow, Some((WINDOWS, Pin::B1))),
            light(4, LightKind::LongWindow, Some((WINDOWS, Pin::B2))),
            light(4, LightKind::ShortWindow, Some((WINDOWS, Pin::B3))),
        ],
    ]))
}

fn temp_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "khrushchevkad-{}-{name}.jsonl",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

/// Wire the daemon the way `main` does, with fast timings.
fn stack(snapshot_file: &Path, replay_file: &Path) -> Stack {
    let building = building();
    let lights = Arc::new(VirtualLights::new([WINDOWS, SERVICE]));
    let store = Arc::new(JsonLinesStore::new(
        Arc::clone(&lights),
        Arc::clone(&building),
        snapshot_file,
    ));

    let flows: Vec<Arc<dyn Flow>> = vec![
        Arc::new(LiveFlow::new(
            Arc::clone(&lights),
            Arc::clone(&building),
            LiveOptions {
                max_delay: Duration::from_millis(5),
                flat_ttl: Duration::from_secs(1),
                service_ttl: Duration::from_millis(500),
                max_changes: 3,
                seed: Some(7),
            },
        )),
        Arc::new(ManualFlow::new(Arc::clone(&lights))),
        Arc::new(ReplayFlow::new(
            Arc::clone(&store),
            ReplayOptions {
                showtime: Duration::from_millis(10),
                replay_file: replay_file.to_path_buf(),
            },
        )),
        Arc::new(ValidateFlow::new(
            Arc::clone(&lights),
            ValidateOptions {
                delay: Duration::from_millis(5),
            },
        )),
    ];
    let controller = Arc::new(FlowController::new(flows));
    let exits = controller.subscribe_to_errors().unwrap();
    let shutdown = CancellationToken::new();

    let state = AppState::new(
        controller,
        Arc::clone(&lights),
        building,
        store,
        shutdown.clone(),
    );

    Stack {
        app: router::build(state),
        lights,
        exits,
        shutdown,
    }
}

async fn call(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn select(app: &axum::Router, name: &str) {
    let (status, body) = call(
        app,
        Method::PUT,
        "/api/flows/active",
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], name);
}

/// Wait for the next change matching `predicate`.
async fn next_change(
    changes: &mut broadcast::Receiver<PinState>,
    predicate: impl Fn(&PinState) -> bool,
) -> PinState {
    tokio::time::timeout(PATIENCE, async {
        loop {
            let change = changes.recv().await.unwrap();
            if predicate(&change) {
                return change;
            }
        }
    })
    .await
    .expect("no matching light change in time")
}

// ---------------------------------------------------------------------------
// Flow switching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_darken_building_when_switching_from_live_to_manual() {
    let mut stack = stack(&temp_file("unused-snapshot"), &temp_file("unused-replay"));
    let mut changes = stack.lights.subscribe();

    select(&stack.app, "live").await;
    next_change(&mut changes, |change| {
        change.addr.board == WINDOWS && change.is_on
    })
    .await;
    assert!(
        stack
            .lights
            .is_on(LightAddress::new(SERVICE, Pin::A0))
            .unwrap()
    );

    select(&stack.app, "manual").await;
    let exit = tokio::time::timeout(PATIENCE, stack.exits.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exit.flow, "live");
    assert!(exit.result.is_ok());
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = call(&stack.app, Method::GET, "/api/lights", None).await;
    assert_eq!(status, StatusCode::OK);
    let lights = body.as_array().unwrap();
    assert_eq!(lights.len(), 10);
    assert!(lights.iter().all(|light| light["is_on"] == false));

    let (_, body) = call(&stack.app, Method::GET, "/api/flows", None).await;
    assert_eq!(
        body,
        json!({ "flows": ["live", "manual", "replay", "validate"], "active": "manual" })
    );
}

#[tokio::test]
async fn should_keep_current_flow_when_selecting_unknown_one() {
    let stack = stack(&temp_file("unknown-snapshot"), &temp_file("unknown-replay"));
    select(&stack.app, "manual").await;

    let (status, _) = call(
        &stack.app,
        Method::PUT,
        "/api/flows/active",
        Some(json!({ "name": "disco" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = call(&stack.app, Method::GET, "/api/flows", None).await;
    assert_eq!(body["active"], "manual");
}

#[tokio::test]
async fn should_walk_every_pin_when_validating() {
    let stack = stack(&temp_file("walk-snapshot"), &temp_file("walk-replay"));
    let mut changes = stack.lights.subscribe();

    select(&stack.app, "validate").await;

    let mut lit = Vec::new();
    for _ in 0..3 {
        let change = next_change(&mut changes, |change| change.is_on).await;
        lit.push(change.addr);
    }
    assert_eq!(
        lit,
        vec![
            LightAddress::new(WINDOWS, Pin::A0),
            LightAddress::new(WINDOWS, Pin::A1),
            LightAddress::new(WINDOWS, Pin::A2),
        ]
    );
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_replay_frames_in_a_loop() {
    let replay_file = temp_file("loop");
    std::fs::write(
        &replay_file,
        concat!(
            r#"[{"board":32,"pin":"A0","is_on":true}]"#,
            "\n",
            r#"[{"board":32,"pin":"B0","is_on":true}]"#,
            "\n",
        ),
    )
    .unwrap();
    let stack = stack(&temp_file("loop-snapshot"), &replay_file);
    let mut changes = stack.lights.subscribe();

    select(&stack.app, "replay").await;

    let mut shown = Vec::new();
    for _ in 0..3 {
        let change = next_change(&mut changes, |change| change.is_on).await;
        shown.push(change.addr.pin);
    }
    assert_eq!(shown, vec![Pin::A0, Pin::B0, Pin::A0]);

    std::fs::remove_file(&replay_file).unwrap();
}

#[tokio::test]
async fn should_replay_what_was_snapshotted_over_http() {
    let file = temp_file("roundtrip");
    let stack = stack(&file, &file);
    select(&stack.app, "manual").await;
    // let the manual flow switch everything off first
    tokio::time::sleep(Duration::from_millis(20)).await;

    for pin in ["A1", "B2"] {
        let (status, _) = call(
            &stack.app,
            Method::PUT,
            &format!("/api/lights/0x20/{pin}"),
            Some(json!({ "is_on": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = call(&stack.app, Method::POST, "/api/snapshot", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let mut changes = stack.lights.subscribe();
    select(&stack.app, "replay").await;

    let first = next_change(&mut changes, |change| change.is_on).await;
    let second = next_change(&mut changes, |change| change.is_on).await;
    assert_eq!(first.addr, LightAddress::new(WINDOWS, Pin::A1));
    assert_eq!(second.addr, LightAddress::new(WINDOWS, Pin::B2));

    std::fs::remove_file(&file).unwrap();
}

#[tokio::test]
async fn should_report_replay_failure_on_exit_channel() {
    let mut stack = stack(&temp_file("missing-snapshot"), &temp_file("missing"));

    select(&stack.app, "replay").await;

    let exit = tokio::time::timeout(PATIENCE, stack.exits.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exit.flow, "replay");
    assert!(exit.result.is_err());
}
