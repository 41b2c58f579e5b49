//! # khrushchevka-app
//!
//! Application layer — **port definitions** (traits) and the flows that
//! drive the building.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LightsController` — write/read individual lights, broadcast changes
//!   - `Replayer` — play a recorded light sequence
//!   - `Snapshotter` — record the current light state
//! - Define the **flow** abstraction and the `FlowController` state machine
//!   that keeps exactly one flow running
//! - Implement the flows:
//!   - `LiveFlow` — occupancy simulation scheduler
//!   - `ManualFlow` — hands the lights over to an operator
//!   - `ReplayFlow` — loops a recorded sequence
//!
//! ## Dependency rule
//! Depends on `khrushchevka-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod flow;
pub mod flows;
pub mod ports;
