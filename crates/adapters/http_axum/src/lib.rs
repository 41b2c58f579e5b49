//! # khrushchevka-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Expose the flow controller: list flows, switch the active one
//! - Drive single lights directly (board validation while in `manual`)
//! - Serve the building map and the current state of every light
//! - Trigger snapshots for later replay
//! - Stream light changes to the browser as Server-Sent Events
//!
//! ## Dependency rule
//! Depends on `khrushchevka-app` (port traits, flow controller) and
//! `khrushchevka-domain` (types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
