//! # khrushchevka-domain
//!
//! Pure domain model for the khrushchevka installation: a scale-model
//! apartment block whose window lights are switched through GPIO expander
//! boards to look lived-in at night.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy
//! - Define **Lights** (kind, owning unit, hardware address)
//! - Define the **Building map** (levels of lights, read-only after load)
//! - Generate **Window schedules** (randomized on/off timelines)
//! - Contain all invariant enforcement (map validation)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;

pub mod building;
pub mod light;
pub mod schedule;
