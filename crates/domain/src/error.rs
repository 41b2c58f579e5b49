//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`KhrushchevkaError`] via `#[from]` or an `into_domain` helper.

use crate::light::LightAddress;

/// Base error shared by ports, flows and adapters.
#[derive(Debug, thiserror::Error)]
pub enum KhrushchevkaError {
    /// The building map breaks an invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A light was addressed on a board that is not connected.
    #[error(transparent)]
    NoBoardConnected(#[from] NoBoardConnectedError),

    /// A flow name did not resolve in the registry.
    #[error(transparent)]
    FlowNotFound(#[from] FlowNotFoundError),

    /// The hardware driver failed for another reason.
    #[error("hardware error")]
    Hardware(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A snapshot or replay source is missing, unreadable or corrupt.
    #[error("persistence error")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Returned when a light address references an unknown board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no board connected at {:#04x} (pin {})", .addr.board, .addr.pin)]
pub struct NoBoardConnectedError {
    pub addr: LightAddress,
}

/// Returned by the flow controller for an unregistered flow name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("flow {name:?} not found")]
pub struct FlowNotFoundError {
    pub name: String,
}

/// Building map invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("building map has no lights")]
    EmptyBuilding,

    #[error("wall stub at level {level}, position {position} must not carry an address")]
    AddressedStub { level: usize, position: usize },

    #[error("light at level {level}, position {position} has no address")]
    MissingAddress { level: usize, position: usize },

    #[error("service light at level {level}, position {position} must not belong to unit {number}")]
    OwnedServiceLight {
        level: usize,
        position: usize,
        number: u32,
    },

    #[error("window at level {level}, position {position} has no unit number")]
    UnownedWindow { level: usize, position: usize },

    #[error("address {0} is used by more than one light")]
    DuplicateAddress(LightAddress),
}
