//! Lights port — the capability set every flow drives the building through.

use std::sync::Arc;

use tokio::sync::broadcast;

use khrushchevka_domain::error::KhrushchevkaError;
use khrushchevka_domain::light::{LightAddress, PinState};

/// Hardware abstraction over the GPIO expander boards.
///
/// Implementations must tolerate concurrent [`set`](Self::set) calls from
/// many tasks: the live flow writes every window of every active unit from
/// its own task.
pub trait LightsController: Send + Sync {
    /// Switch a single light and broadcast the change to subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`KhrushchevkaError::NoBoardConnected`] when `addr.board` is
    /// not a known board, or a hardware error when the write fails.
    fn set(&self, addr: LightAddress, is_on: bool) -> Result<(), KhrushchevkaError>;

    /// Read back the current state of a light.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    fn is_on(&self, addr: LightAddress) -> Result<bool, KhrushchevkaError>;

    /// Force every line of every known board off.
    ///
    /// # Errors
    ///
    /// Returns a hardware error when any board rejects the write.
    fn reset(&self) -> Result<(), KhrushchevkaError>;

    /// Subscribe to light changes.
    ///
    /// Delivery is best effort: a receiver that falls behind loses the
    /// oldest notifications instead of slowing writers down.
    fn subscribe(&self) -> broadcast::Receiver<PinState>;

    /// Known board addresses.
    fn boards(&self) -> Vec<u8>;
}

impl<T: LightsController + ?Sized> LightsController for Arc<T> {
    fn set(&self, addr: LightAddress, is_on: bool) -> Result<(), KhrushchevkaError> {
        (**self).set(addr, is_on)
    }

    fn is_on(&self, addr: LightAddress) -> Result<bool, KhrushchevkaError> {
        (**self).is_on(addr)
    }

    fn reset(&self) -> Result<(), KhrushchevkaError> {
        (**self).reset()
    }

    fn subscribe(&self) -> broadcast::Receiver<PinState> {
        (**self).subscribe()
    }

    fn boards(&self) -> Vec<u8> {
        (**self).boards()
    }
}
