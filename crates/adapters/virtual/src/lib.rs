//! # khrushchevka-adapter-virtual
//!
//! In-memory implementation of [`LightsController`]. Each configured board is
//! an MCP23017 output latch kept in memory, so the whole daemon (flows, HTTP
//! API, snapshots, replays) runs without any I²C hardware attached.
//!
//! ## Dependency rule
//!
//! Depends on `khrushchevka-app` (port traits) and `khrushchevka-domain` only.

mod latch;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use khrushchevka_app::ports::LightsController;
use khrushchevka_domain::error::{KhrushchevkaError, NoBoardConnectedError};
use khrushchevka_domain::light::{LightAddress, PinState};

use latch::OutputLatch;

/// Simulated expander boards, safe to share between any number of tasks.
pub struct VirtualLights {
    latches: Mutex<BTreeMap<u8, OutputLatch>>,
    changes: broadcast::Sender<PinState>,
}

impl VirtualLights {
    /// Number of change notifications a subscriber may fall behind by.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Simulate `boards`, every line off.
    pub fn new(boards: impl IntoIterator<Item = u8>) -> Self {
        Self::with_capacity(boards, Self::DEFAULT_CAPACITY)
    }

    /// Same as [`new`](Self::new) with a custom notification buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(boards: impl IntoIterator<Item = u8>, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity);
        Self {
            latches: Mutex::new(
                boards
                    .into_iter()
                    .map(|board| (board, OutputLatch::default()))
                    .collect(),
            ),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<u8, OutputLatch>> {
        self.latches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, addr: LightAddress, is_on: bool) {
        // no subscribers is fine
        let _ = self.changes.send(PinState::now(addr, is_on));
    }
}

impl LightsController for VirtualLights {
    fn set(&self, addr: LightAddress, is_on: bool) -> Result<(), KhrushchevkaError> {
        {
            let mut latches = self.lock();
            let latch = latches
                .get_mut(&addr.board)
                .ok_or(NoBoardConnectedError { addr })?;
            latch.write(addr.pin, is_on);
        }
        tracing::trace!(board = addr.board, pin = %addr.pin, is_on, "light switched");
        self.notify(addr, is_on);
        Ok(())
    }

    fn is_on(&self, addr: LightAddress) -> Result<bool, KhrushchevkaError> {
        self.lock()
            .get(&addr.board)
            .map(|latch| latch.read(addr.pin))
            .ok_or_else(|| NoBoardConnectedError { addr }.into())
    }

    fn reset(&self) -> Result<(), KhrushchevkaError> {
        let switched_off: Vec<LightAddress> = self
            .lock()
            .iter_mut()
            .flat_map(|(&board, latch)| {
                latch
                    .clear()
                    .into_iter()
                    .map(move |pin| LightAddress::new(board, pin))
            })
            .collect();

        tracing::debug!(lights = switched_off.len(), "all boards reset");
        for addr in switched_off {
            self.notify(addr, false);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PinState> {
        self.changes.subscribe()
    }

    fn boards(&self) -> Vec<u8> {
        self.lock().keys().copied().collect()
    }
}
