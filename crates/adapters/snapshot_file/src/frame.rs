//! One line of a recording.

use serde::{Deserialize, Serialize};

use khrushchevka_domain::light::{LightAddress, Pin};

use crate::error::SnapshotError;

/// State of one light inside a frame: `{"board":32,"pin":"A0","is_on":true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLight {
    pub board: u8,
    pub pin: Pin,
    pub is_on: bool,
}

impl FrameLight {
    #[must_use]
    pub fn new(addr: LightAddress, is_on: bool) -> Self {
        Self {
            board: addr.board,
            pin: addr.pin,
            is_on,
        }
    }

    #[must_use]
    pub fn addr(&self) -> LightAddress {
        LightAddress::new(self.board, self.pin)
    }
}

/// Everything lit at one instant.
pub type Frame = Vec<FrameLight>;

/// Serialize `frame` as a single line, without the trailing newline.
pub(crate) fn encode(frame: &[FrameLight]) -> Result<String, SnapshotError> {
    serde_json::to_string(frame).map_err(SnapshotError::Encode)
}

/// Parse line number `line` (1-based) of a recording.
pub(crate) fn decode(line: usize, text: &str) -> Result<Frame, SnapshotError> {
    serde_json::from_str(text).map_err(|source| SnapshotError::Decode { line, source })
}
