//! Snapshot-file error type.

use std::path::PathBuf;

use khrushchevka_domain::error::KhrushchevkaError;

/// Errors originating from the snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The file could not be opened.
    #[error("couldn't open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing an open file failed.
    #[error("snapshot file i/o error")]
    Io(#[from] std::io::Error),

    /// A recorded line is not a valid frame.
    #[error("invalid frame on line {line}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A frame could not be serialized.
    #[error("couldn't encode frame")]
    Encode(#[source] serde_json::Error),
}

impl From<SnapshotError> for KhrushchevkaError {
    fn from(err: SnapshotError) -> Self {
        Self::Persistence(Box::new(err))
    }
}
