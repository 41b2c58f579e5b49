//! Building map loading.

use std::path::{Path, PathBuf};

use khrushchevka_domain::building::BuildingMap;
use khrushchevka_domain::error::ValidationError;

/// Layout of the model as built, used when no map file is configured.
const BUILT_IN: &str = include_str!("../building.toml");

/// Errors raised while loading the building map.
#[derive(Debug, thiserror::Error)]
pub enum BuildingError {
    #[error("failed to read building map {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse building map")]
    Parse(#[from] toml::de::Error),
    #[error("invalid building map")]
    Invalid(#[from] ValidationError),
    #[error("board {0:#04x} is used by the building map but not configured")]
    UnknownBoard(u8),
}

/// Load the map from `map_file` (or the built-in layout) and check it
/// against the configured `boards`.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, when the map breaks an
/// invariant, or when a light sits on a board outside `boards`.
pub fn load(map_file: Option<&Path>, boards: &[u8]) -> Result<BuildingMap, BuildingError> {
    let map: BuildingMap = match map_file {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| BuildingError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => toml::from_str(BUILT_IN)?,
    };

    map.validate()?;
    if let Some(board) = map.boards().into_iter().find(|board| !boards.contains(board)) {
        return Err(BuildingError::UnknownBoard(board));
    }
    Ok(map)
}
