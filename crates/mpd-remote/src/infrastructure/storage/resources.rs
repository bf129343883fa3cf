//! Loaders for the JSON key-map and icon resources.
//!
//! Both resources are read once at startup; failures are fatal there — the
//! agent cannot operate with a partial key table, and a misconfigured icon
//! path is better reported than ignored.

use std::path::{Path, PathBuf};

use thiserror::Error;

use mpd_remote_core::{IconError, IconTable, KeyMap, KeymapError};

/// Error type for resource loading.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource file could not be read.
    #[error("failed to read resource {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key-map resource is malformed or incomplete.
    #[error(transparent)]
    Keymap(#[from] KeymapError),

    /// The icon resource is malformed.
    #[error(transparent)]
    Icons(#[from] IconError),
}

/// Loads and validates the key-map resource.
///
/// # Errors
///
/// Returns [`ResourceError::Io`] if the file cannot be read and
/// [`ResourceError::Keymap`] if it fails validation.
pub fn load_keymap(path: &Path) -> Result<KeyMap, ResourceError> {
    let json = read(path)?;
    Ok(KeyMap::from_json(&json)?)
}

/// Loads and validates the icon resource.
///
/// # Errors
///
/// Returns [`ResourceError::Io`] if the file cannot be read and
/// [`ResourceError::Icons`] if any grid has the wrong dimensions.
pub fn load_icons(path: &Path) -> Result<IconTable, ResourceError> {
    let json = read(path)?;
    Ok(IconTable::from_json(&json)?)
}

fn read(path: &Path) -> Result<String, ResourceError> {
    std::fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
