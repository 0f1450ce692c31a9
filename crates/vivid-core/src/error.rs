//! Error types for configuration persistence.

use std::path::PathBuf;

/// Errors raised while loading or saving the settings file.
///
/// Domain conditions (unknown monitor, short arrays, full slot table) are not
/// errors; they are resolved in place.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no settings location: set VIVID_SETTINGS, XDG_CONFIG_HOME, or HOME")]
    NoLocation,
}
