//! Error types for switching operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while applying, unloading or restoring a profile.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Provider id is not in the registry
    #[error("Unknown provider '{provider}'")]
    UnknownProvider { provider: String },

    /// Region id is not declared by the provider
    #[error("Provider '{provider}' has no region '{region}'")]
    UnknownRegion { provider: String, region: String },

    /// Backup file does not exist
    #[error("Backup not found: {}", path.display())]
    BackupNotFound { path: PathBuf },

    /// Backup file is not a JSON object
    #[error("Backup '{}' is not a valid settings document: {source}", path.display())]
    InvalidBackupContent {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Persisting a document failed
    #[error("Failed to write '{}': {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other filesystem failure
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another instance holds the switch lock
    #[error("Another claude-switch instance is running (lock: {})", path.display())]
    Busy { path: PathBuf },

    /// App config could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SwitchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SwitchError::Io {
            path: path.into(),
            source,
        }
    }
}
