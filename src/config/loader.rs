use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::types::AppConfig;
use crate::providers::ProviderRegistry;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },

    #[error("Could not determine the home directory")]
    NoHomeDir,
}

impl AppConfig {
    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `AppConfig::default()`.
    /// - If the file exists, parses it as TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Writes the whole config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }

    /// Validates the saved selection against the registry.
    ///
    /// Checks:
    /// - The provider, if set, is known
    /// - The region, if set, belongs to that provider
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), ConfigError> {
        let Some(key) = self.provider.as_deref() else {
            return Ok(());
        };

        let provider = registry.find(key).ok_or_else(|| ConfigError::ValidationError {
            message: format!("Saved provider '{}' is not a known provider", key),
        })?;

        if let Some(region) = self.region.as_deref() {
            if provider.region(region).is_none() {
                return Err(ConfigError::ValidationError {
                    message: format!(
                        "Saved region '{}' not found for provider '{}'",
                        region, key
                    ),
                });
            }
        }

        Ok(())
    }
}
