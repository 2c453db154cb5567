//! File access for Claude Code's settings and onboarding documents.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::SettingsDocument;
use crate::config::ConfigError;
use crate::error::SwitchError;

const APP_DIR_NAME: &str = "claude-switch";
const ONBOARDING_FLAG: &str = "hasCompletedOnboarding";

/// Every file location the switcher touches.
///
/// Resolved once at startup and handed to the services that need it, so
/// tests can point everything at a temp directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPaths {
    /// Claude Code `settings.json`.
    pub settings_file: PathBuf,
    /// Claude Code `~/.claude.json` (onboarding flag lives here).
    pub onboarding_file: PathBuf,
    /// This tool's own TOML config.
    pub app_config_file: PathBuf,
    pub backup_dir: PathBuf,
    pub lock_file: PathBuf,
}

impl SwitchPaths {
    /// Standard locations for the current user.
    ///
    /// Honors `CLAUDE_CONFIG_DIR` for the settings directory, like Claude
    /// Code itself does.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        let claude_dir = std::env::var_os("CLAUDE_CONFIG_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude"));
        let app_dir = dirs::config_dir()
            .unwrap_or_else(|| home.join(".config"))
            .join(APP_DIR_NAME);

        Ok(Self::with_dirs(&claude_dir, home.join(".claude.json"), &app_dir))
    }

    /// All paths under a single root. Used by tests and `--root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self::with_dirs(
            &root.join(".claude"),
            root.join(".claude.json"),
            &root.join(APP_DIR_NAME),
        )
    }

    fn with_dirs(claude_dir: &Path, onboarding_file: PathBuf, app_dir: &Path) -> Self {
        Self {
            settings_file: claude_dir.join("settings.json"),
            onboarding_file,
            app_config_file: app_dir.join("config.toml"),
            backup_dir: app_dir.join("backups"),
            lock_file: app_dir.join("switch.lock"),
        }
    }
}

/// Reads and writes the managed settings document and the onboarding flag.
///
/// Reads are fail-soft: a missing or unparseable file is treated as an
/// empty document so the tool stays usable. Writes are atomic.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_file: PathBuf,
    onboarding_file: PathBuf,
}

impl SettingsStore {
    pub fn new(paths: &SwitchPaths) -> Self {
        Self {
            settings_file: paths.settings_file.clone(),
            onboarding_file: paths.onboarding_file.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.settings_file
    }

    /// Current settings, or an empty document when there are none.
    pub fn read(&self) -> SettingsDocument {
        read_document(&self.settings_file)
    }

    /// Raw bytes of the settings file, `None` if it does not exist.
    pub fn read_raw(&self) -> Result<Option<Vec<u8>>, SwitchError> {
        match fs::read(&self.settings_file) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SwitchError::io(&self.settings_file, e)),
        }
    }

    pub fn write(&self, doc: &SettingsDocument) -> Result<(), SwitchError> {
        let json = doc
            .to_pretty_json()
            .map_err(|e| SwitchError::StoreWrite {
                path: self.settings_file.clone(),
                source: e.into(),
            })?;
        write_atomic(&self.settings_file, json.as_bytes())?;
        tracing::info!(path = %self.settings_file.display(), "settings written");
        Ok(())
    }

    /// Replace the settings file with `bytes` verbatim.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), SwitchError> {
        write_atomic(&self.settings_file, bytes)
    }

    /// Set `hasCompletedOnboarding` so Claude Code skips its login flow.
    /// Other keys in the document are preserved.
    ///
    /// Returns `false` without writing when the document exists but is not
    /// a JSON object.
    pub fn mark_onboarding_complete(&self) -> Result<bool, SwitchError> {
        let doc = match fs::read(&self.onboarding_file) {
            Ok(bytes) => match SettingsDocument::parse(&bytes) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(
                        path = %self.onboarding_file.display(),
                        error = %e,
                        "onboarding document is not a JSON object, leaving it untouched"
                    );
                    return Ok(false);
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => SettingsDocument::new(),
            Err(e) => return Err(SwitchError::io(&self.onboarding_file, e)),
        };
        if doc.get(ONBOARDING_FLAG) == Some(&Value::Bool(true)) {
            return Ok(true);
        }

        let mut map = doc.into_map();
        map.insert(ONBOARDING_FLAG.to_string(), Value::Bool(true));
        let json = SettingsDocument::from(map)
            .to_pretty_json()
            .map_err(|e| SwitchError::StoreWrite {
                path: self.onboarding_file.clone(),
                source: e.into(),
            })?;
        write_atomic(&self.onboarding_file, json.as_bytes())?;
        tracing::debug!(path = %self.onboarding_file.display(), "onboarding flag set");
        Ok(true)
    }

    pub fn onboarding_complete(&self) -> bool {
        read_document(&self.onboarding_file).get(ONBOARDING_FLAG) == Some(&Value::Bool(true))
    }
}

fn read_document(path: &Path) -> SettingsDocument {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no document yet, using empty");
            return SettingsDocument::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read document, using empty");
            return SettingsDocument::new();
        }
    };

    SettingsDocument::parse(&bytes).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "unparseable document, using empty");
        SettingsDocument::new()
    })
}

/// Write through a temp file in the same directory and rename over the
/// target, so readers never see a partial file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SwitchError> {
    let to_err = |source: io::Error| SwitchError::StoreWrite {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(to_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(to_err)?;
    tmp.write_all(bytes).map_err(to_err)?;
    tmp.as_file().sync_all().map_err(to_err)?;
    tmp.persist(path).map_err(|e| to_err(e.error))?;
    Ok(())
}
