//! Timestamped snapshots of `settings.json`.
//!
//! Backups are named `settings-<YYYY-MM-DDTHH-MM-SS>.json`. A second backup
//! within the same second gets a `_NN` counter; `_` sorts after `.`, so
//! lexicographic-descending order stays newest-first.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::error::SwitchError;
use crate::settings::{SettingsDocument, SettingsStore};

const PREFIX: &str = "settings-";
const SUFFIX: &str = ".json";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";
const MAX_COLLISIONS: u32 = 99;
const EMPTY_DOCUMENT: &[u8] = b"{}\n";

/// One backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub name: String,
    pub timestamp: NaiveDateTime,
}

/// Creates, lists and restores backups of the settings file.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    store: SettingsStore,
}

impl BackupManager {
    pub fn new(dir: PathBuf, store: SettingsStore) -> Self {
        Self { dir, store }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot the current settings file (or `{}` if there is none).
    pub fn create_backup(&self) -> Result<PathBuf, SwitchError> {
        self.create_backup_at(Local::now().naive_local())
    }

    /// Snapshot with an explicit timestamp.
    pub fn create_backup_at(&self, now: NaiveDateTime) -> Result<PathBuf, SwitchError> {
        let content = self
            .store
            .read_raw()?
            .unwrap_or_else(|| EMPTY_DOCUMENT.to_vec());
        fs::create_dir_all(&self.dir).map_err(|e| SwitchError::io(&self.dir, e))?;

        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        for attempt in 0..=MAX_COLLISIONS {
            let name = if attempt == 0 {
                format!("{PREFIX}{stamp}{SUFFIX}")
            } else {
                format!("{PREFIX}{stamp}_{attempt:02}{SUFFIX}")
            };
            let path = self.dir.join(&name);

            match create_exclusive(&path, |file| {
                file.write_all(&content)?;
                file.sync_all()
            }) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(SwitchError::io(&path, e)),
            }

            tracing::info!(backup = %path.display(), "settings backed up");
            return Ok(path);
        }

        Err(SwitchError::io(
            &self.dir,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("too many backups for {stamp}"),
            ),
        ))
    }

    /// All backups, newest first. Unrelated files in the directory are
    /// ignored; a missing directory yields an empty list.
    pub fn list_backups(&self) -> Result<Vec<BackupEntry>, SwitchError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SwitchError::io(&self.dir, e)),
        };

        let mut backups: Vec<BackupEntry> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let timestamp = parse_backup_name(&name)?;
                Some(BackupEntry {
                    path: entry.path(),
                    name,
                    timestamp,
                })
            })
            .collect();

        backups.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(backups)
    }

    /// Accept either a bare backup file name or a path.
    pub fn resolve(&self, name_or_path: &str) -> PathBuf {
        let candidate = Path::new(name_or_path);
        if candidate.components().count() == 1 && !candidate.exists() {
            self.dir.join(candidate)
        } else {
            candidate.to_path_buf()
        }
    }

    /// Read a backup and check that it parses as a settings document.
    pub fn verify(&self, path: &Path) -> Result<Vec<u8>, SwitchError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SwitchError::BackupNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(SwitchError::io(path, e)),
        };

        SettingsDocument::parse(&bytes).map_err(|source| SwitchError::InvalidBackupContent {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(bytes)
    }

    /// Overwrite the live settings file with the backup's bytes verbatim.
    pub fn restore_backup(&self, path: &Path) -> Result<(), SwitchError> {
        let bytes = self.verify(path)?;
        self.store.write_bytes(&bytes)?;
        tracing::info!(backup = %path.display(), "settings restored");
        Ok(())
    }

    /// Delete all but the newest `keep` backups. Returns the removed paths.
    pub fn prune(&self, keep: usize) -> Result<Vec<PathBuf>, SwitchError> {
        let mut removed = Vec::new();
        for entry in self.list_backups()?.into_iter().skip(keep) {
            fs::remove_file(&entry.path).map_err(|e| SwitchError::io(&entry.path, e))?;
            removed.push(entry.path);
        }
        if !removed.is_empty() {
            tracing::info!(count = removed.len(), "old backups pruned");
        }
        Ok(removed)
    }
}

/// Create `path` (failing if it exists) and fill it. A file that fails to
/// fill is removed so no partial backup is ever listed.
fn create_exclusive(
    path: &Path,
    fill: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = fill(&mut file) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!(backup = %path.display(), error = %cleanup, "failed to remove partial backup");
        }
        return Err(e);
    }
    Ok(())
}

/// Timestamp embedded in a backup file name, or `None` if the name does
/// not follow the backup pattern.
fn parse_backup_name(name: &str) -> Option<NaiveDateTime> {
    let stem = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    let stamp = match stem.split_once('_') {
        Some((stamp, counter)) => {
            if counter.is_empty() || !counter.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            stamp
        }
        None => stem,
    };
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}
