//! Apply/unload/restore control flow.
//!
//! Every mutation follows the same sequence: lock, read, back up, compute,
//! persist. The lock is released when the operation returns.

use std::path::PathBuf;

use crate::backup::{BackupEntry, BackupManager};
use crate::config::Selection;
use crate::error::SwitchError;
use crate::lock::SwitchLock;
use crate::providers::{ProviderId, ProviderRegistry};
use crate::settings::{self, DetectedConfig, SettingsStore, SwitchPaths};

/// Outcome of a successful apply.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub backup: PathBuf,
    pub provider: ProviderId,
    pub region: String,
    pub model: String,
    /// Whether `hasCompletedOnboarding` is now set.
    pub onboarding_marked: bool,
}

/// Wires the store, backup manager and merge engine together.
pub struct Switcher<'a> {
    registry: &'a ProviderRegistry,
    paths: SwitchPaths,
    store: SettingsStore,
    backups: BackupManager,
}

impl<'a> Switcher<'a> {
    pub fn new(registry: &'a ProviderRegistry, paths: SwitchPaths) -> Self {
        let store = SettingsStore::new(&paths);
        let backups = BackupManager::new(paths.backup_dir.clone(), store.clone());
        Self {
            registry,
            paths,
            store,
            backups,
        }
    }

    pub fn paths(&self) -> &SwitchPaths {
        &self.paths
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Write `selection` into the settings file.
    pub fn apply(&self, selection: &Selection) -> Result<ApplyReport, SwitchError> {
        let provider =
            self.registry
                .get(selection.provider)
                .ok_or_else(|| SwitchError::UnknownProvider {
                    provider: selection.provider.to_string(),
                })?;

        let _lock = SwitchLock::acquire(&self.paths.lock_file)?;
        let current = self.store.read();
        let next = settings::apply(
            provider,
            &selection.region,
            &selection.model,
            selection.api_key.expose(),
            &current,
        )?;

        let backup = self.backups.create_backup()?;
        self.store.write(&next)?;
        let onboarding_marked = match self.store.mark_onboarding_complete() {
            Ok(marked) => marked,
            Err(e) => {
                tracing::warn!(error = %e, "settings applied, but the onboarding flag was not set");
                false
            }
        };

        tracing::info!(
            provider = %selection.provider,
            region = %selection.region,
            model = %selection.model,
            "provider applied"
        );
        Ok(ApplyReport {
            backup,
            provider: selection.provider,
            region: selection.region.clone(),
            model: selection.model.clone(),
            onboarding_marked,
        })
    }

    /// Remove every managed key. Returns the backup path, or `None` when
    /// there was nothing to remove (nothing is written in that case).
    pub fn unload(&self) -> Result<Option<PathBuf>, SwitchError> {
        let _lock = SwitchLock::acquire(&self.paths.lock_file)?;
        let current = self.store.read();
        let Some(next) = settings::unload(&current) else {
            tracing::info!("nothing to unload");
            return Ok(None);
        };

        let backup = self.backups.create_backup()?;
        self.store.write(&next)?;
        tracing::info!("provider configuration unloaded");
        Ok(Some(backup))
    }

    /// Restore a backup by file name or path. The current state is backed
    /// up first; the new backup's path is returned.
    pub fn restore(&self, name_or_path: &str) -> Result<PathBuf, SwitchError> {
        let path = self.backups.resolve(name_or_path);
        self.backups.verify(&path)?;

        let _lock = SwitchLock::acquire(&self.paths.lock_file)?;
        let safety = self.backups.create_backup()?;
        self.backups.restore_backup(&path)?;
        Ok(safety)
    }

    pub fn create_backup(&self) -> Result<PathBuf, SwitchError> {
        let _lock = SwitchLock::acquire(&self.paths.lock_file)?;
        self.backups.create_backup()
    }

    pub fn list_backups(&self) -> Result<Vec<BackupEntry>, SwitchError> {
        self.backups.list_backups()
    }

    pub fn prune_backups(&self, keep: usize) -> Result<Vec<PathBuf>, SwitchError> {
        let _lock = SwitchLock::acquire(&self.paths.lock_file)?;
        self.backups.prune(keep)
    }

    /// Describe the current settings without touching them.
    pub fn status(&self) -> DetectedConfig {
        settings::detect(self.registry, &self.store.read())
    }
}
