//! Single-instance guard for mutating operations.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::SwitchError;

/// Exclusive advisory lock on the switch lock file.
///
/// Released when dropped.
#[derive(Debug)]
pub struct SwitchLock {
    file: File,
    path: PathBuf,
}

impl SwitchLock {
    /// Take the lock or fail immediately with [`SwitchError::Busy`].
    pub fn acquire(path: &Path) -> Result<Self, SwitchError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SwitchError::io(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| SwitchError::io(path, e))?;

        if file.try_lock_exclusive().is_err() {
            tracing::warn!(lock = %path.display(), "lock held by another process");
            return Err(SwitchError::Busy {
                path: path.to_path_buf(),
            });
        }

        tracing::trace!(lock = %path.display(), "lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SwitchLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
