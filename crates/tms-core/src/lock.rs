//! Project-scoped advisory locking
//!
//! Two passes synchronizing the same project concurrently would race on
//! fingerprint updates, so a pass holds an exclusive advisory lock for
//! the duration of classification-and-apply. The lock is a file lock, so
//! it also serializes passes across processes, and it is released on
//! every exit path through `Drop`.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::{Error, Result};

/// Exclusive advisory lock for one project's synchronization pass.
#[derive(Debug)]
pub struct ProjectLock {
    file: File,
    path: PathBuf,
}

impl ProjectLock {
    /// Acquire the lock, failing immediately if another pass holds it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectBusy`] if the lock is already held, or an
    /// I/O error if the lock file cannot be created.
    pub fn acquire(lock_dir: &Path, project: &str) -> Result<Self> {
        fs::create_dir_all(lock_dir)?;
        let path = lock_dir.join(format!("{project}.lock"));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.try_lock_exclusive().map_err(|_| Error::ProjectBusy {
            project: project.to_string(),
        })?;
        debug!(project, path = %path.display(), "acquired project lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
