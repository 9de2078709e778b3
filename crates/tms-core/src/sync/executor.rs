//! Verdict application
//!
//! The executor acts on verdicts it is given; it never reclassifies, so
//! classification and action stay independently auditable. Each pair is
//! processed on its own: a backend or database failure is recorded
//! against that pair and the batch continues. The durable fingerprint is
//! updated only after a pair's transfer has fully completed, so a
//! cancelled or failed pair leaves no partial sync record.

use tracing::{debug, warn};

use tms_fs::fingerprint;

use crate::db::StoreDb;
use crate::pair::TrackedPair;
use crate::plugin::FsBackend;
use crate::state::SyncState;
use crate::sync::SyncBatch;
use crate::{Error, Result};

/// Applies pull/push verdicts for one project.
pub struct SyncExecutor<'a> {
    db: &'a dyn StoreDb,
    backend: &'a dyn FsBackend,
    project: &'a str,
}

impl<'a> SyncExecutor<'a> {
    pub fn new(db: &'a dyn StoreDb, backend: &'a dyn FsBackend, project: &'a str) -> Self {
        Self {
            db,
            backend,
            project,
        }
    }

    /// Copy backend content into the database side for every `ToPull`
    /// pair. Any other verdict is a no-op for that pair; conflicts are
    /// partitioned out untouched.
    pub fn pull(&self, pairs: &[(TrackedPair, SyncState)]) -> SyncBatch {
        self.apply(pairs, SyncState::ToPull, |pair| self.pull_one(pair))
    }

    /// Copy database content into the filesystem side for every `ToPush`
    /// pair. Symmetric to [`pull`](Self::pull).
    pub fn push(&self, pairs: &[(TrackedPair, SyncState)]) -> SyncBatch {
        self.apply(pairs, SyncState::ToPush, |pair| self.push_one(pair))
    }

    fn apply(
        &self,
        pairs: &[(TrackedPair, SyncState)],
        wanted: SyncState,
        mut action: impl FnMut(&TrackedPair) -> Result<()>,
    ) -> SyncBatch {
        let mut batch = SyncBatch::new();
        for (pair, state) in pairs {
            let logical = pair.logical_path().as_str();
            match state {
                SyncState::Conflict => {
                    debug!(project = self.project, path = logical, "conflict, left untouched");
                    batch.record_conflict(logical);
                }
                state if *state == wanted => match action(pair) {
                    Ok(()) => {
                        debug!(project = self.project, path = logical, verdict = %state, "applied");
                        batch.record_success(logical);
                    }
                    Err(e) => {
                        warn!(project = self.project, path = logical, error = %e, "pair failed");
                        batch.record_failure(logical, e.to_string());
                    }
                },
                _ => batch.record_skip(logical),
            }
        }
        batch
    }

    fn pull_one(&self, pair: &TrackedPair) -> Result<()> {
        let content = self
            .backend
            .read(pair.fs_path())?
            .ok_or_else(|| Error::backend_io(pair.fs_path(), "file vanished before pull"))?;
        self.db
            .write_store(self.project, pair.logical_path(), &content)?;
        // Fingerprint only after the content write has landed.
        self.db.mark_synced(
            self.project,
            pair.logical_path(),
            pair.fs_path(),
            &fingerprint::of_content(&content),
        )
    }

    fn push_one(&self, pair: &TrackedPair) -> Result<()> {
        let record = self
            .db
            .record(self.project, pair.logical_path())?
            .ok_or_else(|| Error::store_write(pair.logical_path(), "store vanished before push"))?;
        self.backend.write(pair.fs_path(), &record.content)?;
        self.db.mark_synced(
            self.project,
            pair.logical_path(),
            pair.fs_path(),
            &fingerprint::of_content(&record.content),
        )
    }
}
