//! Tracked path pairs and their change facts
//!
//! A [`TrackedPair`] binds one logical path to its mapped filesystem path
//! and captures the existence and divergence facts for both sides at
//! construction time. Pairs are built fresh for every reconciliation
//! pass and discarded afterwards; the facts are a snapshot and are never
//! re-queried, so a row deleted mid-pass cannot flip a verdict.

use tms_fs::{FsPath, LogicalPath};

use crate::db::StoreRecord;
use crate::plugin::FileProbe;

/// One (logical path, filesystem path) binding plus derived change facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPair {
    logical_path: LogicalPath,
    fs_path: FsPath,
    exists_in_db: bool,
    exists_in_fs: bool,
    db_changed: bool,
    fs_changed: bool,
    obsolete: bool,
}

impl TrackedPair {
    /// Derive the change facts from a database row lookup and a backend
    /// content probe.
    ///
    /// Divergence is fingerprint-based, not existence-based: a file that
    /// exists and matches the last-synced fingerprint is unchanged. When
    /// no synchronization has ever been recorded and both sides exist,
    /// each side counts as changed iff the two content fingerprints
    /// differ — diverged content with no common ancestor must classify
    /// as a conflict, while byte-identical content is already in sync.
    pub fn resolve(
        logical_path: LogicalPath,
        fs_path: FsPath,
        record: Option<&StoreRecord>,
        probe: &FileProbe,
    ) -> Self {
        let exists_in_db = record.is_some();
        let exists_in_fs = probe.exists;
        let obsolete = record.is_some_and(|r| r.obsolete);

        let db_fingerprint = record.map(|r| r.content_fingerprint());
        let synced_fingerprint = record
            .and_then(|r| r.last_sync.as_ref())
            .map(|s| s.fingerprint.as_str());

        let (db_changed, fs_changed) = match (&db_fingerprint, synced_fingerprint) {
            (Some(db_fp), Some(base)) => (
                db_fp != base,
                probe.fingerprint.as_deref().is_some_and(|fs_fp| fs_fp != base),
            ),
            (Some(db_fp), None) => match probe.fingerprint.as_deref() {
                Some(fs_fp) => {
                    let diverged = db_fp != fs_fp;
                    (diverged, diverged)
                }
                None => (false, false),
            },
            // No database row: existence alone decides the verdict.
            (None, _) => (false, false),
        };

        Self {
            logical_path,
            fs_path,
            exists_in_db,
            exists_in_fs,
            db_changed,
            fs_changed,
            obsolete,
        }
    }

    /// Build a pair directly from its five facts.
    pub fn from_facts(
        logical_path: LogicalPath,
        fs_path: FsPath,
        exists_in_db: bool,
        exists_in_fs: bool,
        db_changed: bool,
        fs_changed: bool,
        obsolete: bool,
    ) -> Self {
        Self {
            logical_path,
            fs_path,
            exists_in_db,
            exists_in_fs,
            db_changed,
            fs_changed,
            obsolete,
        }
    }

    pub fn logical_path(&self) -> &LogicalPath {
        &self.logical_path
    }

    pub fn fs_path(&self) -> &FsPath {
        &self.fs_path
    }

    pub fn exists_in_db(&self) -> bool {
        self.exists_in_db
    }

    pub fn exists_in_fs(&self) -> bool {
        self.exists_in_fs
    }

    pub fn db_changed(&self) -> bool {
        self.db_changed
    }

    pub fn fs_changed(&self) -> bool {
        self.fs_changed
    }

    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }
}
