//! Reconciliation pass orchestration
//!
//! A [`SyncEngine`] owns everything one project needs for a pass: the
//! validated configuration, the backend instantiated from the registry,
//! and the database handle. `state` produces the classified snapshot;
//! `pull` and `push` run classification-and-apply under the project
//! lock. Passes are bounded batch jobs triggered externally, not a
//! background service.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use tms_fs::{FsPath, LogicalPath};

use crate::config::ProjectConfig;
use crate::db::StoreDb;
use crate::index::ResourceIndex;
use crate::lock::ProjectLock;
use crate::pair::TrackedPair;
use crate::plugin::{BackendRegistry, FsBackend};
use crate::rules::MatchRule;
use crate::state::{SyncState, classify};
use crate::sync::{SyncBatch, SyncExecutor};
use crate::Result;

/// Engine for one project's filesystem synchronization.
pub struct SyncEngine {
    project: String,
    config: ProjectConfig,
    db: Arc<dyn StoreDb>,
    backend: Box<dyn FsBackend>,
    lock_dir: PathBuf,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("project", &self.project)
            .field("config", &self.config)
            .field("lock_dir", &self.lock_dir)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Create an engine, instantiating the backend the project is
    /// configured for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBackend`](crate::Error::UnknownBackend)
    /// if the configured `fs_type` has no registered factory.
    pub fn new(
        project: impl Into<String>,
        config: ProjectConfig,
        registry: &BackendRegistry,
        db: Arc<dyn StoreDb>,
        lock_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let project = project.into();
        let backend = registry.build(&config, &project, Arc::clone(&db))?;
        Ok(Self {
            project,
            config,
            db,
            backend,
            lock_dir: lock_dir.into(),
        })
    }

    /// Classify every pair in scope. Read-only; does not take the
    /// project lock.
    pub fn state(&self, rule: Option<&MatchRule>) -> Result<Vec<(TrackedPair, SyncState)>> {
        self.snapshot(rule)
    }

    /// Pull filesystem content into the database side for every pair the
    /// rule admits and the classifier marks `ToPull`.
    pub fn pull(&self, rule: Option<&MatchRule>) -> Result<SyncBatch> {
        let _lock = ProjectLock::acquire(&self.lock_dir, &self.project)?;
        let pairs = self.snapshot(rule)?;
        let batch = self.executor().pull(&pairs);
        info!(
            project = %self.project,
            succeeded = batch.succeeded.len(),
            failed = batch.failed.len(),
            conflicts = batch.conflicts.len(),
            "pull pass finished"
        );
        Ok(batch)
    }

    /// Push database content into the filesystem side for every pair the
    /// rule admits and the classifier marks `ToPush`.
    pub fn push(&self, rule: Option<&MatchRule>) -> Result<SyncBatch> {
        let _lock = ProjectLock::acquire(&self.lock_dir, &self.project)?;
        let pairs = self.snapshot(rule)?;
        let batch = self.executor().push(&pairs);
        info!(
            project = %self.project,
            succeeded = batch.succeeded.len(),
            failed = batch.failed.len(),
            conflicts = batch.conflicts.len(),
            "push pass finished"
        );
        Ok(batch)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn FsBackend {
        self.backend.as_ref()
    }

    fn executor(&self) -> SyncExecutor<'_> {
        SyncExecutor::new(self.db.as_ref(), self.backend.as_ref(), &self.project)
    }

    /// One consistent discovery pass: union the database-side index with
    /// backend discovery, deduplicate by logical path, snapshot the
    /// change facts and classify. Facts are captured once; rows deleted
    /// mid-pass cannot flip a verdict.
    fn snapshot(&self, rule: Option<&MatchRule>) -> Result<Vec<(TrackedPair, SyncState)>> {
        let index = ResourceIndex::new(Arc::clone(&self.db), self.project.clone());

        let mut candidates: BTreeMap<LogicalPath, FsPath> = BTreeMap::new();

        // Database side, filtered through the rule's logical half.
        let db_paths = match rule {
            Some(rule) => index.find(rule)?,
            None => index.stores()?,
        };
        for logical in db_paths {
            let fs_path = self.backend.map_path(&logical);
            if rule.is_none_or(|r| r.matches(&logical, &fs_path)) {
                candidates.insert(logical, fs_path);
            }
        }

        // Backend side, with the rule's patterns pushed into the scan.
        let fs_pattern = rule.and_then(|r| r.fs_pattern());
        let logical_pattern = rule.and_then(|r| r.logical_pattern());
        let discovered: Vec<_> = self
            .backend
            .discover(fs_pattern, logical_pattern)?
            .collect();
        for (logical, fs_path) in discovered {
            if rule.is_none_or(|r| r.matches(&logical, &fs_path)) {
                candidates.entry(logical).or_insert(fs_path);
            }
        }

        debug!(
            project = %self.project,
            pairs = candidates.len(),
            rule = rule.map(|r| r.name()).unwrap_or("<all>"),
            "classifying discovered pairs"
        );

        let mut classified = Vec::with_capacity(candidates.len());
        for (logical, fs_path) in candidates {
            let record = self.db.record(&self.project, &logical)?;
            let probe = self.backend.probe(&fs_path)?;
            let pair = TrackedPair::resolve(logical, fs_path, record.as_ref(), &probe);
            let state = classify(&pair);
            classified.push((pair, state));
        }
        Ok(classified)
    }
}
