//! Store database seam
//!
//! The relational store holding translation content is an external
//! collaborator; the engine reaches it through the [`StoreDb`] trait.
//! The durable piece of synchronization state, the [`SyncRecord`]
//! fingerprint, lives here and is updated only by a successful executor
//! action via [`StoreDb::mark_synced`].
//!
//! [`MemoryDb`] is the in-process implementation used by the conformance
//! scenarios and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use tms_fs::{FsPath, LogicalPath, fingerprint};

use crate::{Error, Result};

/// State recorded at the last successful synchronization of one store.
#[derive(Debug, Clone)]
pub struct SyncRecord {
    /// Fingerprint of the content both sides agreed on
    pub fingerprint: String,
    /// Filesystem path the store was synchronized against
    pub fs_path: FsPath,
    /// When the synchronization completed
    pub synced_at: DateTime<Utc>,
}

/// One translation store row on the database side.
#[derive(Debug, Clone)]
pub struct StoreRecord {
    /// Logical path, unique within the project
    pub logical_path: LogicalPath,
    /// Current store content
    pub content: String,
    /// Marked as no longer live; excluded from active sync classification
    pub obsolete: bool,
    /// Last successful synchronization, if any
    pub last_sync: Option<SyncRecord>,
}

impl StoreRecord {
    pub fn new(logical_path: impl Into<LogicalPath>, content: impl Into<String>) -> Self {
        Self {
            logical_path: logical_path.into(),
            content: content.into(),
            obsolete: false,
            last_sync: None,
        }
    }

    /// Fingerprint of the current content.
    pub fn content_fingerprint(&self) -> String {
        fingerprint::of_content(&self.content)
    }
}

/// Read/write access to the database-side namespace.
///
/// `stores` and `record` are read-only and safe to call concurrently;
/// `write_store` and `mark_synced` are invoked only by the sync executor,
/// one pair at a time.
pub trait StoreDb: Send + Sync {
    /// Logical paths of all stores belonging to a project, in storage
    /// order (not guaranteed stable across calls).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] for an unknown project key.
    fn stores(&self, project: &str) -> Result<Vec<LogicalPath>>;

    /// Look up a single store row.
    fn record(&self, project: &str, path: &LogicalPath) -> Result<Option<StoreRecord>>;

    /// Write store content, creating the row if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreWrite`] on a per-store write failure.
    fn write_store(&self, project: &str, path: &LogicalPath, content: &str) -> Result<()>;

    /// Record a completed synchronization for one store.
    fn mark_synced(
        &self,
        project: &str,
        path: &LogicalPath,
        fs_path: &FsPath,
        fingerprint: &str,
    ) -> Result<()>;

    /// Mark a store as obsolete.
    fn mark_obsolete(&self, project: &str, path: &LogicalPath) -> Result<()>;

    /// Delete a store row entirely.
    fn remove_store(&self, project: &str, path: &LogicalPath) -> Result<()>;
}

type ProjectStores = BTreeMap<LogicalPath, StoreRecord>;

/// In-memory store database.
pub struct MemoryDb {
    projects: RwLock<BTreeMap<String, ProjectStores>>,
    // Logical paths whose writes fail, for exercising per-pair isolation
    failing_writes: RwLock<BTreeSet<LogicalPath>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(BTreeMap::new()),
            failing_writes: RwLock::new(BTreeSet::new()),
        }
    }

    /// Register a project key with no stores.
    pub fn add_project(&self, project: impl Into<String>) {
        let mut projects = write_guard(&self.projects);
        projects.entry(project.into()).or_default();
    }

    /// Insert a store row, creating the project if needed.
    pub fn insert(&self, project: &str, record: StoreRecord) {
        let mut projects = write_guard(&self.projects);
        projects
            .entry(project.to_string())
            .or_default()
            .insert(record.logical_path.clone(), record);
    }

    /// Make subsequent `write_store` calls fail for one logical path.
    pub fn inject_write_failure(&self, path: &LogicalPath) {
        write_guard(&self.failing_writes).insert(path.clone());
    }

    fn with_project<T>(
        &self,
        project: &str,
        f: impl FnOnce(&ProjectStores) -> T,
    ) -> Result<T> {
        let projects = read_guard(&self.projects);
        projects
            .get(project)
            .map(f)
            .ok_or_else(|| Error::ProjectNotFound {
                project: project.to_string(),
            })
    }

    fn with_project_mut<T>(
        &self,
        project: &str,
        f: impl FnOnce(&mut ProjectStores) -> T,
    ) -> Result<T> {
        let mut projects = write_guard(&self.projects);
        projects
            .get_mut(project)
            .map(f)
            .ok_or_else(|| Error::ProjectNotFound {
                project: project.to_string(),
            })
    }
}

impl Default for MemoryDb {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreDb for MemoryDb {
    fn stores(&self, project: &str) -> Result<Vec<LogicalPath>> {
        self.with_project(project, |stores| stores.keys().cloned().collect())
    }

    fn record(&self, project: &str, path: &LogicalPath) -> Result<Option<StoreRecord>> {
        self.with_project(project, |stores| stores.get(path).cloned())
    }

    fn write_store(&self, project: &str, path: &LogicalPath, content: &str) -> Result<()> {
        if read_guard(&self.failing_writes).contains(path) {
            return Err(Error::store_write(path, "injected write failure"));
        }
        self.with_project_mut(project, |stores| {
            stores
                .entry(path.clone())
                .or_insert_with(|| StoreRecord::new(path.clone(), ""))
                .content = content.to_string();
        })
    }

    fn mark_synced(
        &self,
        project: &str,
        path: &LogicalPath,
        fs_path: &FsPath,
        fingerprint: &str,
    ) -> Result<()> {
        self.with_project_mut(project, |stores| match stores.get_mut(path) {
            Some(record) => {
                record.last_sync = Some(SyncRecord {
                    fingerprint: fingerprint.to_string(),
                    fs_path: fs_path.clone(),
                    synced_at: Utc::now(),
                });
                Ok(())
            }
            None => Err(Error::store_write(path, "store does not exist")),
        })?
    }

    fn mark_obsolete(&self, project: &str, path: &LogicalPath) -> Result<()> {
        self.with_project_mut(project, |stores| {
            if let Some(record) = stores.get_mut(path) {
                record.obsolete = true;
            }
        })
    }

    fn remove_store(&self, project: &str, path: &LogicalPath) -> Result<()> {
        self.with_project_mut(project, |stores| {
            stores.remove(path);
        })
    }
}

fn read_guard<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_guard<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
