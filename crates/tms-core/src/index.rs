//! Read-only view over the database-side namespace
//!
//! A [`ResourceIndex`] enumerates the logical paths belonging to one
//! project, optionally filtered through a match rule's logical side. The
//! listing is memoized for the duration of one reconciliation pass so
//! facts captured early in the pass cannot flip mid-pass; a fresh index
//! is constructed per pass and [`invalidate`](ResourceIndex::invalidate)
//! drops the cache explicitly.

use std::sync::{Arc, Mutex};

use tms_fs::LogicalPath;

use crate::db::StoreDb;
use crate::rules::MatchRule;
use crate::Result;

/// Per-pass view of a project's stores.
pub struct ResourceIndex {
    db: Arc<dyn StoreDb>,
    project: String,
    cache: Mutex<Option<Vec<LogicalPath>>>,
}

impl ResourceIndex {
    pub fn new(db: Arc<dyn StoreDb>, project: impl Into<String>) -> Self {
        Self {
            db,
            project: project.into(),
            cache: Mutex::new(None),
        }
    }

    /// All logical paths for the project, in storage order.
    ///
    /// The first call queries the database; later calls within the same
    /// pass return the memoized listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`](crate::Error::ProjectNotFound)
    /// for an unknown project key.
    pub fn stores(&self) -> Result<Vec<LogicalPath>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }
        let stores = self.db.stores(&self.project)?;
        *cache = Some(stores.clone());
        Ok(stores)
    }

    /// Logical paths passing the rule's logical-side filter.
    ///
    /// Only the predicate and logical pattern apply; the fs-side pattern
    /// has no meaning in the database namespace.
    pub fn find(&self, rule: &MatchRule) -> Result<Vec<LogicalPath>> {
        Ok(self
            .stores()?
            .into_iter()
            .filter(|path| rule.matches_logical(path))
            .collect())
    }

    /// Drop the memoized listing so the next call re-queries.
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}
