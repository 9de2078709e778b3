//! Backend plugin abstraction
//!
//! Heterogeneous filesystem/VCS backends expose a uniform discovery
//! contract through [`FsBackend`]: a deterministic logical→filesystem
//! path mapping, a lazy restartable discovery scan, and per-path content
//! probes and transfers. Backends are chosen at runtime by the project's
//! `fs_type` key, resolved against an explicit [`BackendRegistry`] that
//! is passed by reference to whatever constructs engines — there is no
//! global singleton, and providers can be unregistered without a process
//! restart.

mod dir;
mod dummy;

pub use dir::DirBackend;
pub use dummy::{ChangedBackend, EmptyBackend, MirrorBackend, SnapshotBackend};

use std::collections::HashMap;
use std::sync::Arc;

use tms_fs::{FsPath, LogicalPath, WildcardPattern};

use crate::config::ProjectConfig;
use crate::db::StoreDb;
use crate::{Error, Result};

/// Result of probing one filesystem path on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProbe {
    /// Whether content exists at the path
    pub exists: bool,
    /// Fingerprint of the content, when it exists and is readable
    pub fingerprint: Option<String>,
}

impl FileProbe {
    pub fn missing() -> Self {
        Self {
            exists: false,
            fingerprint: None,
        }
    }

    pub fn of_content(content: &str) -> Self {
        Self {
            exists: true,
            fingerprint: Some(tms_fs::fingerprint::of_content(content)),
        }
    }
}

/// Lazy discovery stream of (logical path, filesystem path) pairs.
pub type Discovered<'a> = Box<dyn Iterator<Item = (LogicalPath, FsPath)> + 'a>;

/// Uniform contract over filesystem/VCS backends.
pub trait FsBackend: Send + Sync {
    /// Map a logical path to its filesystem path. Pure and deterministic
    /// for a given backend configuration.
    fn map_path(&self, logical: &LogicalPath) -> FsPath;

    /// Enumerate matching path pairs.
    ///
    /// The sequence is finite and restartable — each call re-scans — and
    /// lazy, so a caller may stop mid-scan without materializing the
    /// rest. An absent pattern means no filter on that side.
    fn discover<'a>(
        &'a self,
        fs_pattern: Option<&'a WildcardPattern>,
        logical_pattern: Option<&'a WildcardPattern>,
    ) -> Result<Discovered<'a>>;

    /// Probe existence and content fingerprint at a filesystem path.
    fn probe(&self, path: &FsPath) -> Result<FileProbe>;

    /// Read content at a filesystem path, `None` if absent.
    fn read(&self, path: &FsPath) -> Result<Option<String>>;

    /// Write content at a filesystem path.
    fn write(&self, path: &FsPath, content: &str) -> Result<()>;

    /// Remove content at a filesystem path; absent paths are a no-op.
    fn remove(&self, path: &FsPath) -> Result<()>;
}

impl std::fmt::Debug for dyn FsBackend + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FsBackend")
    }
}

/// Everything a backend factory gets to work with.
#[derive(Clone)]
pub struct BackendContext {
    /// Project code the backend serves
    pub project: String,
    /// Backend location from the project's `fs_url` key
    pub fs_url: String,
    /// Database-side handle for index-driven discovery
    pub db: Arc<dyn StoreDb>,
}

/// Constructor for one backend family.
pub type BackendFactory = Box<dyn Fn(&BackendContext) -> Result<Box<dyn FsBackend>> + Send + Sync>;

/// Explicit, process-scoped registry mapping `fs_type` names to backend
/// factories.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in backends.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("localfs", Box::new(|ctx| Ok(Box::new(DirBackend::new(ctx.clone())))));
        registry
    }

    /// Register a factory under a backend-type name, replacing any
    /// previous factory with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: BackendFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Remove a factory. Returns whether one was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered backend-type names (sorted).
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Instantiate the backend a project is configured for.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBackend`] if no factory is registered
    /// under the configured `fs_type` — a configuration error, surfaced
    /// before any pair is touched.
    pub fn build(
        &self,
        config: &ProjectConfig,
        project: &str,
        db: Arc<dyn StoreDb>,
    ) -> Result<Box<dyn FsBackend>> {
        let factory = self
            .factories
            .get(&config.fs_type)
            .ok_or_else(|| Error::UnknownBackend {
                fs_type: config.fs_type.clone(),
            })?;
        let ctx = BackendContext {
            project: project.to_string(),
            fs_url: config.fs_url.clone(),
            db,
        };
        factory(&ctx)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
