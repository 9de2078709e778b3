//! Reconciliation engine between translation stores and filesystem backends
//!
//! Translated content lives in two namespaces at once: the database
//! side, one store per hierarchical logical path, and an external
//! filesystem/VCS tree. This crate discovers which logical paths
//! correspond to which filesystem paths, detects divergence between the
//! two, and drives pull (fs → db) and push (db → fs) synchronization
//! with per-pair failure isolation.
//!
//! # Architecture
//!
//! ```text
//!                SyncEngine (per-project pass, advisory lock)
//!                     |
//!        +------------+-------------+
//!        |            |             |
//!  ResourceIndex  FsBackend    SyncExecutor
//!   (db listing)  (discovery,   (applies verdicts)
//!        |         probes)          |
//!     StoreDb   BackendRegistry  StoreDb + FsBackend
//! ```
//!
//! One pass unions the database index with backend discovery, pairs the
//! entries through the backend's path mapping, snapshots the change
//! facts into [`TrackedPair`]s, classifies each with the pure
//! [`classify`] function, and hands the verdicts to the executor.
//! Conflicts are surfaced, never auto-resolved.

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod lock;
pub mod pair;
pub mod plugin;
pub mod rules;
pub mod state;
pub mod sync;

pub use config::{FS_TYPE_KEY, FS_URL_KEY, ProjectConfig};
pub use db::{MemoryDb, StoreDb, StoreRecord, SyncRecord};
pub use error::{Error, Result};
pub use index::ResourceIndex;
pub use lock::ProjectLock;
pub use pair::TrackedPair;
pub use plugin::{
    BackendContext, BackendFactory, BackendRegistry, ChangedBackend, DirBackend, EmptyBackend,
    FileProbe, FsBackend, MirrorBackend, SnapshotBackend,
};
pub use rules::{LogicalPredicate, MatchRule, RuleSet};
pub use state::{SyncState, classify};
pub use sync::{PairFailure, SyncBatch, SyncEngine, SyncExecutor};
