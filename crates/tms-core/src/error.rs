//! Error types for tms-core

/// Result type for tms-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tms-core operations
///
/// Configuration-level errors (`ConfigMissing`, `UnknownBackend`,
/// `UnknownRule`, `ProjectNotFound`, `ProjectBusy`) abort a pass before
/// any pair is touched. `BackendIo` and `StoreWrite` are per-pair: during
/// the apply phase they are recorded against the failing pair in the
/// batch result instead of being raised.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required project configuration key is missing or empty
    #[error("Missing project configuration key: {key}")]
    ConfigMissing { key: String },

    /// No backend factory registered under the configured fs_type
    #[error("Unknown backend type: {fs_type}")]
    UnknownBackend { fs_type: String },

    /// No match rule registered under the given name
    #[error("Unknown match rule: {name}")]
    UnknownRule { name: String },

    /// Project key is not known to the store database
    #[error("Project not found: {project}")]
    ProjectNotFound { project: String },

    /// Another synchronization pass holds the project lock
    #[error("Project is locked by another synchronization pass: {project}")]
    ProjectBusy { project: String },

    /// Backend I/O failure for a single path
    #[error("Backend I/O error at {path}: {message}")]
    BackendIo { path: String, message: String },

    /// Database write failure for a single store
    #[error("Store write failed for {path}: {message}")]
    StoreWrite { path: String, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from tms-fs
    #[error(transparent)]
    Fs(#[from] tms_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn backend_io(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::BackendIo {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn store_write(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            path: path.to_string(),
            message: message.into(),
        }
    }
}
