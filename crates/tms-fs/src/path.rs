//! Normalized path keys for the two synchronized namespaces
//!
//! The engine reconciles two hierarchical namespaces: the database side,
//! keyed by [`LogicalPath`], and the external backend side, keyed by
//! [`FsPath`]. Both are stored as forward-slash strings so matching and
//! prefix queries behave identically across platforms; conversion to a
//! platform-native path happens only at I/O boundaries.

use std::path::{Path, PathBuf};

fn normalize_separators(raw: &str) -> String {
    raw.replace('\\', "/")
}

fn trim_trailing(mut s: String) -> String {
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// Hierarchical key identifying a translation store in the database
/// namespace, e.g. `/language0/project0/store0.po`.
///
/// Always absolute: a leading `/` is added during normalization if the
/// input lacks one. Unique per store within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalPath {
    inner: String,
}

impl LogicalPath {
    /// Create a new LogicalPath, normalizing separators and ensuring a
    /// leading slash.
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut normalized = trim_trailing(normalize_separators(path.as_ref()));
        if !normalized.starts_with('/') {
            normalized.insert(0, '/');
        }
        Self { inner: normalized }
    }

    /// Get the normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Check whether this path lies under the given prefix.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.inner.starts_with(prefix)
    }

    /// Check whether this path ends with the given suffix (typically a
    /// file name).
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.inner.ends_with(suffix)
    }

    /// Get the final path component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Append a segment below this path.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment.trim_start_matches('/')))
    }

    /// The path relative to the namespace root, without the leading slash.
    pub fn relative(&self) -> &str {
        self.inner.trim_start_matches('/')
    }
}

impl std::fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for LogicalPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LogicalPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Hierarchical key identifying content in the external backend
/// namespace, e.g. `/fs/language0/project0/store0.po`.
///
/// Derived deterministically from a [`LogicalPath`] by a per-backend
/// mapping function. Unlike LogicalPath no leading slash is enforced, so
/// rooted native paths (including drive-letter paths) survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FsPath {
    inner: String,
}

impl FsPath {
    /// Create a new FsPath, normalizing separators.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            inner: trim_trailing(normalize_separators(path.as_ref())),
        }
    }

    /// Get the normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Check whether this path lies under the given prefix.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.inner.starts_with(prefix)
    }

    /// Get the final path component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Append a segment below this path.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment.trim_start_matches('/')))
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }
}

impl AsRef<Path> for FsPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for FsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for FsPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FsPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for FsPath {
    fn from(p: &Path) -> Self {
        Self::new(p.to_string_lossy().as_ref())
    }
}
