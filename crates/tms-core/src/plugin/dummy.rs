//! Conformance backend variants
//!
//! Classifier and executor behavior must be exercised under backend
//! states that are hard to reproduce with a live checkout: nothing
//! checked out yet, a backend view stale relative to the database, or
//! files edited externally. The backend trait is the seam where those
//! states are injected, so these variants ship with the engine rather
//! than with any single test suite.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tms_fs::{FsPath, LogicalPath, WildcardPattern, fingerprint};

use crate::plugin::{BackendContext, Discovered, FileProbe, FsBackend};
use crate::Result;

/// Prefix the mirror mapping puts in front of every logical path.
const MIRROR_PREFIX: &str = "/fs";

/// In-memory backend mapping logical path `p` to `/fs{p}`.
///
/// Discovery enumerates the live database index under the mapping, so a
/// store added between two scans shows up on the second scan.
pub struct MirrorBackend {
    ctx: BackendContext,
    files: RwLock<BTreeMap<FsPath, String>>,
}

impl MirrorBackend {
    pub fn new(ctx: BackendContext) -> Self {
        Self {
            ctx,
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Place backend content at the path the mapping assigns to a
    /// logical path.
    pub fn stage(&self, logical: &LogicalPath, content: &str) {
        let fs_path = self.map_path(logical);
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(fs_path, content.to_string());
    }

    /// Remove staged content.
    pub fn unstage(&self, logical: &LogicalPath) {
        let fs_path = self.map_path(logical);
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&fs_path);
    }

    fn content_at(&self, path: &FsPath) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
    }
}

impl FsBackend for MirrorBackend {
    fn map_path(&self, logical: &LogicalPath) -> FsPath {
        FsPath::new(format!("{}{}", MIRROR_PREFIX, logical.as_str()))
    }

    fn discover<'a>(
        &'a self,
        fs_pattern: Option<&'a WildcardPattern>,
        logical_pattern: Option<&'a WildcardPattern>,
    ) -> Result<Discovered<'a>> {
        let stores = self.ctx.db.stores(&self.ctx.project)?;
        Ok(Box::new(filtered_pairs(
            stores,
            fs_pattern,
            logical_pattern,
            |logical| self.map_path(logical),
        )))
    }

    fn probe(&self, path: &FsPath) -> Result<FileProbe> {
        Ok(match self.content_at(path) {
            Some(content) => FileProbe::of_content(&content),
            None => FileProbe::missing(),
        })
    }

    fn read(&self, path: &FsPath) -> Result<Option<String>> {
        Ok(self.content_at(path))
    }

    fn write(&self, path: &FsPath, content: &str) -> Result<()> {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.clone(), content.to_string());
        Ok(())
    }

    fn remove(&self, path: &FsPath) -> Result<()> {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(path);
        Ok(())
    }
}

/// Apply both wildcard filters to a stream of logical paths under a
/// mapping function. Logical filter first, then the mapped fs path.
fn filtered_pairs<'a>(
    paths: Vec<LogicalPath>,
    fs_pattern: Option<&'a WildcardPattern>,
    logical_pattern: Option<&'a WildcardPattern>,
    map_path: impl Fn(&LogicalPath) -> FsPath + 'a,
) -> impl Iterator<Item = (LogicalPath, FsPath)> + 'a {
    paths.into_iter().filter_map(move |logical| {
        if let Some(pattern) = logical_pattern
            && !pattern.matches(logical.as_str())
        {
            return None;
        }
        let fs_path = map_path(&logical);
        if let Some(pattern) = fs_pattern
            && !pattern.matches(fs_path.as_str())
        {
            return None;
        }
        Some((logical, fs_path))
    })
}

/// Backend with nothing checked out: discovery always yields an empty
/// sequence, everything else is delegated.
pub struct EmptyBackend {
    inner: Box<dyn FsBackend>,
}

impl EmptyBackend {
    pub fn wrap(inner: Box<dyn FsBackend>) -> Self {
        Self { inner }
    }
}

impl FsBackend for EmptyBackend {
    fn map_path(&self, logical: &LogicalPath) -> FsPath {
        self.inner.map_path(logical)
    }

    fn discover<'a>(
        &'a self,
        _fs_pattern: Option<&'a WildcardPattern>,
        _logical_pattern: Option<&'a WildcardPattern>,
    ) -> Result<Discovered<'a>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn probe(&self, path: &FsPath) -> Result<FileProbe> {
        self.inner.probe(path)
    }

    fn read(&self, path: &FsPath) -> Result<Option<String>> {
        self.inner.read(path)
    }

    fn write(&self, path: &FsPath, content: &str) -> Result<()> {
        self.inner.write(path, content)
    }

    fn remove(&self, path: &FsPath) -> Result<()> {
        self.inner.remove(path)
    }
}

/// Backend whose view of the database is stale: the logical-path listing
/// is captured once at construction and keeps being served even after
/// the backing rows are deleted or marked obsolete.
pub struct SnapshotBackend {
    snapshot: Vec<LogicalPath>,
    inner: Box<dyn FsBackend>,
}

impl SnapshotBackend {
    /// Capture the current index of the wrapped backend's project.
    pub fn capture(ctx: &BackendContext, inner: Box<dyn FsBackend>) -> Result<Self> {
        let snapshot = ctx.db.stores(&ctx.project)?;
        Ok(Self { snapshot, inner })
    }

    /// Build from an explicit listing.
    pub fn with_snapshot(snapshot: Vec<LogicalPath>, inner: Box<dyn FsBackend>) -> Self {
        Self { snapshot, inner }
    }
}

impl FsBackend for SnapshotBackend {
    fn map_path(&self, logical: &LogicalPath) -> FsPath {
        self.inner.map_path(logical)
    }

    fn discover<'a>(
        &'a self,
        fs_pattern: Option<&'a WildcardPattern>,
        logical_pattern: Option<&'a WildcardPattern>,
    ) -> Result<Discovered<'a>> {
        Ok(Box::new(filtered_pairs(
            self.snapshot.clone(),
            fs_pattern,
            logical_pattern,
            |logical| self.inner.map_path(logical),
        )))
    }

    fn probe(&self, path: &FsPath) -> Result<FileProbe> {
        self.inner.probe(path)
    }

    fn read(&self, path: &FsPath) -> Result<Option<String>> {
        self.inner.read(path)
    }

    fn write(&self, path: &FsPath, content: &str) -> Result<()> {
        self.inner.write(path, content)
    }

    fn remove(&self, path: &FsPath) -> Result<()> {
        self.inner.remove(path)
    }
}

/// Backend whose files always look externally modified: every probe
/// reports a fingerprint that can never match a recorded one, forcing
/// `fs_changed` on every produced pair.
pub struct ChangedBackend {
    inner: Box<dyn FsBackend>,
}

impl ChangedBackend {
    pub fn wrap(inner: Box<dyn FsBackend>) -> Self {
        Self { inner }
    }
}

impl FsBackend for ChangedBackend {
    fn map_path(&self, logical: &LogicalPath) -> FsPath {
        self.inner.map_path(logical)
    }

    fn discover<'a>(
        &'a self,
        fs_pattern: Option<&'a WildcardPattern>,
        logical_pattern: Option<&'a WildcardPattern>,
    ) -> Result<Discovered<'a>> {
        self.inner.discover(fs_pattern, logical_pattern)
    }

    fn probe(&self, path: &FsPath) -> Result<FileProbe> {
        let mut probe = self.inner.probe(path)?;
        if probe.exists {
            // Recorded fingerprints are plain content hashes; the
            // "changed:" marker guarantees a mismatch.
            probe.fingerprint = Some(format!(
                "changed:{}",
                probe.fingerprint.unwrap_or_else(|| fingerprint::of_content(""))
            ));
        }
        Ok(probe)
    }

    fn read(&self, path: &FsPath) -> Result<Option<String>> {
        self.inner.read(path)
    }

    fn write(&self, path: &FsPath, content: &str) -> Result<()> {
        self.inner.write(path, content)
    }

    fn remove(&self, path: &FsPath) -> Result<()> {
        self.inner.remove(path)
    }
}
