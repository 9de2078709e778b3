//! Local directory backend
//!
//! Serves a plain directory tree rooted at the project's `fs_url`. The
//! mapping prepends the root to the logical path, so `/language0/a.po`
//! lives at `<root>/language0/a.po`; discovery walks the tree lazily and
//! reverse-maps files, then adds any database-side entries the walk did
//! not cover so pairs missing on either side still surface.

use std::collections::BTreeSet;
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

use tracing::debug;

use tms_fs::{FsPath, LogicalPath, WildcardPattern, fingerprint, io};

use crate::plugin::{BackendContext, Discovered, FileProbe, FsBackend};
use crate::{Error, Result};

/// Backend over a local directory checkout.
pub struct DirBackend {
    ctx: BackendContext,
    root: PathBuf,
    root_key: String,
}

impl DirBackend {
    pub fn new(ctx: BackendContext) -> Self {
        let root_key = FsPath::new(&ctx.fs_url).as_str().to_string();
        let root = PathBuf::from(&ctx.fs_url);
        Self {
            ctx,
            root,
            root_key,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FsBackend for DirBackend {
    fn map_path(&self, logical: &LogicalPath) -> FsPath {
        FsPath::new(format!("{}{}", self.root_key, logical.as_str()))
    }

    fn discover<'a>(
        &'a self,
        fs_pattern: Option<&'a WildcardPattern>,
        logical_pattern: Option<&'a WildcardPattern>,
    ) -> Result<Discovered<'a>> {
        debug!(
            project = %self.ctx.project,
            root = %self.root.display(),
            "scanning directory backend"
        );
        let stores = self.ctx.db.stores(&self.ctx.project)?;

        let root = self.root.clone();
        let from_disk = DirWalk::start(&self.root).filter_map(move |native| {
            let rel = native.strip_prefix(&root).ok()?;
            Some(LogicalPath::new(format!("/{}", rel.to_string_lossy())))
        });

        let root_key = self.root_key.clone();
        let mut seen = BTreeSet::new();
        let iter = from_disk
            .chain(stores)
            .filter_map(move |logical| {
                if !seen.insert(logical.clone()) {
                    return None;
                }
                if let Some(pattern) = logical_pattern
                    && !pattern.matches(logical.as_str())
                {
                    return None;
                }
                let fs_path = FsPath::new(format!("{}{}", root_key, logical.as_str()));
                if let Some(pattern) = fs_pattern
                    && !pattern.matches(fs_path.as_str())
                {
                    return None;
                }
                Some((logical, fs_path))
            });
        Ok(Box::new(iter))
    }

    fn probe(&self, path: &FsPath) -> Result<FileProbe> {
        let native = path.to_native();
        if !native.is_file() {
            return Ok(FileProbe::missing());
        }
        let fingerprint =
            fingerprint::of_file(&native).map_err(|e| Error::backend_io(path, e.to_string()))?;
        Ok(FileProbe {
            exists: true,
            fingerprint: Some(fingerprint),
        })
    }

    fn read(&self, path: &FsPath) -> Result<Option<String>> {
        let native = path.to_native();
        if !native.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&native)
            .map(Some)
            .map_err(|e| Error::backend_io(path, e.to_string()))
    }

    fn write(&self, path: &FsPath, content: &str) -> Result<()> {
        io::write_atomic(&path.to_native(), content.as_bytes())
            .map_err(|e| Error::backend_io(path, e.to_string()))
    }

    fn remove(&self, path: &FsPath) -> Result<()> {
        match fs::remove_file(path.to_native()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::backend_io(path, e.to_string())),
        }
    }
}

/// Lazy depth-first walk yielding regular files under a root.
///
/// Dot-files are skipped; the atomic writer parks its temp files under
/// dot-prefixed names in the target directory.
struct DirWalk {
    stack: Vec<ReadDir>,
}

impl DirWalk {
    fn start(root: &Path) -> Self {
        Self {
            stack: fs::read_dir(root).into_iter().collect(),
        }
    }
}

impl Iterator for DirWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        while let Some(read_dir) = self.stack.last_mut() {
            match read_dir.next() {
                Some(Ok(entry)) => {
                    let path = entry.path();
                    let hidden = path
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with('.'));
                    if hidden {
                        continue;
                    }
                    if path.is_dir() {
                        if let Ok(sub) = fs::read_dir(&path) {
                            self.stack.push(sub);
                        }
                    } else if path.is_file() {
                        return Some(path);
                    }
                }
                // Unreadable entries are skipped, not fatal to the scan
                Some(Err(_)) => continue,
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
