//! Project-scoped backend configuration
//!
//! Every project that participates in filesystem synchronization carries
//! two configuration keys: `fs_type`, naming the backend factory to look
//! up in the [`BackendRegistry`](crate::plugin::BackendRegistry), and
//! `fs_url`, the backend location it is constructed with. Both are
//! required before any discovery call; a missing or empty value aborts
//! the whole pass before any pair is touched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings key naming the backend type.
pub const FS_TYPE_KEY: &str = "fs_type";

/// Settings key naming the backend location.
pub const FS_URL_KEY: &str = "fs_url";

/// Validated backend configuration for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Backend identifier, resolved against the registry
    pub fs_type: String,
    /// Backend location (directory root, checkout URL, ...)
    pub fs_url: String,
}

/// TOML shape of a project configuration file:
///
/// ```toml
/// [fs]
/// type = "localfs"
/// url = "/srv/checkouts/project0"
/// ```
#[derive(Debug, Deserialize)]
struct ConfigFile {
    fs: FsTable,
}

#[derive(Debug, Deserialize)]
struct FsTable {
    #[serde(rename = "type", default)]
    fs_type: String,
    #[serde(default)]
    url: String,
}

impl ProjectConfig {
    /// Create a config from already-validated values.
    pub fn new(fs_type: impl Into<String>, fs_url: impl Into<String>) -> Self {
        Self {
            fs_type: fs_type.into(),
            fs_url: fs_url.into(),
        }
    }

    /// Read the config from a flat project settings map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigMissing`] if either key is absent or empty.
    pub fn from_settings(settings: &BTreeMap<String, String>) -> Result<Self> {
        let fs_type = require(settings, FS_TYPE_KEY)?;
        let fs_url = require(settings, FS_URL_KEY)?;
        Ok(Self { fs_type, fs_url })
    }

    /// Parse the config from a project TOML file.
    ///
    /// # Errors
    ///
    /// Returns a TOML error for malformed input, or
    /// [`Error::ConfigMissing`] if either value is absent or empty.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        if file.fs.fs_type.is_empty() {
            return Err(Error::ConfigMissing {
                key: FS_TYPE_KEY.to_string(),
            });
        }
        if file.fs.url.is_empty() {
            return Err(Error::ConfigMissing {
                key: FS_URL_KEY.to_string(),
            });
        }
        Ok(Self {
            fs_type: file.fs.fs_type,
            fs_url: file.fs.url,
        })
    }
}

fn require(settings: &BTreeMap<String, String>, key: &str) -> Result<String> {
    match settings.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(Error::ConfigMissing {
            key: key.to_string(),
        }),
    }
}
