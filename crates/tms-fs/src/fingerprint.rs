//! SHA-256 content fingerprints
//!
//! A fingerprint records the state of store or file content at the last
//! successful synchronization and is compared against live content to
//! detect divergence. The canonical format is `"sha256:<hex>"`.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Prefix for all fingerprints produced by this module
const PREFIX: &str = "sha256:";

/// Compute the fingerprint of string content.
pub fn of_content(content: &str) -> String {
    of_bytes(content.as_bytes())
}

/// Compute the fingerprint of raw bytes.
pub fn of_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the fingerprint of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn of_file(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(of_bytes(&content))
}
