//! Filesystem-side primitives for the translation sync manager
//!
//! Provides the normalized path keys for the two synchronized namespaces,
//! wildcard matching, content fingerprints and safe atomic I/O.

pub mod error;
pub mod fingerprint;
pub mod io;
pub mod path;
pub mod pattern;

pub use error::{Error, Result};
pub use path::{FsPath, LogicalPath};
pub use pattern::WildcardPattern;
