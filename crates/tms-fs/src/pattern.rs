//! Wildcard matching for namespace paths
//!
//! Both namespaces are filtered with filesystem-style wildcards (`*`, `?`,
//! character classes). Matching uses the default glob options, where `*`
//! crosses `/` boundaries, so `/language0/*` accepts every path below
//! `/language0` and `*/store0.po` accepts that file name at any depth.
//! Backend paths are assumed not to contain unescaped wildcard characters.

use crate::{Error, Result};

/// A compiled wildcard pattern applied to path strings.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    compiled: glob::Pattern,
}

impl WildcardPattern {
    /// Compile a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern is malformed
    /// (e.g. an unclosed character class).
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.msg.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Test a candidate path string against the pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        self.compiled.matches(candidate)
    }

    /// The original pattern source.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
