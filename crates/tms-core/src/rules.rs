//! Match rules restricting which path pairs a pass acts on
//!
//! A [`MatchRule`] combines a logical-side predicate with optional
//! wildcard patterns for each namespace. A pair matches iff the predicate
//! accepts the logical path AND (no logical pattern, or it matches) AND
//! (no fs pattern, or it matches) — conjunction only, no negation or
//! disjunction. The predicate is checked first, so a rule built on
//! [`LogicalPredicate::Nothing`] matches no pair even when both patterns
//! would accept.
//!
//! Rules live in a named [`RuleSet`] and are compiled by name when a
//! pull/push invocation is scoped.

use std::collections::BTreeMap;

use tms_fs::{FsPath, LogicalPath, WildcardPattern};

use crate::{Error, Result};

/// Database-side filter applied before any pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalPredicate {
    /// Accept every logical path
    All,
    /// Accept paths under a logical subtree
    StartsWith(String),
    /// Accept paths with an exact suffix (e.g. a file name)
    EndsWith(String),
    /// Accept nothing; makes the rule unsatisfiable by construction
    Nothing,
}

impl LogicalPredicate {
    pub fn accepts(&self, path: &LogicalPath) -> bool {
        match self {
            Self::All => true,
            Self::StartsWith(prefix) => path.starts_with(prefix),
            Self::EndsWith(suffix) => path.ends_with(suffix),
            Self::Nothing => false,
        }
    }
}

/// A named, compiled matching rule.
#[derive(Debug, Clone)]
pub struct MatchRule {
    name: String,
    predicate: LogicalPredicate,
    logical_pattern: Option<WildcardPattern>,
    fs_pattern: Option<WildcardPattern>,
}

impl MatchRule {
    /// Compile a rule from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if either pattern fails to compile.
    pub fn new(
        name: impl Into<String>,
        predicate: LogicalPredicate,
        logical_pattern: Option<&str>,
        fs_pattern: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            predicate,
            logical_pattern: logical_pattern.map(WildcardPattern::new).transpose()?,
            fs_pattern: fs_pattern.map(WildcardPattern::new).transpose()?,
        })
    }

    /// Rule matching every pair.
    pub fn everything(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: LogicalPredicate::All,
            logical_pattern: None,
            fs_pattern: None,
        }
    }

    /// Rule restricting to a logical-side subtree.
    pub fn logical_subtree(name: impl Into<String>, prefix: &str) -> Result<Self> {
        Self::new(
            name,
            LogicalPredicate::StartsWith(prefix.to_string()),
            Some(&format!("{prefix}/*")),
            None,
        )
    }

    /// Rule restricting to a filesystem-side subtree.
    pub fn fs_subtree(name: impl Into<String>, fs_prefix: &str) -> Result<Self> {
        Self::new(
            name,
            LogicalPredicate::All,
            None,
            Some(&format!("{fs_prefix}/*")),
        )
    }

    /// Rule restricting to an exact suffix in both namespaces, e.g. one
    /// file name regardless of directory.
    pub fn suffix(name: impl Into<String>, suffix: &str) -> Result<Self> {
        Self::new(
            name,
            LogicalPredicate::EndsWith(suffix.to_string()),
            Some(&format!("*/{suffix}")),
            Some(&format!("*/{suffix}")),
        )
    }

    /// Rule matching no pair at all.
    pub fn nothing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicate: LogicalPredicate::Nothing,
            logical_pattern: None,
            fs_pattern: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &LogicalPredicate {
        &self.predicate
    }

    pub fn logical_pattern(&self) -> Option<&WildcardPattern> {
        self.logical_pattern.as_ref()
    }

    pub fn fs_pattern(&self) -> Option<&WildcardPattern> {
        self.fs_pattern.as_ref()
    }

    /// Test a path pair against the rule.
    pub fn matches(&self, logical: &LogicalPath, fs: &FsPath) -> bool {
        self.matches_logical(logical)
            && self
                .fs_pattern
                .as_ref()
                .is_none_or(|p| p.matches(fs.as_str()))
    }

    /// Test only the logical side (predicate plus logical pattern).
    ///
    /// Used when filtering the database namespace, where no filesystem
    /// path exists yet.
    pub fn matches_logical(&self, logical: &LogicalPath) -> bool {
        self.predicate.accepts(logical)
            && self
                .logical_pattern
                .as_ref()
                .is_none_or(|p| p.matches(logical.as_str()))
    }
}

/// Named registry of match rules.
pub struct RuleSet {
    rules: BTreeMap<String, MatchRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Register a rule under its name, replacing any previous rule with
    /// the same name.
    pub fn insert(&mut self, rule: MatchRule) {
        self.rules.insert(rule.name().to_string(), rule);
    }

    /// Look up a rule by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRule`] for an unregistered name.
    pub fn compile(&self, name: &str) -> Result<&MatchRule> {
        self.rules.get(name).ok_or_else(|| Error::UnknownRule {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names (sorted).
    pub fn list(&self) -> Vec<&str> {
        self.rules.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(logical: &str, fs: &str) -> (LogicalPath, FsPath) {
        (LogicalPath::new(logical), FsPath::new(fs))
    }

    #[test]
    fn everything_matches_any_pair() {
        let rule = MatchRule::everything("all");
        let (lp, fp) = pair("/language0/store0.po", "/fs/language0/store0.po");
        assert!(rule.matches(&lp, &fp));
    }

    #[test]
    fn logical_subtree_accepts_paths_below_prefix() {
        let rule = MatchRule::logical_subtree("language0", "/language0").unwrap();
        let (lp, fp) = pair("/language0/project0/store0.po", "/fs/language0/project0/store0.po");
        assert!(rule.matches(&lp, &fp));

        let (lp, fp) = pair("/language1/project0/store0.po", "/fs/language1/project0/store0.po");
        assert!(!rule.matches(&lp, &fp));
    }

    #[test]
    fn fs_subtree_filters_on_the_filesystem_side() {
        let rule = MatchRule::fs_subtree("fs/language1", "/fs/language1").unwrap();
        let (lp, fp) = pair("/language1/store.po", "/fs/language1/store.po");
        assert!(rule.matches(&lp, &fp));

        let (lp, fp) = pair("/language1/store.po", "/fs/language0/store.po");
        assert!(!rule.matches(&lp, &fp));
    }

    #[test]
    fn suffix_rule_matches_file_name_at_any_depth() {
        let rule = MatchRule::suffix("store0.po", "store0.po").unwrap();
        let (lp, fp) = pair("/language0/project0/store0.po", "/fs/language0/project0/store0.po");
        assert!(rule.matches(&lp, &fp));

        let (lp, fp) = pair("/language0/project0/store1.po", "/fs/language0/project0/store1.po");
        assert!(!rule.matches(&lp, &fp));
    }

    #[test]
    fn false_predicate_short_circuits_before_patterns() {
        // Both patterns would accept this pair; the predicate must win.
        let rule = MatchRule::new(
            "none",
            LogicalPredicate::Nothing,
            Some("/language0/*"),
            Some("/fs/language0/*"),
        )
        .unwrap();
        let (lp, fp) = pair("/language0/store.po", "/fs/language0/store.po");
        assert!(!rule.matches(&lp, &fp));
    }

    #[test]
    fn conjunction_requires_both_patterns() {
        let rule = MatchRule::new(
            "both",
            LogicalPredicate::All,
            Some("/language0/*"),
            Some("/fs/language1/*"),
        )
        .unwrap();
        // Logical matches, fs does not.
        let (lp, fp) = pair("/language0/store.po", "/fs/language0/store.po");
        assert!(!rule.matches(&lp, &fp));
    }

    #[test]
    fn rule_set_compiles_by_name() {
        let mut rules = RuleSet::new();
        rules.insert(MatchRule::everything("all"));
        rules.insert(MatchRule::nothing("none"));

        assert!(rules.compile("all").is_ok());
        assert_eq!(rules.list(), vec!["all", "none"]);

        let err = rules.compile("missing").unwrap_err();
        assert!(matches!(err, Error::UnknownRule { name } if name == "missing"));
    }
}
