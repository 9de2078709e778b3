//! Match rule conformance table
//!
//! Exercises the canonical rule shapes a deployment registers: match
//! everything, one logical subtree, one filesystem subtree, one exact
//! file name, and the unsatisfiable rule.

use rstest::rstest;
use tms_core::{LogicalPredicate, MatchRule, RuleSet};
use tms_fs::{FsPath, LogicalPath};

fn canonical_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert(MatchRule::everything("all"));
    rules.insert(
        MatchRule::new(
            "language0",
            LogicalPredicate::StartsWith("/language0".to_string()),
            Some("/language0/*"),
            None,
        )
        .unwrap(),
    );
    rules.insert(
        MatchRule::new(
            "fs/language1",
            LogicalPredicate::StartsWith("/language1".to_string()),
            None,
            Some("/fs/language1/*"),
        )
        .unwrap(),
    );
    rules.insert(
        MatchRule::new(
            "store0.po",
            LogicalPredicate::EndsWith("store0.po".to_string()),
            Some("*/store0.po"),
            Some("*/store0.po"),
        )
        .unwrap(),
    );
    rules.insert(
        MatchRule::new(
            "none",
            LogicalPredicate::Nothing,
            Some("/language0/*"),
            Some("/fs/language1/*"),
        )
        .unwrap(),
    );
    rules
}

#[rstest]
#[case("all", "/language0/project0/store0.po", "/fs/language0/project0/store0.po", true)]
#[case("all", "/language1/project0/store1.po", "/fs/language1/project0/store1.po", true)]
#[case("language0", "/language0/project0/store0.po", "/fs/language0/project0/store0.po", true)]
#[case("language0", "/language1/project0/store0.po", "/fs/language1/project0/store0.po", false)]
#[case("fs/language1", "/language1/project0/store1.po", "/fs/language1/project0/store1.po", true)]
#[case("fs/language1", "/language0/project0/store0.po", "/fs/language0/project0/store0.po", false)]
#[case("store0.po", "/language0/project0/store0.po", "/fs/language0/project0/store0.po", true)]
#[case("store0.po", "/language1/nested/deep/store0.po", "/fs/language1/nested/deep/store0.po", true)]
#[case("store0.po", "/language0/project0/store1.po", "/fs/language0/project0/store1.po", false)]
#[case("none", "/language0/project0/store0.po", "/fs/language1/project0/store0.po", false)]
fn canonical_rule_matching(
    #[case] rule_name: &str,
    #[case] logical: &str,
    #[case] fs: &str,
    #[case] expected: bool,
) {
    let rules = canonical_rules();
    let rule = rules.compile(rule_name).unwrap();
    assert_eq!(
        rule.matches(&LogicalPath::new(logical), &FsPath::new(fs)),
        expected,
        "rule {rule_name} on ({logical}, {fs})"
    );
}

#[test]
fn subtree_rule_accepts_matching_pair() {
    // Predicate accepts (starts-with), logical pattern matches, and no
    // fs constraint exists, so the pair matches.
    let rules = canonical_rules();
    let rule = rules.compile("language0").unwrap();
    assert!(rule.matches(
        &LogicalPath::new("/language0/project0/store0.po"),
        &FsPath::new("/fs/language0/project0/store0.po"),
    ));
}

#[test]
fn unsatisfiable_rule_never_matches_even_when_globs_would() {
    let rules = canonical_rules();
    let rule = rules.compile("none").unwrap();

    // Both patterns accept this pair; the false predicate still wins.
    let logical = LogicalPath::new("/language0/project0/store0.po");
    let fs = FsPath::new("/fs/language1/project0/store0.po");
    assert!(rule.logical_pattern().unwrap().matches(logical.as_str()));
    assert!(rule.fs_pattern().unwrap().matches(fs.as_str()));
    assert!(!rule.matches(&logical, &fs));
}

#[test]
fn compile_unknown_rule_name_fails() {
    let rules = canonical_rules();
    assert!(rules.compile("not-registered").is_err());
}
