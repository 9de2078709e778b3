//! End-to-end synchronization against a local directory checkout
//!
//! These scenarios run the whole stack: registry lookup, directory
//! discovery, classification, and the executor writing through to disk
//! and the store database.

use std::sync::Arc;

use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;

use tms_core::{
    BackendRegistry, MemoryDb, ProjectConfig, StoreDb, StoreRecord, SyncEngine, SyncState,
};
use tms_fs::{LogicalPath, fingerprint};

struct Harness {
    checkout: TempDir,
    _lock_dir: TempDir,
    db: Arc<MemoryDb>,
    engine: SyncEngine,
}

fn harness() -> Harness {
    // Engine tracing shows up with --nocapture; repeated init is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let checkout = TempDir::new().unwrap();
    let lock_dir = TempDir::new().unwrap();
    let db = Arc::new(MemoryDb::new());
    db.add_project("project0");

    let engine = SyncEngine::new(
        "project0",
        ProjectConfig::new("localfs", checkout.path().to_string_lossy()),
        &BackendRegistry::with_builtins(),
        Arc::clone(&db) as Arc<dyn StoreDb>,
        lock_dir.path(),
    )
    .unwrap();

    Harness {
        checkout,
        _lock_dir: lock_dir,
        db,
        engine,
    }
}

#[test]
fn initial_pull_imports_a_checkout() {
    let h = harness();
    h.checkout
        .child("language0/store0.po")
        .write_str("msgid \"a\"\nmsgstr \"b\"\n")
        .unwrap();
    h.checkout
        .child("language1/store1.po")
        .write_str("msgid \"c\"\nmsgstr \"d\"\n")
        .unwrap();

    let batch = h.engine.pull(None).unwrap();
    assert!(batch.is_success());
    assert_eq!(
        batch.succeeded,
        vec!["/language0/store0.po", "/language1/store1.po"]
    );

    let record = h
        .db
        .record("project0", &LogicalPath::new("/language0/store0.po"))
        .unwrap()
        .unwrap();
    assert_eq!(record.content, "msgid \"a\"\nmsgstr \"b\"\n");
    assert_eq!(
        record.last_sync.unwrap().fingerprint,
        fingerprint::of_content("msgid \"a\"\nmsgstr \"b\"\n")
    );

    // Everything is in sync after the import.
    let states = h.engine.state(None).unwrap();
    assert!(states.iter().all(|(_, s)| *s == SyncState::InSync));
}

#[test]
fn push_materializes_db_stores_on_disk() {
    let h = harness();
    h.db.insert(
        "project0",
        StoreRecord::new("/language0/store0.po", "msgid \"a\"\nmsgstr \"x\"\n"),
    );

    let batch = h.engine.push(None).unwrap();
    assert_eq!(batch.succeeded, vec!["/language0/store0.po"]);

    h.checkout
        .child("language0/store0.po")
        .assert(predicate::str::contains("msgstr \"x\""));
}

#[test]
fn external_edit_is_detected_and_pulled() {
    let h = harness();
    h.checkout
        .child("language0/store0.po")
        .write_str("original")
        .unwrap();
    h.engine.pull(None).unwrap();

    // Someone edits the checkout behind the engine's back.
    h.checkout
        .child("language0/store0.po")
        .write_str("edited on disk")
        .unwrap();

    let states = h.engine.state(None).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].1, SyncState::ToPull);

    h.engine.pull(None).unwrap();
    assert_eq!(
        h.db.record("project0", &LogicalPath::new("/language0/store0.po"))
            .unwrap()
            .unwrap()
            .content,
        "edited on disk"
    );
}

#[test]
fn db_edit_is_detected_and_pushed() {
    let h = harness();
    h.checkout
        .child("language0/store0.po")
        .write_str("original")
        .unwrap();
    h.engine.pull(None).unwrap();

    let logical = LogicalPath::new("/language0/store0.po");
    h.db.write_store("project0", &logical, "edited in db").unwrap();

    let states = h.engine.state(None).unwrap();
    assert_eq!(states[0].1, SyncState::ToPush);

    h.engine.push(None).unwrap();
    h.checkout
        .child("language0/store0.po")
        .assert("edited in db");
}

#[test]
fn divergent_edits_surface_as_conflict_and_touch_nothing() {
    let h = harness();
    h.checkout
        .child("language0/store0.po")
        .write_str("original")
        .unwrap();
    h.engine.pull(None).unwrap();

    let logical = LogicalPath::new("/language0/store0.po");
    h.db.write_store("project0", &logical, "db edit").unwrap();
    h.checkout
        .child("language0/store0.po")
        .write_str("disk edit")
        .unwrap();

    let states = h.engine.state(None).unwrap();
    assert_eq!(states[0].1, SyncState::Conflict);

    let pulled = h.engine.pull(None).unwrap();
    assert_eq!(pulled.conflicts, vec!["/language0/store0.po"]);
    let pushed = h.engine.push(None).unwrap();
    assert_eq!(pushed.conflicts, vec!["/language0/store0.po"]);

    // Neither side moved.
    h.checkout.child("language0/store0.po").assert("disk edit");
    assert_eq!(
        h.db.record("project0", &logical).unwrap().unwrap().content,
        "db edit"
    );
}

#[test]
fn obsolete_store_is_left_alone_even_with_a_file_present() {
    let h = harness();
    h.checkout
        .child("language0/store0.po")
        .write_str("original")
        .unwrap();
    h.engine.pull(None).unwrap();

    let logical = LogicalPath::new("/language0/store0.po");
    h.db.mark_obsolete("project0", &logical).unwrap();

    let states = h.engine.state(None).unwrap();
    assert_eq!(states[0].1, SyncState::Obsolete);

    let batch = h.engine.pull(None).unwrap();
    assert_eq!(batch.skipped, vec!["/language0/store0.po"]);
    h.checkout.child("language0/store0.po").assert("original");
}

#[test]
fn missing_file_for_tracked_store_means_push() {
    let h = harness();
    h.checkout
        .child("language0/store0.po")
        .write_str("original")
        .unwrap();
    h.engine.pull(None).unwrap();

    std::fs::remove_file(h.checkout.path().join("language0/store0.po")).unwrap();

    let states = h.engine.state(None).unwrap();
    assert_eq!(states[0].1, SyncState::ToPush);

    h.engine.push(None).unwrap();
    h.checkout.child("language0/store0.po").assert("original");
}

#[test]
fn one_bad_store_does_not_abort_a_checkout_import() {
    let h = harness();
    h.checkout.child("language0/good.po").write_str("good").unwrap();
    h.checkout.child("language0/poison.po").write_str("bad").unwrap();
    h.db.inject_write_failure(&LogicalPath::new("/language0/poison.po"));

    let batch = h.engine.pull(None).unwrap();
    assert_eq!(batch.succeeded, vec!["/language0/good.po"]);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(batch.failed[0].logical_path, "/language0/poison.po");

    // The report serializes for external consumers.
    let json = serde_json::to_string(&batch).unwrap();
    assert!(json.contains("/language0/poison.po"));

    // Fingerprint state for the failed pair stayed untouched.
    assert!(
        h.db.record("project0", &LogicalPath::new("/language0/poison.po"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn dot_files_in_the_checkout_are_ignored() {
    let h = harness();
    h.checkout.child(".hidden/secret.po").write_str("x").unwrap();
    h.checkout.child("language0/.swapfile").write_str("y").unwrap();
    h.checkout.child("language0/store0.po").write_str("z").unwrap();

    let batch = h.engine.pull(None).unwrap();
    assert_eq!(batch.succeeded, vec!["/language0/store0.po"]);
    assert_eq!(batch.len(), 1);
}
