//! Project lock contention and registry lifecycle across engines

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tms_core::{
    BackendRegistry, Error, MemoryDb, MirrorBackend, ProjectConfig, ProjectLock, StoreDb,
    StoreRecord, SyncEngine,
};

fn dummy_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(
        "dummyfs",
        Box::new(|ctx| Ok(Box::new(MirrorBackend::new(ctx.clone())))),
    );
    registry
}

fn engine_for(project: &str, db: Arc<MemoryDb>, lock_dir: &std::path::Path) -> SyncEngine {
    SyncEngine::new(
        project,
        ProjectConfig::new("dummyfs", "/foo/bar"),
        &dummy_registry(),
        db as Arc<dyn StoreDb>,
        lock_dir,
    )
    .unwrap()
}

#[test]
fn second_engine_on_the_same_project_is_rejected_while_locked() {
    let lock_dir = TempDir::new().unwrap();
    let db = Arc::new(MemoryDb::new());
    db.insert("project0", StoreRecord::new("/language0/store0.po", "a"));

    let first = engine_for("project0", Arc::clone(&db), lock_dir.path());
    let second = engine_for("project0", Arc::clone(&db), lock_dir.path());

    let held = ProjectLock::acquire(lock_dir.path(), "project0").unwrap();
    assert!(matches!(
        first.pull(None).unwrap_err(),
        Error::ProjectBusy { .. }
    ));
    assert!(matches!(
        second.push(None).unwrap_err(),
        Error::ProjectBusy { .. }
    ));

    // Read-only classification never needs the lock.
    assert!(first.state(None).is_ok());

    // Releasing the lock lets the next pass through.
    drop(held);
    assert!(second.push(None).is_ok());
    assert!(first.pull(None).is_ok());
}

#[test]
fn locks_are_scoped_per_project() {
    let lock_dir = TempDir::new().unwrap();
    let db = Arc::new(MemoryDb::new());
    db.insert("project0", StoreRecord::new("/language0/store0.po", "a"));
    db.insert("project1", StoreRecord::new("/language0/store0.po", "b"));

    let _held = ProjectLock::acquire(lock_dir.path(), "project0").unwrap();

    // A different project's pass is unaffected.
    let other = engine_for("project1", Arc::clone(&db), lock_dir.path());
    assert!(other.push(None).is_ok());
}

#[test]
fn sequential_passes_reacquire_cleanly() {
    let lock_dir = TempDir::new().unwrap();
    let db = Arc::new(MemoryDb::new());
    db.insert("project0", StoreRecord::new("/language0/store0.po", "a"));
    let engine = engine_for("project0", Arc::clone(&db), lock_dir.path());

    // Each pass takes and releases the lock on its own.
    assert!(engine.push(None).is_ok());
    assert!(engine.pull(None).is_ok());
    assert!(engine.push(None).is_ok());
}

#[test]
fn unregistering_a_backend_stops_new_engines_only() {
    let lock_dir = TempDir::new().unwrap();
    let db = Arc::new(MemoryDb::new());
    db.insert("project0", StoreRecord::new("/language0/store0.po", "a"));

    let mut registry = dummy_registry();
    let engine = SyncEngine::new(
        "project0",
        ProjectConfig::new("dummyfs", "/foo/bar"),
        &registry,
        Arc::clone(&db) as Arc<dyn StoreDb>,
        lock_dir.path(),
    )
    .unwrap();

    assert!(registry.unregister("dummyfs"));

    // The live engine keeps its backend instance.
    assert!(engine.push(None).is_ok());

    // New engines can no longer resolve the type.
    let err = SyncEngine::new(
        "project0",
        ProjectConfig::new("dummyfs", "/foo/bar"),
        &registry,
        db as Arc<dyn StoreDb>,
        lock_dir.path(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnknownBackend { fs_type } if fs_type == "dummyfs"));
}

#[test]
fn registry_lists_registered_types() {
    let mut registry = BackendRegistry::with_builtins();
    registry.register(
        "dummyfs",
        Box::new(|ctx| Ok(Box::new(MirrorBackend::new(ctx.clone())))),
    );
    assert_eq!(registry.list(), vec!["dummyfs", "localfs"]);
    assert!(registry.contains("localfs"));

    registry.unregister("localfs");
    assert_eq!(registry.list(), vec!["dummyfs"]);
}
