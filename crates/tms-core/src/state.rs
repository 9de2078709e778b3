//! Synchronization verdict per tracked pair
//!
//! [`classify`] is the pure state classifier: change facts in, verdict
//! out. No hidden state, no I/O; the same facts always produce the same
//! verdict.

use serde::{Deserialize, Serialize};

use crate::pair::TrackedPair;

/// Synchronization verdict for one tracked pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Both sides agree with the last recorded synchronization
    InSync,
    /// Filesystem content should be copied into the database side
    ToPull,
    /// Database content should be copied into the filesystem side
    ToPush,
    /// Both sides changed since the last sync (or diverged with no
    /// recorded common ancestor); never auto-resolved
    Conflict,
    /// Database entry is marked obsolete; the fs mapping is no longer
    /// relevant
    Obsolete,
    /// Neither side recognizes the pair
    Untracked,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InSync => "in_sync",
            Self::ToPull => "to_pull",
            Self::ToPush => "to_push",
            Self::Conflict => "conflict",
            Self::Obsolete => "obsolete",
            Self::Untracked => "untracked",
        };
        write!(f, "{name}")
    }
}

/// Classify a tracked pair's change facts into a verdict.
///
/// Precedence, first match wins:
///
/// 1. obsolete → `Obsolete` (regardless of every other fact)
/// 2. both exist, both changed → `Conflict`
/// 3. db only → `ToPush`
/// 4. fs only → `ToPull`
/// 5. both exist, fs changed → `ToPull`
/// 6. both exist, db changed → `ToPush`
/// 7. both exist, neither changed → `InSync`
/// 8. neither exists → `Untracked`
///
/// The conflict check precedes the one-sided-change rules: both sides
/// having changed is exactly the case that must never auto-resolve in
/// either direction.
pub fn classify(pair: &TrackedPair) -> SyncState {
    if pair.is_obsolete() {
        return SyncState::Obsolete;
    }
    match (pair.exists_in_db(), pair.exists_in_fs()) {
        (true, true) if pair.db_changed() && pair.fs_changed() => SyncState::Conflict,
        (true, false) => SyncState::ToPush,
        (false, true) => SyncState::ToPull,
        (true, true) if pair.fs_changed() => SyncState::ToPull,
        (true, true) if pair.db_changed() => SyncState::ToPush,
        (true, true) => SyncState::InSync,
        (false, false) => SyncState::Untracked,
    }
}
