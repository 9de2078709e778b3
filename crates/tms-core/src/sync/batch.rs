//! Batch result reporting

use serde::{Deserialize, Serialize};

/// A pair that failed during the apply phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairFailure {
    /// Logical path of the failing pair
    pub logical_path: String,
    /// What went wrong, human-readable
    pub error: String,
}

/// Partition of one executor batch.
///
/// Every input pair lands in exactly one bucket: `succeeded` (acted on
/// and completed), `failed` (acted on, error recorded, batch continued),
/// `conflicts` (never touched, surfaced for external resolution) or
/// `skipped` (verdict did not call for this operation — a no-op, not an
/// error).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncBatch {
    /// Logical paths applied successfully
    pub succeeded: Vec<String>,
    /// Per-pair failures
    pub failed: Vec<PairFailure>,
    /// Conflicted pairs requiring external resolution
    pub conflicts: Vec<String>,
    /// Pairs whose verdict made this operation a no-op
    pub skipped: Vec<String>,
}

impl SyncBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every acted-on pair completed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total number of pairs partitioned into the batch.
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.conflicts.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn record_success(&mut self, logical_path: &str) {
        self.succeeded.push(logical_path.to_string());
    }

    pub(crate) fn record_failure(&mut self, logical_path: &str, error: impl Into<String>) {
        self.failed.push(PairFailure {
            logical_path: logical_path.to_string(),
            error: error.into(),
        });
    }

    pub(crate) fn record_conflict(&mut self, logical_path: &str) {
        self.conflicts.push(logical_path.to_string());
    }

    pub(crate) fn record_skip(&mut self, logical_path: &str) {
        self.skipped.push(logical_path.to_string());
    }
}
