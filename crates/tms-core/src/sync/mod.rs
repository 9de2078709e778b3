//! Synchronization executor and engine
//!
//! The executor applies pre-computed verdicts pair by pair; the engine
//! runs whole passes (discover, classify, apply) under the project lock.

mod batch;
mod engine;
mod executor;

pub use batch::{PairFailure, SyncBatch};
pub use engine::SyncEngine;
pub use executor::SyncExecutor;
