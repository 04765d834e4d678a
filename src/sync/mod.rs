//! Incremental synchronization: cursors, classification, the engine, and
//! the polling scheduler that drives it.

pub mod classify;
pub mod cursors;
pub mod engine;
pub mod scheduler;

pub use classify::{PullClassification, classify_issue, classify_pull_request};
pub use cursors::CursorStore;
pub use engine::{MAX_COMMITS_PER_TICK, SyncEngine};
pub use scheduler::Scheduler;
