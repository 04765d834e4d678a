//! Incremental GitHub activity synchronization.
//!
//! Polls a set of repositories for issue, pull request, and commit activity,
//! classifies each raw record into an action verb against per-category
//! cursors, filters against configured allow-sets, and hands every surviving
//! event to a consumer exactly once. Ships with a receipt-printer consumer
//! and a small HTTP surface for inspection and control.

pub mod config;
pub mod consumer;
pub mod github;
pub mod printer;
pub mod render;
pub mod server;
pub mod sync;
pub mod types;

#[cfg(test)]
pub mod test_utils;
