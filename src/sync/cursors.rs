//! Per-repository, per-category progress cursors.
//!
//! A cursor marks the boundary of already-processed activity. Cursors are
//! initialized to "now" at validation time (the engine tails activity, it
//! never backfills), read once at the start of a category check, and
//! immediately overwritten with "now" before the fetch completes. They are
//! memory-only: a restart re-validates and resets them, deliberately
//! skipping any backlog accrued while the process was down.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::types::{Category, RepoId};

/// In-memory cursor store.
///
/// Invariant: for any (repository, category) pair the stored timestamp never
/// decreases.
#[derive(Debug, Default)]
pub struct CursorStore {
    inner: Mutex<HashMap<(RepoId, Category), DateTime<Utc>>>,
}

impl CursorStore {
    pub fn new() -> Self {
        CursorStore::default()
    }

    /// Returns the cursor for `(repo, category)`, or "now" if never set, so
    /// an unseen repository never floods with historical backlog.
    pub fn get(&self, repo: &RepoId, category: Category) -> DateTime<Utc> {
        let inner = self.inner.lock().expect("cursor store lock poisoned");
        inner
            .get(&(repo.clone(), category))
            .copied()
            .unwrap_or_else(Utc::now)
    }

    /// Advances the cursor, never moving it backward.
    pub fn advance(&self, repo: &RepoId, category: Category, ts: DateTime<Utc>) {
        let mut inner = self.inner.lock().expect("cursor store lock poisoned");
        inner
            .entry((repo.clone(), category))
            .and_modify(|cur| {
                if ts > *cur {
                    *cur = ts;
                }
            })
            .or_insert(ts);
    }

    /// The cursor value if one has ever been set. Inspection only; the tick
    /// path uses [`get`](Self::get).
    pub fn last_checked(&self, repo: &RepoId, category: Category) -> Option<DateTime<Utc>> {
        let inner = self.inner.lock().expect("cursor store lock poisoned");
        inner.get(&(repo.clone(), category)).copied()
    }

    /// Sets all three category cursors for a freshly validated repository.
    pub fn init_repo(&self, repo: &RepoId, ts: DateTime<Utc>) {
        let mut inner = self.inner.lock().expect("cursor store lock poisoned");
        for category in Category::ALL {
            inner.insert((repo.clone(), category), ts);
        }
    }

    /// Drops all cursors for an invalidated repository.
    pub fn remove_repo(&self, repo: &RepoId) {
        let mut inner = self.inner.lock().expect("cursor store lock poisoned");
        inner.retain(|(r, _), _| r != repo);
    }

    /// Drops everything. Used by a wholesale re-validation pass.
    pub fn clear(&self) {
        self.inner
            .lock()
            .expect("cursor store lock poisoned")
            .clear();
    }
}
