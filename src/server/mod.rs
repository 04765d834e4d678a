//! The HTTP inspection and control surface.
//!
//! Read endpoints report engine state; the single write endpoint adds a
//! repository to the monitored set. The server never drives the polling
//! loop, it only observes and nudges it.

mod handlers;
mod health;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};

use crate::github::GitHubApi;
use crate::sync::{Scheduler, SyncEngine};
use crate::types::{ActionFilter, CommitAction, IssueAction};

struct AppStateInner<A> {
    scheduler: Arc<Scheduler<A>>,
    poll_interval: Duration,
    issue_actions: Vec<IssueAction>,
    commit_actions: Vec<CommitAction>,
}

/// Shared handler state. Cheap to clone.
pub struct AppState<A> {
    inner: Arc<AppStateInner<A>>,
}

// Manual impl: `A` itself need not be Clone.
impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: GitHubApi + 'static> AppState<A> {
    pub fn new(scheduler: Arc<Scheduler<A>>, poll_interval: Duration, filter: &ActionFilter) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                scheduler,
                poll_interval,
                issue_actions: filter.issue_actions(),
                commit_actions: filter.commit_actions(),
            }),
        }
    }

    fn engine(&self) -> &Arc<SyncEngine<A>> {
        self.inner.scheduler.engine()
    }

    fn scheduler(&self) -> &Scheduler<A> {
        &self.inner.scheduler
    }

    fn poll_interval_ms(&self) -> u64 {
        self.inner.poll_interval.as_millis() as u64
    }

    fn issue_actions(&self) -> &[IssueAction] {
        &self.inner.issue_actions
    }

    fn commit_actions(&self) -> &[CommitAction] {
        &self.inner.commit_actions
    }
}

pub fn build_router<A: GitHubApi + 'static>(state: AppState<A>) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/status", get(handlers::status_handler::<A>))
        .route("/repositories", get(handlers::repositories_handler::<A>))
        .route(
            "/repositories/monitor",
            post(handlers::monitor_handler::<A>),
        )
        .route("/debug/commits", get(handlers::debug_commits_handler::<A>))
        .with_state(state)
}
