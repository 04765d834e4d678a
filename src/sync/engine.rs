//! The incremental activity-synchronization engine.
//!
//! `SyncEngine` owns the monitored set and the cursor store, and drives one
//! fetch → classify → filter → dispatch pass per repository per category.
//! All mutation of shared state goes through it; the scheduler merely calls
//! [`tick`](SyncEngine::tick) on a timer.
//!
//! # Cursor discipline
//!
//! A category check reads its cursor and immediately overwrites it with
//! "now", before the fetch completes. Activity landing on the remote side
//! between the read and the fetch response can be missed on the next tick;
//! this is the accepted liveness trade-off (the engine never double-reports)
//! and must not be "fixed" casually.
//!
//! # Tick overlap
//!
//! Ticks are single-flight: a tick that would start while a previous tick
//! still holds the guard is skipped with a warning. Stopping the scheduler
//! never interrupts a tick already in flight.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::consumer::EventConsumer;
use crate::github::{ApiError, ApiErrorKind, GitHubApi};
use crate::types::{
    Account, ActionFilter, ActivityEvent, Category, CommitAction, CommitEvent, IssueEvent,
    PullRequestEvent, RepoId,
};

use super::classify::{classify_issue, classify_pull_request};
use super::cursors::CursorStore;

/// Upper bound on commit events per repository per tick.
pub const MAX_COMMITS_PER_TICK: usize = 10;

/// The polling engine: monitored set, cursors, and the per-tick pipeline.
pub struct SyncEngine<A> {
    api: A,
    filter: ActionFilter,
    monitored: Mutex<Vec<RepoId>>,
    cursors: CursorStore,
    /// Single-flight guard; held for the duration of one tick.
    tick_lock: tokio::sync::Mutex<()>,
}

impl<A: GitHubApi> SyncEngine<A> {
    pub fn new(api: A, filter: ActionFilter) -> Self {
        SyncEngine {
            api,
            filter,
            monitored: Mutex::new(Vec::new()),
            cursors: CursorStore::new(),
            tick_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The remote API, for read-only collaborators (discovery listing).
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot of the monitored set.
    pub fn monitored(&self) -> Vec<RepoId> {
        self.monitored.lock().expect("monitored lock poisoned").clone()
    }

    pub fn is_monitored(&self, repo: &RepoId) -> bool {
        self.monitored
            .lock()
            .expect("monitored lock poisoned")
            .contains(repo)
    }

    /// Inspection hook: the cursor for `(repo, category)`, if one was ever
    /// set.
    pub fn last_checked(&self, repo: &RepoId, category: Category) -> Option<DateTime<Utc>> {
        self.cursors.last_checked(repo, category)
    }

    /// Validates the configured repositories and replaces the monitored set
    /// wholesale. A validation pass is idempotent and authoritative for its
    /// run; cursors for every validated repository reset to "now".
    pub async fn validate(&self, repos: &[RepoId]) -> Vec<RepoId> {
        info!(count = repos.len(), "validating repositories");
        let mut valid = Vec::new();
        for repo in repos {
            match self.api.get_repository(repo).await {
                Ok(_) => {
                    info!(repo = %repo, "repository is valid and accessible");
                    valid.push(repo.clone());
                }
                Err(e) => match e.kind {
                    ApiErrorKind::NotFound => {
                        warn!(repo = %repo, "repository not found or not accessible with the current token")
                    }
                    ApiErrorKind::Unauthorized => {
                        warn!(repo = %repo, "authentication failed; check token permissions")
                    }
                    ApiErrorKind::Transient => {
                        warn!(repo = %repo, error = %e, "validation failed; excluding for this run")
                    }
                },
            }
        }

        if valid.is_empty() {
            warn!("no valid repositories found; check configuration and token permissions");
        } else {
            info!(count = valid.len(), "validated repositories to monitor");
        }

        let now = Utc::now();
        self.cursors.clear();
        for repo in &valid {
            self.cursors.init_repo(repo, now);
        }
        *self.monitored.lock().expect("monitored lock poisoned") = valid.clone();
        valid
    }

    /// Validates a single repository and appends it to the monitored set
    /// without disturbing existing cursors. Adding an already-monitored
    /// repository is a no-op.
    pub async fn add_repository(&self, repo: RepoId) -> Result<(), ApiError> {
        self.api.get_repository(&repo).await?;
        let mut monitored = self.monitored.lock().expect("monitored lock poisoned");
        if !monitored.contains(&repo) {
            self.cursors.init_repo(&repo, Utc::now());
            info!(repo = %repo, "added repository to monitored set");
            monitored.push(repo);
        }
        Ok(())
    }

    /// Runs one full tick: every monitored repository, every category in
    /// order, dispatching each accepted event to the consumer sequentially.
    ///
    /// Single-flight: if a previous tick is still running this one is
    /// skipped entirely.
    pub async fn tick<C: EventConsumer>(&self, consumer: &C) {
        let Ok(_guard) = self.tick_lock.try_lock() else {
            warn!("previous tick still running; skipping this tick");
            return;
        };

        let repos = self.monitored();
        debug!(repositories = repos.len(), "tick started");

        for repo in repos {
            for category in Category::ALL {
                // An earlier category may have invalidated the repository.
                if !self.is_monitored(&repo) {
                    break;
                }
                let events = self.check_category(&repo, category).await;
                for event in events {
                    self.dispatch(consumer, event).await;
                }
            }
        }
    }

    /// Out-of-band single-category check for diagnostics.
    ///
    /// For a monitored repository this is exactly the tick path, cursor
    /// advance included. For an unmonitored repository it fetches against an
    /// ephemeral "now" cursor and touches neither the cursor store nor the
    /// monitored set.
    pub async fn force_check(&self, repo: &RepoId, category: Category) -> Vec<ActivityEvent> {
        if self.is_monitored(repo) {
            self.check_category(repo, category).await
        } else {
            self.run_check(repo, category, Utc::now()).await
        }
    }

    /// One category check with the cursor read-then-overwrite discipline.
    async fn check_category(&self, repo: &RepoId, category: Category) -> Vec<ActivityEvent> {
        let cursor = self.cursors.get(repo, category);
        self.cursors.advance(repo, category, Utc::now());
        self.run_check(repo, category, cursor).await
    }

    async fn run_check(
        &self,
        repo: &RepoId,
        category: Category,
        cursor: DateTime<Utc>,
    ) -> Vec<ActivityEvent> {
        match category {
            Category::Issues => self.check_issues(repo, cursor).await,
            Category::PullRequests => self.check_pull_requests(repo, cursor).await,
            Category::Commits => self.check_commits(repo, cursor).await,
        }
    }

    async fn check_issues(&self, repo: &RepoId, cursor: DateTime<Utc>) -> Vec<ActivityEvent> {
        let issues = match self.api.list_issues_since(repo, cursor).await {
            Ok(issues) => issues,
            Err(e) => return self.note_fetch_failure(repo, Category::Issues, e),
        };

        let mut events = Vec::new();
        for issue in issues {
            let action = classify_issue(&issue, cursor);
            if !self.filter.allows_issue(action) {
                debug!(repo = %repo, number = issue.number, action = %action, "issue event outside allow-set");
                continue;
            }
            events.push(ActivityEvent::Issue(IssueEvent {
                action,
                repo: repo.clone(),
                actor: issue.user.clone(),
                issue,
            }));
        }
        events
    }

    async fn check_pull_requests(&self, repo: &RepoId, cursor: DateTime<Utc>) -> Vec<ActivityEvent> {
        let pulls = match self.api.list_pull_requests(repo).await {
            Ok(pulls) => pulls,
            Err(e) => return self.note_fetch_failure(repo, Category::PullRequests, e),
        };

        let mut events = Vec::new();
        for pull in pulls {
            // No server-side since filter on this endpoint; the classifier
            // gates on updated_at.
            let Some(classified) = classify_pull_request(&pull, cursor) else {
                continue;
            };
            if !self.filter.allows_pull(classified.action) {
                debug!(repo = %repo, number = pull.number, action = %classified.action, "pull request event outside allow-set");
                continue;
            }
            events.push(ActivityEvent::PullRequest(PullRequestEvent {
                action: classified.action,
                merged: classified.merged,
                repo: repo.clone(),
                actor: pull.user.clone(),
                pull_request: pull,
            }));
        }
        events
    }

    async fn check_commits(&self, repo: &RepoId, cursor: DateTime<Utc>) -> Vec<ActivityEvent> {
        let commits = match self.api.list_commits_since(repo, cursor).await {
            Ok(commits) => commits,
            Err(e) => return self.note_fetch_failure(repo, Category::Commits, e),
        };
        if commits.is_empty() {
            return Vec::new();
        }
        if !self.filter.allows_commit(CommitAction::Pushed) {
            debug!(repo = %repo, count = commits.len(), "commit events outside allow-set");
            return Vec::new();
        }

        // Default branch resolved once per tick; commits are attributed to
        // it regardless of the branch they actually landed on.
        let branch = match self.api.get_repository(repo).await {
            Ok(meta) => meta.default_branch.unwrap_or_else(|| "main".to_string()),
            Err(e) => return self.note_fetch_failure(repo, Category::Commits, e),
        };

        let mut events = Vec::new();
        for commit in commits.into_iter().take(MAX_COMMITS_PER_TICK) {
            // Secondary, best-effort enrichment; failure never drops the
            // primary event.
            let files = match self.api.commit_files(repo, &commit.sha).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(repo = %repo, sha = commit.short_sha(), error = %e, "commit enrichment failed; dispatching without file detail");
                    None
                }
            };

            let actor = commit
                .author
                .clone()
                .unwrap_or_else(|| Account::unlinked(commit.commit.author.name.clone()));
            info!(repo = %repo, sha = commit.short_sha(), author = %actor.login, "found new commit");

            events.push(ActivityEvent::Commit(CommitEvent {
                action: CommitAction::Pushed,
                repo: repo.clone(),
                actor,
                branch: branch.clone(),
                commit,
                files,
            }));
        }
        events
    }

    /// Applies the failure policy for a failed category fetch. The cursor
    /// has already been advanced: failures are seen, not unseen.
    fn note_fetch_failure(
        &self,
        repo: &RepoId,
        category: Category,
        err: ApiError,
    ) -> Vec<ActivityEvent> {
        if err.kind.invalidates_repository() {
            warn!(repo = %repo, category = %category, error = %err, "repository no longer accessible; removing from monitored set");
            self.invalidate(repo);
        } else {
            warn!(repo = %repo, category = %category, error = %err, "fetch failed; category yields nothing this tick");
        }
        Vec::new()
    }

    /// Permanently drops a repository for the life of the process. Only an
    /// explicit re-validation via [`add_repository`](Self::add_repository)
    /// can bring it back.
    fn invalidate(&self, repo: &RepoId) {
        self.monitored
            .lock()
            .expect("monitored lock poisoned")
            .retain(|r| r != repo);
        self.cursors.remove_repo(repo);
    }

    async fn dispatch<C: EventConsumer>(&self, consumer: &C, event: ActivityEvent) {
        let repo = event.repo_id().clone();
        let action = event.action_name();
        debug!(repo = %repo, action, "dispatching event");
        if let Err(e) = consumer.handle(event).await {
            warn!(repo = %repo, action, error = %e, "consumer failed to handle event");
        }
    }
}
