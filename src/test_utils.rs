//! Shared test fixtures: an in-memory GitHub fake, record builders, and
//! scripted consumers.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::consumer::EventConsumer;
use crate::github::{ApiError, ApiErrorKind, GitHubApi, RepoListQuery};
use crate::types::{
    Account, ActivityEvent, BranchRef, Commit, CommitDetail, CommitSignature, FileChanges, Issue,
    PullRequest, RecordState, RepoId, Repository, TreeRef,
};

#[derive(Default)]
struct FakeState {
    repositories: HashMap<RepoId, Repository>,
    issues: HashMap<RepoId, Vec<Issue>>,
    pulls: HashMap<RepoId, Vec<PullRequest>>,
    commits: HashMap<RepoId, Vec<Commit>>,
    files: HashMap<String, FileChanges>,
    failures: HashMap<RepoId, ApiErrorKind>,
    fail_files: bool,
    calls: Vec<String>,
}

/// In-memory stand-in for the GitHub API.
///
/// Records are returned with the same filtering semantics as the real
/// endpoints: issues honor `since` and exclude pull-request-shaped records,
/// pull requests are returned unfiltered, commits honor `since`. A scripted
/// failure kind makes every fetch for that repository fail.
pub struct FakeGitHub {
    viewer: String,
    state: Mutex<FakeState>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        FakeGitHub {
            viewer: "octocat".to_string(),
            state: Mutex::new(FakeState::default()),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock poisoned")
    }

    pub fn add_repository(&self, repo: &RepoId) {
        self.add_repository_record(repository_record(repo));
    }

    pub fn add_repository_record(&self, record: Repository) {
        let id: RepoId = record.full_name.parse().expect("valid full_name");
        self.guard().repositories.insert(id, record);
    }

    pub fn push_issue(&self, repo: &RepoId, issue: Issue) {
        self.guard().issues.entry(repo.clone()).or_default().push(issue);
    }

    pub fn push_pull(&self, repo: &RepoId, pull: PullRequest) {
        self.guard().pulls.entry(repo.clone()).or_default().push(pull);
    }

    pub fn push_commit(&self, repo: &RepoId, commit: Commit) {
        self.guard()
            .commits
            .entry(repo.clone())
            .or_default()
            .push(commit);
    }

    pub fn set_files(&self, sha: &str, files: FileChanges) {
        self.guard().files.insert(sha.to_string(), files);
    }

    /// Makes every subsequent fetch for `repo` fail with the given kind.
    pub fn fail_with(&self, repo: &RepoId, kind: ApiErrorKind) {
        self.guard().failures.insert(repo.clone(), kind);
    }

    pub fn clear_failure(&self, repo: &RepoId) {
        self.guard().failures.remove(repo);
    }

    /// Makes commit enrichment fail while list fetches keep working.
    pub fn fail_files(&self, fail: bool) {
        self.guard().fail_files = fail;
    }

    /// Number of API calls made for `repo`, across all endpoints.
    pub fn fetch_calls(&self, repo: &RepoId) -> usize {
        let suffix = format!(":{repo}");
        self.guard()
            .calls
            .iter()
            .filter(|c| c.ends_with(&suffix))
            .count()
    }

    fn call(&self, endpoint: &str, repo: &RepoId) -> Result<(), ApiError> {
        let mut state = self.guard();
        state.calls.push(format!("{endpoint}:{repo}"));
        match state.failures.get(repo) {
            Some(kind) => Err(ApiError::new(*kind, "scripted failure")),
            None => Ok(()),
        }
    }
}

impl Default for FakeGitHub {
    fn default() -> Self {
        FakeGitHub::new()
    }
}

impl GitHubApi for FakeGitHub {
    async fn get_repository(&self, repo: &RepoId) -> Result<Repository, ApiError> {
        self.call("meta", repo)?;
        self.guard()
            .repositories
            .get(repo)
            .cloned()
            .ok_or_else(|| ApiError::new(ApiErrorKind::NotFound, "no such repository"))
    }

    async fn list_issues_since(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Issue>, ApiError> {
        self.call("issues", repo)?;
        Ok(self
            .guard()
            .issues
            .get(repo)
            .map(|issues| {
                issues
                    .iter()
                    .filter(|i| i.updated_at >= since && i.pull_request.is_none())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_pull_requests(&self, repo: &RepoId) -> Result<Vec<PullRequest>, ApiError> {
        self.call("pulls", repo)?;
        Ok(self.guard().pulls.get(repo).cloned().unwrap_or_default())
    }

    async fn list_commits_since(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Commit>, ApiError> {
        self.call("commits", repo)?;
        Ok(self
            .guard()
            .commits
            .get(repo)
            .map(|commits| {
                commits
                    .iter()
                    .filter(|c| c.commit.committer.date > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_recent_commits(&self, repo: &RepoId, count: u8) -> Result<Vec<Commit>, ApiError> {
        self.call("recent", repo)?;
        Ok(self
            .guard()
            .commits
            .get(repo)
            .map(|commits| commits.iter().rev().take(count as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn commit_files(&self, repo: &RepoId, sha: &str) -> Result<Option<FileChanges>, ApiError> {
        self.call("files", repo)?;
        let state = self.guard();
        if state.fail_files {
            return Err(ApiError::new(ApiErrorKind::Transient, "scripted enrichment failure"));
        }
        Ok(state.files.get(sha).cloned())
    }

    async fn viewer_login(&self) -> Result<String, ApiError> {
        Ok(self.viewer.clone())
    }

    async fn list_viewer_repositories(
        &self,
        _query: &RepoListQuery,
    ) -> Result<Vec<Repository>, ApiError> {
        let mut repos: Vec<_> = self.guard().repositories.values().cloned().collect();
        repos.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(repos)
    }
}

pub fn repository_record(repo: &RepoId) -> Repository {
    Repository {
        id: 1000,
        full_name: repo.to_string(),
        html_url: format!("https://github.com/{repo}"),
        owner: Account {
            login: repo.owner.clone(),
            id: 10,
            avatar_url: None,
            kind: Some("User".to_string()),
        },
        description: Some("test repository".to_string()),
        private: false,
        default_branch: Some("main".to_string()),
        updated_at: Some(Utc::now()),
        visibility: Some("public".to_string()),
        permissions: None,
    }
}

pub fn issue_record(
    number: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    state: RecordState,
    closed_at: Option<DateTime<Utc>>,
) -> Issue {
    Issue {
        id: number * 100,
        number,
        title: format!("Issue #{number}"),
        body: Some("something is wrong".to_string()),
        state,
        html_url: format!("https://github.com/acme/widgets/issues/{number}"),
        user: Account {
            login: "octocat".to_string(),
            id: 583231,
            avatar_url: None,
            kind: None,
        },
        assignees: vec![],
        created_at: created,
        updated_at: updated,
        closed_at,
        pull_request: None,
    }
}

pub fn pull_record(
    number: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    state: RecordState,
    merged_at: Option<DateTime<Utc>>,
) -> PullRequest {
    PullRequest {
        id: number * 100,
        number,
        title: format!("PR #{number}"),
        body: None,
        state,
        html_url: format!("https://github.com/acme/widgets/pull/{number}"),
        user: Account {
            login: "octocat".to_string(),
            id: 583231,
            avatar_url: None,
            kind: None,
        },
        assignees: vec![],
        created_at: created,
        updated_at: updated,
        closed_at: merged_at,
        merged_at,
        merge_commit_sha: None,
        head: BranchRef {
            name: format!("feature-{number}"),
            sha: "0123456789abcdef0123456789abcdef01234567".to_string(),
        },
        base: BranchRef {
            name: "main".to_string(),
            sha: "89abcdef0123456789abcdef0123456789abcdef".to_string(),
        },
    }
}

pub fn commit_record(sha: &str, date: DateTime<Utc>) -> Commit {
    Commit {
        sha: sha.to_string(),
        html_url: format!("https://github.com/acme/widgets/commit/{sha}"),
        commit: CommitDetail {
            message: "fix the widget".to_string(),
            author: CommitSignature {
                name: "Jo Smith".to_string(),
                email: "jo@example.com".to_string(),
                date,
            },
            committer: CommitSignature {
                name: "Jo Smith".to_string(),
                email: "jo@example.com".to_string(),
                date,
            },
            tree: TreeRef {
                sha: "def".to_string(),
                url: "https://api.github.com/trees/def".to_string(),
            },
        },
        author: None,
    }
}

/// Consumer that records every event it is handed.
#[derive(Clone, Default)]
pub struct RecordingConsumer {
    events: Arc<Mutex<Vec<ActivityEvent>>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        RecordingConsumer::default()
    }

    pub fn events(&self) -> Vec<ActivityEvent> {
        self.events.lock().expect("events lock poisoned").clone()
    }
}

impl EventConsumer for RecordingConsumer {
    type Error = Infallible;

    async fn handle(&self, event: ActivityEvent) -> Result<(), Infallible> {
        self.events.lock().expect("events lock poisoned").push(event);
        Ok(())
    }
}

/// Consumer whose `handle` always fails, counting attempts.
#[derive(Clone, Default)]
pub struct FailingConsumer {
    attempts: Arc<AtomicUsize>,
}

impl FailingConsumer {
    pub fn new() -> Self {
        FailingConsumer::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EventConsumer for FailingConsumer {
    type Error = String;

    async fn handle(&self, _event: ActivityEvent) -> Result<(), String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("scripted consumer failure".to_string())
    }
}

/// Consumer that blocks inside `handle` until released, for overlap tests.
#[derive(Clone)]
pub struct BlockingConsumer {
    gate: Arc<Notify>,
    handled: Arc<AtomicUsize>,
}

impl BlockingConsumer {
    pub fn new() -> Self {
        BlockingConsumer {
            gate: Arc::new(Notify::new()),
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

impl EventConsumer for BlockingConsumer {
    type Error = Infallible;

    async fn handle(&self, _event: ActivityEvent) -> Result<(), Infallible> {
        self.gate.notified().await;
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
