//! GitHub API access.
//!
//! `GitHubApi` is the engine's only window onto the remote side; the
//! octocrab-backed `GitHubClient` implements it in production and an
//! in-memory fake stands in for tests. The trait's surface is exactly the
//! set of remote operations the synchronization engine and the discovery
//! listing consume.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Commit, FileChanges, Issue, PullRequest, RepoId, Repository};

mod client;
mod error;

pub use client::GitHubClient;
pub use error::{ApiError, ApiErrorKind};

/// The remote activity API consumed by the engine.
///
/// Every method is a single authorized request (or one page of one). No
/// method retries; the engine's failure policy decides what a failed fetch
/// means.
pub trait GitHubApi: Send + Sync {
    /// Repository metadata; also the existence/authorization probe used by
    /// the validator.
    fn get_repository(
        &self,
        repo: &RepoId,
    ) -> impl Future<Output = Result<Repository, ApiError>> + Send;

    /// Issues of any state updated since the cursor, most recently updated
    /// first, with pull-request-shaped records excluded.
    fn list_issues_since(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Issue>, ApiError>> + Send;

    /// Pull requests of any state, most recently updated first. The endpoint
    /// has no `since` filter; the classifier enforces the temporal cutoff.
    fn list_pull_requests(
        &self,
        repo: &RepoId,
    ) -> impl Future<Output = Result<Vec<PullRequest>, ApiError>> + Send;

    /// Commits newer than the cursor, capped at
    /// [`MAX_COMMITS_PER_TICK`](crate::sync::MAX_COMMITS_PER_TICK).
    fn list_commits_since(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Commit>, ApiError>> + Send;

    /// The most recent commits regardless of cursors, for diagnostics.
    fn list_recent_commits(
        &self,
        repo: &RepoId,
        count: u8,
    ) -> impl Future<Output = Result<Vec<Commit>, ApiError>> + Send;

    /// File-level change summary for one commit. `Ok(None)` means the API
    /// returned no file list; errors are the caller's (non-fatal) problem.
    fn commit_files(
        &self,
        repo: &RepoId,
        sha: &str,
    ) -> impl Future<Output = Result<Option<FileChanges>, ApiError>> + Send;

    /// Login of the authenticated account.
    fn viewer_login(&self) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Repositories the credential can access.
    fn list_viewer_repositories(
        &self,
        query: &RepoListQuery,
    ) -> impl Future<Output = Result<Vec<Repository>, ApiError>> + Send;
}

/// Query parameters for the discovery listing (`GET /user/repos`).
#[derive(Debug, Clone, Serialize)]
pub struct RepoListQuery {
    pub affiliation: String,
    pub sort: String,
    pub direction: String,
    pub per_page: u8,
}

impl Default for RepoListQuery {
    fn default() -> Self {
        RepoListQuery {
            affiliation: "owner,collaborator,organization_member".to_string(),
            sort: "full_name".to_string(),
            direction: "asc".to_string(),
            per_page: 100,
        }
    }
}

/// Best-effort relationship between the authenticated account and a
/// repository, inferred from identity comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Owner,
    OrganizationMember,
    Collaborator,
}

impl Relationship {
    /// Infers the relationship for a repository given the viewer's login.
    pub fn infer(repo: &Repository, viewer: &str) -> Self {
        if repo.owner.login == viewer {
            Relationship::Owner
        } else if repo.owner.kind.as_deref() == Some("Organization") {
            Relationship::OrganizationMember
        } else {
            Relationship::Collaborator
        }
    }
}
