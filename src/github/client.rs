//! Octocrab-backed implementation of the activity API.
//!
//! All endpoints go through `Octocrab::get` with locally defined response
//! shapes, so the record structs carry exactly the fields the engine uses
//! and the query parameters match the reference behavior (issues filtered
//! server-side with `since`, pull requests sorted by update only, commits
//! capped per page).

use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::sync::MAX_COMMITS_PER_TICK;
use crate::types::{Commit, FileChanges, Issue, PullRequest, RepoId, Repository};

use super::error::ApiError;
use super::{GitHubApi, RepoListQuery};

/// A GitHub API client authenticated with a personal token.
pub struct GitHubClient {
    inner: Octocrab,

    /// Login of the authenticated account, fetched once on first use.
    viewer: OnceCell<String>,
}

impl GitHubClient {
    /// Creates a client from a bearer token.
    pub fn new(token: impl Into<String>) -> Result<Self, ApiError> {
        let inner = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(ApiError::from_octocrab)?;
        Ok(Self::from_octocrab(inner))
    }

    /// Creates a client from a pre-configured Octocrab instance. Use this
    /// when custom authentication (e.g. an app installation token) is needed.
    pub fn from_octocrab(inner: Octocrab) -> Self {
        GitHubClient {
            inner,
            viewer: OnceCell::new(),
        }
    }

    async fn get<R, P>(&self, route: String, parameters: Option<&P>) -> Result<R, ApiError>
    where
        R: serde::de::DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.inner
            .get(route, parameters)
            .await
            .map_err(ApiError::from_octocrab)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

/// ISO-8601 timestamp as the API's `since` filters expect it.
fn to_since(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Serialize)]
struct IssueListParams {
    state: &'static str,
    since: String,
    sort: &'static str,
    direction: &'static str,
    per_page: u8,
}

#[derive(Serialize)]
struct PullListParams {
    state: &'static str,
    sort: &'static str,
    direction: &'static str,
    per_page: u8,
}

#[derive(Serialize)]
struct CommitListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
    per_page: u8,
}

/// `GET /repos/{owner}/{name}/commits/{sha}`; only the file list matters.
#[derive(Debug, Deserialize)]
struct CommitFileDetail {
    #[serde(default)]
    files: Option<Vec<CommitFileEntry>>,
}

#[derive(Debug, Deserialize)]
struct CommitFileEntry {
    filename: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    login: String,
}

impl GitHubApi for GitHubClient {
    async fn get_repository(&self, repo: &RepoId) -> Result<Repository, ApiError> {
        self.get(format!("/repos/{repo}"), None::<&()>).await
    }

    async fn list_issues_since(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Issue>, ApiError> {
        let params = IssueListParams {
            state: "all",
            since: to_since(since),
            sort: "updated",
            direction: "desc",
            per_page: 100,
        };
        let issues: Vec<Issue> = self
            .get(format!("/repos/{repo}/issues"), Some(&params))
            .await?;

        // The issues endpoint returns pull requests in issue shape; drop them.
        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .collect())
    }

    async fn list_pull_requests(&self, repo: &RepoId) -> Result<Vec<PullRequest>, ApiError> {
        let params = PullListParams {
            state: "all",
            sort: "updated",
            direction: "desc",
            per_page: 100,
        };
        self.get(format!("/repos/{repo}/pulls"), Some(&params))
            .await
    }

    async fn list_commits_since(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Commit>, ApiError> {
        let params = CommitListParams {
            since: Some(to_since(since)),
            per_page: MAX_COMMITS_PER_TICK as u8,
        };
        self.get(format!("/repos/{repo}/commits"), Some(&params))
            .await
    }

    async fn list_recent_commits(&self, repo: &RepoId, count: u8) -> Result<Vec<Commit>, ApiError> {
        let params = CommitListParams {
            since: None,
            per_page: count,
        };
        self.get(format!("/repos/{repo}/commits"), Some(&params))
            .await
    }

    async fn commit_files(&self, repo: &RepoId, sha: &str) -> Result<Option<FileChanges>, ApiError> {
        let detail: CommitFileDetail = self
            .get(format!("/repos/{repo}/commits/{sha}"), None::<&()>)
            .await?;

        let Some(files) = detail.files else {
            return Ok(None);
        };

        let mut changes = FileChanges::default();
        for file in files {
            match file.status.as_str() {
                "added" => changes.added.push(file.filename),
                "modified" => changes.modified.push(file.filename),
                "removed" => changes.removed.push(file.filename),
                // renamed/copied/changed are not binned by the receipt format
                _ => {}
            }
        }
        Ok(Some(changes))
    }

    async fn viewer_login(&self) -> Result<String, ApiError> {
        self.viewer
            .get_or_try_init(|| async {
                let viewer: Viewer = self.get("/user".to_string(), None::<&()>).await?;
                Ok(viewer.login)
            })
            .await
            .cloned()
    }

    async fn list_viewer_repositories(
        &self,
        query: &RepoListQuery,
    ) -> Result<Vec<Repository>, ApiError> {
        self.get("/user/repos".to_string(), Some(query)).await
    }
}
