//! Wire records for the GitHub REST API.
//!
//! These structs carry only the fields the engine and the renderer use. They
//! serve double duty: the fetchers deserialize API responses into them, and
//! classified events embed them as payloads. Raw records never outlive the
//! tick that produced them unless they were promoted into an event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub account (user, bot, or organization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// `User` or `Organization`. Only populated on repository owners.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Account {
    /// Sentinel account for commits whose author has no linked GitHub
    /// identity: the raw committer name with a zero numeric id.
    pub fn unlinked(name: impl Into<String>) -> Self {
        Account {
            login: name.into(),
            id: 0,
            avatar_url: None,
            kind: None,
        }
    }
}

/// Repository metadata, as returned by `GET /repos/{owner}/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    pub html_url: String,
    pub owner: Account,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visibility: Option<String>,
    /// Passed through verbatim to the discovery listing.
    #[serde(default)]
    pub permissions: Option<serde_json::Value>,
}

/// Open/closed state of an issue or pull request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    Open,
    Closed,
}

/// An issue record.
///
/// GitHub's issues endpoint also returns pull requests in issue shape; such
/// records carry a `pull_request` marker and are excluded by the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: RecordState,
    pub html_url: String,
    pub user: Account,
    #[serde(default)]
    pub assignees: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Present when this record is actually a pull request in disguise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

/// A branch reference on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: String,
}

/// A pull request record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: RecordState,
    pub html_url: String,
    pub user: Account,
    #[serde(default)]
    pub assignees: Vec<Account>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    pub head: BranchRef,
    pub base: BranchRef,
}

impl PullRequest {
    /// Whether this PR has been merged (derived from `merged_at`; the list
    /// endpoint does not populate a boolean `merged` field).
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

/// Name/email/date signature on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSignature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// Tree reference carried by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRef {
    pub sha: String,
    pub url: String,
}

/// The git-level part of a commit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: CommitSignature,
    pub committer: CommitSignature,
    pub tree: TreeRef,
}

/// A commit record, as returned by `GET /repos/{owner}/{name}/commits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitDetail,
    /// The linked GitHub account of the author, when one exists.
    #[serde(default)]
    pub author: Option<Account>,
}

impl Commit {
    /// Short (7-character) SHA for display.
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// File-level change summary attached to a commit by the enricher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChanges {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_deserializes_with_pull_request_marker() {
        let json = serde_json::json!({
            "id": 1,
            "number": 7,
            "title": "Add frobnicator",
            "state": "open",
            "html_url": "https://github.com/acme/widgets/pull/7",
            "user": { "login": "octocat", "id": 583231 },
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z",
            "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/7" }
        });
        let issue: Issue = serde_json::from_value(json).unwrap();
        assert!(issue.pull_request.is_some());
        assert_eq!(issue.state, RecordState::Open);
        assert!(issue.closed_at.is_none());
    }

    #[test]
    fn pull_request_merged_derives_from_merged_at() {
        let json = serde_json::json!({
            "id": 2,
            "number": 8,
            "title": "Fix crash",
            "state": "closed",
            "html_url": "https://github.com/acme/widgets/pull/8",
            "user": { "login": "octocat", "id": 583231 },
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-02T10:00:00Z",
            "closed_at": "2024-05-02T10:00:00Z",
            "merged_at": "2024-05-02T10:00:00Z",
            "head": { "ref": "fix-crash", "sha": "0123456789abcdef0123456789abcdef01234567" },
            "base": { "ref": "main", "sha": "89abcdef0123456789abcdef0123456789abcdef" }
        });
        let pr: PullRequest = serde_json::from_value(json).unwrap();
        assert!(pr.is_merged());
        assert_eq!(pr.state, RecordState::Closed);
    }

    #[test]
    fn commit_short_sha_handles_short_input() {
        let json = serde_json::json!({
            "sha": "abc",
            "html_url": "https://github.com/acme/widgets/commit/abc",
            "commit": {
                "message": "initial",
                "author": { "name": "Jo", "email": "jo@example.com", "date": "2024-05-01T10:00:00Z" },
                "committer": { "name": "Jo", "email": "jo@example.com", "date": "2024-05-01T10:00:00Z" },
                "tree": { "sha": "def", "url": "https://api.github.com/trees/def" }
            }
        });
        let commit: Commit = serde_json::from_value(json).unwrap();
        assert_eq!(commit.short_sha(), "abc");
        assert!(commit.author.is_none());
    }

    #[test]
    fn unlinked_account_uses_sentinel_id() {
        let account = Account::unlinked("Jo Smith");
        assert_eq!(account.login, "Jo Smith");
        assert_eq!(account.id, 0);
        assert!(account.avatar_url.is_none());
    }
}
