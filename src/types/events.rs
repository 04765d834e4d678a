//! Classified activity events.
//!
//! `ActivityEvent` is the tagged union handed to the consumer: one variant
//! per category, each carrying its action verb, the originating repository,
//! the actor, and the category-specific payload. An event is created by a
//! classifier, delivered exactly once, and then discarded.

use serde::{Deserialize, Serialize};

use super::actions::{CommitAction, IssueAction};
use super::ids::{Category, RepoId};
use super::records::{Account, Commit, FileChanges, Issue, PullRequest};

/// A classified, deliverable activity event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityEvent {
    Issue(IssueEvent),
    PullRequest(PullRequestEvent),
    Commit(CommitEvent),
}

impl ActivityEvent {
    /// The repository this event originated from.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            ActivityEvent::Issue(e) => &e.repo,
            ActivityEvent::PullRequest(e) => &e.repo,
            ActivityEvent::Commit(e) => &e.repo,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ActivityEvent::Issue(_) => Category::Issues,
            ActivityEvent::PullRequest(_) => Category::PullRequests,
            ActivityEvent::Commit(_) => Category::Commits,
        }
    }

    pub fn action_name(&self) -> &'static str {
        match self {
            ActivityEvent::Issue(e) => e.action.as_str(),
            ActivityEvent::PullRequest(e) => e.action.as_str(),
            ActivityEvent::Commit(e) => e.action.as_str(),
        }
    }

    /// The account the event is attributed to.
    pub fn actor(&self) -> &Account {
        match self {
            ActivityEvent::Issue(e) => &e.actor,
            ActivityEvent::PullRequest(e) => &e.actor,
            ActivityEvent::Commit(e) => &e.actor,
        }
    }
}

/// An issue lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEvent {
    pub action: IssueAction,
    pub repo: RepoId,
    pub actor: Account,
    pub issue: Issue,
}

/// A pull request lifecycle event.
///
/// `merged` is derived from the record independently of the verb: merged and
/// unmerged closures both carry the `closed` verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: IssueAction,
    pub merged: bool,
    pub repo: RepoId,
    pub actor: Account,
    pub pull_request: PullRequest,
}

/// A commit event, attributed to the repository's default branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitEvent {
    pub action: CommitAction,
    pub repo: RepoId,
    pub actor: Account,
    /// Default branch at fetch time, not necessarily the branch the commit
    /// actually landed on.
    pub branch: String,
    pub commit: Commit,
    /// File-level change summary; `None` when enrichment failed.
    pub files: Option<FileChanges>,
}
