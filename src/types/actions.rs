//! Action verbs and the per-category allow-sets.
//!
//! The classifier maps every raw record into exactly one verb from a bounded
//! vocabulary. The operator configures, per category, which verbs are
//! surfaced to the consumer; everything else is classified, counted as seen,
//! and dropped.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Action performed on an issue or pull request.
///
/// Pull requests share the issue vocabulary: merged and unmerged closures
/// both classify as `Closed` (the event carries a separate `merged` flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    Opened,
    Closed,
    Reopened,
    Updated,
}

impl IssueAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueAction::Opened => "opened",
            IssueAction::Closed => "closed",
            IssueAction::Reopened => "reopened",
            IssueAction::Updated => "updated",
        }
    }
}

impl fmt::Display for IssueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opened" => Ok(IssueAction::Opened),
            "closed" => Ok(IssueAction::Closed),
            "reopened" => Ok(IssueAction::Reopened),
            "updated" => Ok(IssueAction::Updated),
            _ => Err(UnknownAction {
                verb: s.to_string(),
            }),
        }
    }
}

/// Action performed on a commit. `Pushed` is the only verb this category
/// ever produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitAction {
    Pushed,
}

impl CommitAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitAction::Pushed => "pushed",
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pushed" => Ok(CommitAction::Pushed),
            _ => Err(UnknownAction {
                verb: s.to_string(),
            }),
        }
    }
}

/// Error for a verb outside the bounded vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action verb {verb:?}")]
pub struct UnknownAction {
    pub verb: String,
}

/// The configured allow-sets, one per category.
///
/// A classified event whose verb is not in its category's set is dropped
/// after classification; the cursor still advances.
#[derive(Debug, Clone)]
pub struct ActionFilter {
    issues: HashSet<IssueAction>,
    pulls: HashSet<IssueAction>,
    commits: HashSet<CommitAction>,
}

impl ActionFilter {
    pub fn new(
        issues: HashSet<IssueAction>,
        pulls: HashSet<IssueAction>,
        commits: HashSet<CommitAction>,
    ) -> Self {
        ActionFilter {
            issues,
            pulls,
            commits,
        }
    }

    /// Allow-set that surfaces every verb, for diagnostics and tests.
    pub fn allow_all() -> Self {
        ActionFilter {
            issues: [
                IssueAction::Opened,
                IssueAction::Closed,
                IssueAction::Reopened,
                IssueAction::Updated,
            ]
            .into(),
            pulls: [
                IssueAction::Opened,
                IssueAction::Closed,
                IssueAction::Reopened,
                IssueAction::Updated,
            ]
            .into(),
            commits: [CommitAction::Pushed].into(),
        }
    }

    pub fn allows_issue(&self, action: IssueAction) -> bool {
        self.issues.contains(&action)
    }

    pub fn allows_pull(&self, action: IssueAction) -> bool {
        self.pulls.contains(&action)
    }

    pub fn allows_commit(&self, action: CommitAction) -> bool {
        self.commits.contains(&action)
    }

    pub fn issue_actions(&self) -> Vec<IssueAction> {
        let mut actions: Vec<_> = self.issues.iter().copied().collect();
        actions.sort_by_key(IssueAction::as_str);
        actions
    }

    pub fn commit_actions(&self) -> Vec<CommitAction> {
        let mut actions: Vec<_> = self.commits.iter().copied().collect();
        actions.sort_by_key(CommitAction::as_str);
        actions
    }
}

/// Parses a comma-separated verb list into an allow-set.
///
/// Unknown verbs are logged and skipped rather than rejected, so a typo in
/// the configuration narrows the set instead of killing the process.
pub fn parse_actions<A>(raw: &str) -> HashSet<A>
where
    A: FromStr<Err = UnknownAction> + Eq + std::hash::Hash,
{
    let mut set = HashSet::new();
    for verb in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        match verb.parse::<A>() {
            Ok(action) => {
                set.insert(action);
            }
            Err(e) => {
                tracing::warn!(verb = %e.verb, "ignoring unknown action verb in configuration");
            }
        }
    }
    set
}
