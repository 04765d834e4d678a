//! Newtype wrappers for domain identifiers.
//!
//! `RepoId` is the unique key for everything the engine tracks: monitored
//! repositories, cursors, and event attribution all hang off the
//! `owner/name` pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A repository identifier (`owner/name` format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Error returned when a repository identifier is not `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository identifier {input:?}: expected owner/name")]
pub struct InvalidRepoId {
    pub input: String,
}

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoId::new(owner, name))
            }
            _ => Err(InvalidRepoId {
                input: s.to_string(),
            }),
        }
    }
}

/// An activity category the engine polls.
///
/// Each monitored repository carries one cursor per category. The tick order
/// is fixed: issues, then pull requests, then commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Issues,
    PullRequests,
    Commits,
}

impl Category {
    /// All categories, in tick processing order.
    pub const ALL: [Category; 3] = [Category::Issues, Category::PullRequests, Category::Commits];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Issues => "issues",
            Category::PullRequests => "pull_requests",
            Category::Commits => "commits",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
