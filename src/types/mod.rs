//! Core domain types for the activity poller.
//!
//! Identifiers, action vocabularies, wire records, and the classified event
//! union live here; everything else in the crate is expressed in terms of
//! these types.

pub mod actions;
pub mod events;
pub mod ids;
pub mod records;

// Re-export commonly used types at the module level
pub use actions::{ActionFilter, CommitAction, IssueAction, UnknownAction, parse_actions};
pub use events::{ActivityEvent, CommitEvent, IssueEvent, PullRequestEvent};
pub use ids::{Category, InvalidRepoId, RepoId};
pub use records::{
    Account, BranchRef, Commit, CommitDetail, CommitSignature, FileChanges, Issue, PullRequest,
    RecordState, Repository, TreeRef,
};
