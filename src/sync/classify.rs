//! Classification of raw records into semantic actions.
//!
//! A classifier sees a raw record plus the cursor value that was current
//! when the fetch started, and decides which verb (if any) describes what
//! happened since that cursor. The decision ladders are ordered; the first
//! match wins.

use chrono::{DateTime, Utc};

use crate::types::{Issue, IssueAction, PullRequest, RecordState};

/// Classifies an issue record against the category cursor.
///
/// Ladder, first match wins:
/// 1. created after the cursor → `opened`
/// 2. closed, and closed after the cursor → `closed`
/// 3. open but closed at some point before → `reopened`
/// 4. anything else → `updated`
pub fn classify_issue(issue: &Issue, cursor: DateTime<Utc>) -> IssueAction {
    if issue.created_at > cursor {
        IssueAction::Opened
    } else if issue.state == RecordState::Closed
        && issue.closed_at.is_some_and(|closed| closed > cursor)
    {
        IssueAction::Closed
    } else if issue.state == RecordState::Open && issue.closed_at.is_some() {
        IssueAction::Reopened
    } else {
        IssueAction::Updated
    }
}

/// A classified pull request: the verb plus the independently derived
/// `merged` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullClassification {
    pub action: IssueAction,
    pub merged: bool,
}

/// Classifies a pull request record against the category cursor.
///
/// The pulls endpoint has no server-side `since` filter, so the first gate
/// compensates: a record not updated after the cursor is dropped outright,
/// whatever its other fields say. Merged and unmerged closures collapse to
/// `closed` deliberately; the `merged` flag carries the distinction.
pub fn classify_pull_request(
    pr: &PullRequest,
    cursor: DateTime<Utc>,
) -> Option<PullClassification> {
    if pr.updated_at <= cursor {
        return None;
    }

    let action = if pr.created_at > cursor {
        IssueAction::Opened
    } else if pr.state == RecordState::Closed {
        IssueAction::Closed
    } else if pr.state == RecordState::Open && pr.merged_at.is_none() {
        IssueAction::Reopened
    } else {
        IssueAction::Updated
    };

    Some(PullClassification {
        action,
        merged: pr.is_merged(),
    })
}
