//! Plain-text receipt rendering.
//!
//! Every classified event renders to a short fixed-width receipt: a header
//! naming what happened, the key fields of the record, the free-text body,
//! the canonical URL, and a print timestamp. The output is plain ASCII so it
//! survives both a terminal and a thermal printer.

use chrono::{DateTime, Utc};

use crate::types::{
    ActivityEvent, Commit, CommitEvent, FileChanges, IssueAction, IssueEvent, PullRequestEvent,
    RecordState,
};

const SEPARATOR: &str = "------------------------";

/// Renders one event as receipt text, ending in a trailing newline.
pub fn render_event(event: &ActivityEvent, printed_at: DateTime<Utc>) -> String {
    match event {
        ActivityEvent::Issue(e) => render_issue(e, printed_at),
        ActivityEvent::PullRequest(e) => render_pull_request(e, printed_at),
        ActivityEvent::Commit(e) => render_commit(e, printed_at),
    }
}

fn issue_header(action: IssueAction) -> &'static str {
    match action {
        IssueAction::Opened => "New GitHub Issue",
        IssueAction::Reopened => "Reopened GitHub Issue",
        IssueAction::Closed => "Closed GitHub Issue",
        IssueAction::Updated => "GitHub Issue (updated)",
    }
}

/// Merged closures get their own header; the verb alone cannot tell a merge
/// from a discard.
fn pull_header(action: IssueAction, merged: bool) -> &'static str {
    if merged && action == IssueAction::Closed {
        return "Merged GitHub Pull Request";
    }
    match action {
        IssueAction::Opened => "New GitHub Pull Request",
        IssueAction::Reopened => "Reopened GitHub Pull Request",
        IssueAction::Closed => "Closed GitHub Pull Request",
        IssueAction::Updated => "GitHub Pull Request (updated)",
    }
}

fn state_name(state: RecordState) -> &'static str {
    match state {
        RecordState::Open => "open",
        RecordState::Closed => "closed",
    }
}

fn assignee_line(assignees: &[crate::types::Account]) -> String {
    if assignees.is_empty() {
        "None".to_string()
    } else {
        assignees
            .iter()
            .map(|a| a.login.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn body_block(body: Option<&str>) -> &str {
    match body {
        Some(text) if !text.trim().is_empty() => text,
        _ => "No description",
    }
}

fn footer(out: &mut String, url: &str, printed_at: DateTime<Utc>) {
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(url);
    out.push('\n');
    out.push_str(&format!(
        "Printed at {}\n",
        printed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
}

fn render_issue(event: &IssueEvent, printed_at: DateTime<Utc>) -> String {
    let issue = &event.issue;
    let mut out = String::new();
    out.push_str(issue_header(event.action));
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&format!("Repo: {}\n", event.repo));
    out.push_str(&format!("Issue: #{}\n", issue.number));
    out.push_str(&format!("Title: {}\n", issue.title));
    out.push_str(&format!("Author: {}\n", event.actor.login));
    out.push_str(&format!("Assignees: {}\n", assignee_line(&issue.assignees)));
    out.push_str(&format!("State: {}\n", state_name(issue.state)));
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(body_block(issue.body.as_deref()));
    out.push('\n');
    footer(&mut out, &issue.html_url, printed_at);
    out
}

fn render_pull_request(event: &PullRequestEvent, printed_at: DateTime<Utc>) -> String {
    let pr = &event.pull_request;
    let mut out = String::new();
    out.push_str(pull_header(event.action, event.merged));
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&format!("Repo: {}\n", event.repo));
    out.push_str(&format!("PR: #{}\n", pr.number));
    out.push_str(&format!("Title: {}\n", pr.title));
    out.push_str(&format!("Author: {}\n", event.actor.login));
    out.push_str(&format!("Assignees: {}\n", assignee_line(&pr.assignees)));
    out.push_str(&format!("State: {}\n", state_name(pr.state)));
    out.push_str(&format!("Branch: {} -> {}\n", pr.head.name, pr.base.name));
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(body_block(pr.body.as_deref()));
    out.push('\n');
    footer(&mut out, &pr.html_url, printed_at);
    out
}

fn render_commit(event: &CommitEvent, printed_at: DateTime<Utc>) -> String {
    let commit = &event.commit;
    let mut out = String::new();
    out.push_str("New Commit Pushed\n");
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&format!("Repo: {}\n", event.repo));
    out.push_str(&format!("Commit: {}\n", commit.short_sha()));
    out.push_str(&format!("Branch: {}\n", event.branch));
    out.push_str(&format!("Author: {}\n", event.actor.login));
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&commit.commit.message);
    out.push('\n');
    if let Some(files) = &event.files {
        if !files.is_empty() {
            out.push_str(SEPARATOR);
            out.push('\n');
            file_section(&mut out, files);
        }
    }
    footer(&mut out, &commit.html_url, printed_at);
    out
}

fn file_section(out: &mut String, files: &FileChanges) {
    push_file_list(out, "Added", &files.added);
    push_file_list(out, "Modified", &files.modified);
    push_file_list(out, "Removed", &files.removed);
}

fn push_file_list(out: &mut String, label: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    out.push_str(&format!("{label}:\n"));
    for path in paths {
        out.push_str(&format!("  {path}\n"));
    }
}

/// First line of a commit message, for compact listings.
pub fn summary_line(commit: &Commit) -> &str {
    commit
        .commit
        .message
        .lines()
        .next()
        .unwrap_or(&commit.commit.message)
}
