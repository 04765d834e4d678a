//! GitHub API error types.
//!
//! The engine's failure policy hinges on three categories:
//!
//! - **NotFound** (404/410, and 403 without rate-limit markers) permanently
//!   drops the repository from the monitored set.
//! - **Unauthorized** (401) excludes a repository at validation time. During
//!   a tick it costs an empty fetch only: a rotated or expired token must not
//!   permanently drop every repository.
//! - **Transient** (5xx, rate limits, network failures, anything
//!   unclassifiable) yields an empty fetch for the current tick only; the
//!   cursor still advances and the next tick retries naturally.

use std::fmt;

use thiserror::Error;

/// The kind of GitHub API error, categorized for the engine's failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Repository (or resource) does not exist or access is forbidden.
    NotFound,

    /// The credential was rejected (401).
    Unauthorized,

    /// Anything expected to resolve on a later tick: 5xx, rate limits,
    /// network trouble, malformed responses.
    Transient,
}

impl ApiErrorKind {
    /// Whether a fetch failing with this kind permanently invalidates the
    /// repository it targeted. Only a definitive "not there / not yours"
    /// answer qualifies; a 401 speaks about the credential, not the
    /// repository.
    pub fn invalidates_repository(&self) -> bool {
        matches!(self, ApiErrorKind::NotFound)
    }
}

/// A categorized GitHub API error.
#[derive(Debug, Error)]
pub struct ApiError {
    pub kind: ApiErrorKind,

    /// HTTP status code, when one could be determined.
    pub status: Option<u16>,

    pub message: String,

    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl ApiError {
    /// Creates an error without an underlying octocrab source.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    ///
    /// GitHub-level errors carry a status code; everything else (transport,
    /// serialization) falls back on message inspection and defaults to
    /// transient, which only costs one empty tick if the guess is wrong.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status = extract_status(&err);
        let message = err.to_string();

        let kind = match status {
            Some(404) | Some(410) => ApiErrorKind::NotFound,
            Some(401) => ApiErrorKind::Unauthorized,
            Some(403) if is_rate_limit_message(&message) => ApiErrorKind::Transient,
            Some(403) => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Transient,
        };

        ApiError {
            kind,
            status,
            message,
            source: Some(err),
        }
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// GitHub-level errors expose the status directly; for other variants the
/// message is scanned for well-known status patterns, and `None` means the
/// error is categorized conservatively as transient.
fn extract_status(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }

    let err_str = err.to_string();
    for code in [401u16, 403, 404, 410, 429, 500, 502, 503] {
        if err_str.contains(&code.to_string()) {
            return Some(code);
        }
    }
    None
}

/// Checks if an error message indicates a (secondary) rate limit, which is a
/// 403 on GitHub's side but retriable on ours.
fn is_rate_limit_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("rate limit")
        || message.contains("api rate")
        || message.contains("secondary rate")
        || message.contains("abuse detection")
}
