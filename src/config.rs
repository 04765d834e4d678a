//! Process configuration, read once from the environment at startup.
//!
//! The engine itself never re-reads configuration; everything here is
//! immutable after `Config::from_env`. Only bootstrap problems (missing
//! token, empty repository list) are fatal; the engine proper has no fatal
//! errors.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::printer::PrinterTarget;
use crate::types::{ActionFilter, CommitAction, IssueAction, RepoId, parse_actions};

/// Default poll interval (60 seconds), matching `GITHUB_POLLING_INTERVAL`'s
/// millisecond default of 60000.
const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;

/// Default listen port for the inspection endpoints.
const DEFAULT_PORT: u16 = 3000;

const DEFAULT_ISSUE_ACTIONS: &str = "opened,reopened";
const DEFAULT_COMMIT_ACTIONS: &str = "pushed";

/// Errors that make startup impossible.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `GITHUB_API_TOKEN` is unset or empty.
    #[error("GITHUB_API_TOKEN is required")]
    MissingToken,

    /// `GITHUB_REPOSITORIES` named no valid `owner/name` entries.
    #[error("GITHUB_REPOSITORIES must name at least one owner/name repository")]
    NoRepositories,

    /// A numeric variable failed to parse.
    #[error("invalid value {value:?} for {variable}")]
    InvalidNumber { variable: &'static str, value: String },
}

/// Immutable service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub bearer token.
    pub token: String,

    /// Repositories to monitor, in `owner/name` form.
    pub repositories: Vec<RepoId>,

    /// Interval between polling ticks.
    pub poll_interval: Duration,

    /// Allow-set for issue events. Pull requests reuse this set.
    pub issue_actions: HashSet<IssueAction>,

    /// Allow-set for commit events.
    pub commit_actions: HashSet<CommitAction>,

    /// Listen port for the HTTP inspection surface.
    pub port: u16,

    /// Where rendered receipts go.
    pub printer: PrinterTarget,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// Variables: `GITHUB_API_TOKEN`, `GITHUB_REPOSITORIES` (comma-separated
    /// `owner/name`), `GITHUB_POLLING_INTERVAL` (milliseconds),
    /// `GITHUB_ISSUE_ACTIONS`, `GITHUB_COMMIT_ACTIONS`, `PORT`, and
    /// `PRINTER_IP`/`PRINTER_PORT` for a network receipt printer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("GITHUB_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let repositories = parse_repositories(
            &std::env::var("GITHUB_REPOSITORIES").unwrap_or_default(),
        );
        if repositories.is_empty() {
            return Err(ConfigError::NoRepositories);
        }

        let poll_ms = parse_number(
            "GITHUB_POLLING_INTERVAL",
            std::env::var("GITHUB_POLLING_INTERVAL").ok(),
            DEFAULT_POLL_INTERVAL_MS,
        )?;

        let port = parse_number("PORT", std::env::var("PORT").ok(), DEFAULT_PORT)?;

        let issue_actions = parse_actions(
            &std::env::var("GITHUB_ISSUE_ACTIONS")
                .unwrap_or_else(|_| DEFAULT_ISSUE_ACTIONS.to_string()),
        );
        let commit_actions = parse_actions(
            &std::env::var("GITHUB_COMMIT_ACTIONS")
                .unwrap_or_else(|_| DEFAULT_COMMIT_ACTIONS.to_string()),
        );

        let printer = match (
            std::env::var("PRINTER_IP").ok().filter(|v| !v.is_empty()),
            std::env::var("PRINTER_PORT").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(host), Some(port)) => PrinterTarget::Network {
                host,
                port: parse_number("PRINTER_PORT", Some(port), 9100)?,
            },
            _ => PrinterTarget::Stdout,
        };

        Ok(Config {
            token,
            repositories,
            poll_interval: Duration::from_millis(poll_ms),
            issue_actions,
            commit_actions,
            port,
            printer,
        })
    }

    /// Builds the per-category allow-sets. Pull requests reuse the issue
    /// allow-set.
    pub fn action_filter(&self) -> ActionFilter {
        ActionFilter::new(
            self.issue_actions.clone(),
            self.issue_actions.clone(),
            self.commit_actions.clone(),
        )
    }
}

/// Parses a comma-separated repository list, skipping malformed entries with
/// a warning rather than failing the whole configuration.
pub fn parse_repositories(raw: &str) -> Vec<RepoId> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<RepoId>() {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!(entry = %e.input, "skipping malformed repository identifier");
                None
            }
        })
        .collect()
}

fn parse_number<N: FromStr + Copy>(
    variable: &'static str,
    value: Option<String>,
    default: N,
) -> Result<N, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            variable,
            value: raw,
        }),
    }
}
