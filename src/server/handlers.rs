//! Request handlers for the inspection and control endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::github::{ApiError, ApiErrorKind, GitHubApi, Relationship, RepoListQuery};
use crate::render;
use crate::types::{Category, RepoId};

use super::AppState;

/// Failure surface shared by the handlers.
#[derive(Debug, thiserror::Error)]
pub(super) enum ApiFailure {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Upstream(#[from] ApiError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiFailure::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiFailure::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
            ApiFailure::Upstream(e) => {
                let status = match e.kind {
                    ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ApiErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                    ApiErrorKind::Transient => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn parse_repo(raw: &str) -> Result<RepoId, ApiFailure> {
    raw.parse()
        .map_err(|e: crate::types::InvalidRepoId| ApiFailure::BadRequest(e.to_string()))
}

pub(super) async fn status_handler<A: GitHubApi + 'static>(
    State(state): State<AppState<A>>,
) -> Json<Value> {
    let engine = state.engine();
    let monitored: Vec<String> = engine.monitored().iter().map(ToString::to_string).collect();
    Json(json!({
        "status": "running",
        "polling": state.scheduler().is_running(),
        "poll_interval_ms": state.poll_interval_ms(),
        "monitored_repositories": monitored,
        "issue_actions": state.issue_actions(),
        "commit_actions": state.commit_actions(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RepoListParams {
    affiliation: Option<String>,
    sort: Option<String>,
    direction: Option<String>,
}

/// Lists the repositories the configured credential can access, annotated
/// with the inferred relationship and whether each is currently monitored.
pub(super) async fn repositories_handler<A: GitHubApi + 'static>(
    State(state): State<AppState<A>>,
    Query(params): Query<RepoListParams>,
) -> Result<Json<Value>, ApiFailure> {
    let mut query = RepoListQuery::default();
    if let Some(affiliation) = params.affiliation {
        query.affiliation = affiliation;
    }
    if let Some(sort) = params.sort {
        query.sort = sort;
    }
    if let Some(direction) = params.direction {
        query.direction = direction;
    }

    let engine = state.engine();
    let viewer = engine.api().viewer_login().await?;
    let repositories = engine.api().list_viewer_repositories(&query).await?;

    let listing: Vec<Value> = repositories
        .iter()
        .map(|repo| {
            let monitored = repo
                .full_name
                .parse::<RepoId>()
                .is_ok_and(|id| engine.is_monitored(&id));
            json!({
                "full_name": repo.full_name,
                "html_url": repo.html_url,
                "description": repo.description,
                "private": repo.private,
                "default_branch": repo.default_branch,
                "updated_at": repo.updated_at,
                "visibility": repo.visibility,
                "relationship": Relationship::infer(repo, &viewer),
                "permissions": repo.permissions,
                "monitored": monitored,
            })
        })
        .collect();

    let currently_monitoring: Vec<String> =
        engine.monitored().iter().map(ToString::to_string).collect();
    Ok(Json(json!({
        "count": listing.len(),
        "currently_monitoring": currently_monitoring,
        "repositories": listing,
    })))
}

#[derive(Debug, Deserialize)]
pub(super) struct MonitorRequest {
    repository: String,
}

/// Validates a repository and adds it to the monitored set.
pub(super) async fn monitor_handler<A: GitHubApi + 'static>(
    State(state): State<AppState<A>>,
    Json(request): Json<MonitorRequest>,
) -> Result<Json<Value>, ApiFailure> {
    let repo = parse_repo(&request.repository)?;
    let engine = state.engine();
    engine.add_repository(repo.clone()).await?;
    info!(repo = %repo, "repository added via monitor endpoint");

    let currently_monitoring: Vec<String> =
        engine.monitored().iter().map(ToString::to_string).collect();
    Ok(Json(json!({
        "status": "ok",
        "repository": repo.to_string(),
        "currently_monitoring": currently_monitoring,
    })))
}

#[derive(Debug, Deserialize)]
pub(super) struct DebugCommitsParams {
    repo: String,
    #[serde(default)]
    force: bool,
}

/// Commit diagnostics for one repository: cursor position, the most recent
/// commits regardless of cursors, and (with `force=true`) the events an
/// out-of-band commit check would produce right now.
pub(super) async fn debug_commits_handler<A: GitHubApi + 'static>(
    State(state): State<AppState<A>>,
    Query(params): Query<DebugCommitsParams>,
) -> Result<Json<Value>, ApiFailure> {
    let repo = parse_repo(&params.repo)?;
    let engine = state.engine();

    let recent = engine.api().list_recent_commits(&repo, 5).await?;
    let recent: Vec<Value> = recent
        .iter()
        .map(|commit| {
            json!({
                "sha": commit.short_sha(),
                "message": render::summary_line(commit),
                "author": commit.commit.author.name,
                "date": commit.commit.author.date,
            })
        })
        .collect();

    let mut body = json!({
        "repository": repo.to_string(),
        "monitored": engine.is_monitored(&repo),
        "last_checked": engine.last_checked(&repo, Category::Commits),
        "recent_commits": recent,
    });

    if params.force {
        let events = engine.force_check(&repo, Category::Commits).await;
        body["forced_events"] = serde_json::to_value(events)
            .map_err(|e| ApiFailure::Internal(e.to_string()))?;
    }

    Ok(Json(body))
}
