use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Liveness probe. Always 200 while the process is up; it deliberately does
/// not consult the engine.
pub(super) async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
