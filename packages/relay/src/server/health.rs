use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use capture::Role;
use serde::Serialize;

use super::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    capture_peers: usize,
    review_peers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_posts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Checks store readiness (a pending query must answer) and reports the
/// current peer counts per role. Returns 200 OK when healthy, 503 when the
/// store is failing.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let capture_peers = state.hub.registry().peer_count(Role::Capture);
    let review_peers = state.hub.registry().peer_count(Role::Review);

    match state.hub.pending_count().await {
        Ok(pending) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                capture_peers,
                review_peers,
                pending_posts: Some(pending),
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                capture_peers,
                review_peers,
                pending_posts: None,
                error: Some(err.to_string()),
            }),
        ),
    }
}
