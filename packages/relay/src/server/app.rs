//! Router assembly and shared state.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::hub::HubService;

use super::{health, ws};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<HubService>,
}

/// Build the axum application.
///
/// CORS is wide open: the capture agent connects from the host page's
/// origin and the review client from a phone on the LAN.
pub fn build_app(hub: Arc<HubService>) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { hub })
}
