//! HTTP surface: the WebSocket endpoint and a health check.

pub mod app;
pub mod health;
pub mod ws;

pub use app::{build_app, AppState};
