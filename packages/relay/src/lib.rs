//! Relay Hub
//!
//! The central broker of the post triage pipeline. Capture agents and
//! review clients connect over one WebSocket endpoint, declare a role, and
//! the hub bridges between them: scraped records flow capture -> review,
//! keep/delete decisions flow review -> store, and delete commands fan out
//! store -> capture. Per-post lifecycle state (`PENDING -> KEPT | DELETED`)
//! lives here and nowhere else.
//!
//! # Modules
//!
//! - [`hub`] - lifecycle state machine and role-addressed routing
//! - [`store`] - the persisted-state contract and its backends
//! - [`server`] - axum app: `/ws` and `/health`
//! - [`discovery`] - LAN address detection for the QR-code handshake
//! - [`config`] - environment configuration

pub mod config;
pub mod discovery;
pub mod hub;
pub mod server;
pub mod store;

pub use config::Config;
pub use discovery::advertise_address;
pub use hub::{HubService, RoleRegistry};
pub use server::{build_app, AppState};
pub use store::{MemoryStore, PostStore, StoreError};

#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
