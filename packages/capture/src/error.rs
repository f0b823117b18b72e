//! Typed errors for the capture library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Extraction and action
//! execution degrade instead of erroring, so the surface here is small:
//! only the transport seams produce errors callers must act on.

use thiserror::Error;

/// Failures surfaced when forwarding a scraped batch toward the relay hub.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The channel to the hub is down. The batch is lost; the next scrape
    /// tick re-discovers the same posts and the hub ingests idempotently.
    #[error("relay link unavailable: {0}")]
    Disconnected(String),

    /// The host invalidated the embedding context. Unrecoverable; the
    /// capture loop halts on this.
    #[error("host context invalidated")]
    ContextInvalidated,

    /// A batch could not be encoded into a wire frame.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures constructing the relay link.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid relay endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}
