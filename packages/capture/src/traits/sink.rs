//! Batch sink - the capture loop's outbound channel.

use async_trait::async_trait;

use crate::error::ForwardError;
use crate::types::PostRecord;

/// Carries scraped batches toward the relay hub.
///
/// Implementations reconnect on their own; a failed forward is reported to
/// the caller (never swallowed) so the loop can decide between
/// log-and-continue and halting.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn forward(&self, batch: &[PostRecord]) -> Result<(), ForwardError>;
}
