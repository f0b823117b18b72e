//! Snapshot source - the capture loop's view of the page.

use async_trait::async_trait;

use crate::types::PageSnapshot;

/// Provides DOM snapshots and advances the page between ticks.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Serialize the current page state.
    async fn snapshot(&self) -> PageSnapshot;

    /// Nudge the viewport down by `step` pixels so the host's lazy
    /// rendering reveals more content before the next tick.
    async fn advance(&self, step: i64);
}
