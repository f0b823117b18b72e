//! Post storage - the hub's single shared mutable resource.
//!
//! One row per post id, queryable by status, orderable by creation time.
//! Every mutation is a short per-id read-modify-write; there are no
//! cross-id transactions. Store failures are typed and handled at the call
//! site - a bad record never aborts the rest of a batch.

mod memory;

pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use capture::{PostRecord, PostStatus};
use thiserror::Error;

/// Storage operation failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored row no longer decodes into a record.
    #[error("corrupt stored record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The persisted-state contract the hub runs against.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Look up a record by id.
    async fn get(&self, id: &str) -> StoreResult<Option<PostRecord>>;

    /// Insert a new record. The stored status is always `Pending`,
    /// whatever the incoming record claims.
    async fn insert(&self, record: &PostRecord) -> StoreResult<()>;

    /// Overwrite the status of an existing record. Returns false when the
    /// id is unknown. Transition legality is the hub's concern, not the
    /// store's.
    async fn set_status(&self, id: &str, status: PostStatus) -> StoreResult<bool>;

    /// All `Pending` records, most recent first.
    async fn pending(&self) -> StoreResult<Vec<PostRecord>>;

    /// Remove `Pending` records only - a scoped delete, never a truncate.
    /// Returns the number purged.
    async fn clear_pending(&self) -> StoreResult<u64>;
}
