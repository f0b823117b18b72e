//! Data types shared across the capture pipeline.

pub mod post;
pub mod snapshot;

pub use post::{
    LinkCard, PostMetrics, PostRecord, PostStatus, MEDIA_ONLY_PLACEHOLDER, UNKNOWN_AUTHOR_HANDLE,
    UNKNOWN_AUTHOR_NAME,
};
pub use snapshot::PageSnapshot;
