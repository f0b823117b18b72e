//! Post types - the canonical record flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content placeholder for media-only posts.
pub const MEDIA_ONLY_PLACEHOLDER: &str = "[Media/No Text]";

/// Author name when the source markup gives none.
pub const UNKNOWN_AUTHOR_NAME: &str = "Unknown";

/// Author handle when the source markup gives none.
pub const UNKNOWN_AUTHOR_HANDLE: &str = "@unknown";

/// Lifecycle status of a captured post.
///
/// `Pending` is the only state that admits a transition; `Kept` and
/// `Deleted` are terminal. Deletion is a status, not a removal - records
/// stay in the store once a decision lands on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Pending,
    Kept,
    Deleted,
}

impl PostStatus {
    /// Whether this status admits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Kept | PostStatus::Deleted)
    }
}

/// Best-effort engagement counts parsed from the source UI.
///
/// Each counter defaults to 0 when its marker is unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
}

/// Summary of an attached external link preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCard {
    pub title: Option<String>,
    /// Not derivable from the card markup; carried for the review surface.
    pub description: Option<String>,
    pub domain: Option<String>,
    pub image_url: Option<String>,
}

/// One discovered post.
///
/// Created by the extraction engine with status `Pending`; the relay hub
/// owns every transition after that. `thread_parent`/`thread_child` are
/// opaque serialized snapshots of the adjacent timeline items - display
/// context only, never deduplicated, persisted independently, or targeted
/// by commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Stable external identifier; records without one are never built.
    pub id: String,

    /// Plain-text body, or [`MEDIA_ONLY_PLACEHOLDER`] for media-only posts.
    pub content: String,

    /// Origin timestamp; capture time when the source gives none.
    pub created_at: DateTime<Utc>,

    pub author_name: String,
    pub author_handle: String,
    pub avatar_url: String,

    #[serde(default)]
    pub metrics: PostMetrics,

    /// Asset URLs in DOM order (video poster frames stand in for videos).
    #[serde(default)]
    pub media: Vec<String>,

    /// True when the record is the viewer resharing someone else's content.
    #[serde(default)]
    pub is_repost: bool,

    pub link_card: Option<LinkCard>,

    pub thread_parent: Option<String>,
    pub thread_child: Option<String>,

    pub status: PostStatus,
}

impl PostRecord {
    /// Create a record with the documented field defaults.
    pub fn new(id: impl Into<String>, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            created_at,
            author_name: UNKNOWN_AUTHOR_NAME.to_string(),
            author_handle: UNKNOWN_AUTHOR_HANDLE.to_string(),
            avatar_url: String::new(),
            metrics: PostMetrics::default(),
            media: Vec::new(),
            is_repost: false,
            link_card: None,
            thread_parent: None,
            thread_child: None,
            status: PostStatus::Pending,
        }
    }

    /// Set the author identity.
    pub fn with_author(mut self, name: impl Into<String>, handle: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_handle = handle.into();
        self
    }

    /// Flag the record as a repost.
    pub fn with_repost(mut self, is_repost: bool) -> Self {
        self.is_repost = is_repost;
        self
    }

    /// Set the lifecycle status.
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }
}
