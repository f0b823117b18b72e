//! DOM snapshot input to the extraction engine.

use chrono::{DateTime, Utc};

/// A serialized view of the page at one capture instant.
///
/// The extraction engine is pure: everything it needs - the DOM, the
/// current location, and the clock - arrives through this value.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// Serialized DOM of the visible page.
    pub html: String,

    /// Current location path (e.g. `/alice/with_replies`).
    pub path: String,

    /// When the snapshot was taken; the `created_at` fallback.
    pub captured_at: DateTime<Utc>,
}

impl PageSnapshot {
    /// Create a snapshot captured now.
    pub fn new(html: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            path: path.into(),
            captured_at: Utc::now(),
        }
    }

    /// Pin the capture instant (tests mostly).
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }
}
