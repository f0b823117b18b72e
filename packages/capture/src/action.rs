//! Delete execution against the live page.
//!
//! A delete command references a post by id, but the page has mutated and
//! virtualized since capture: the target must be found again before
//! anything can be clicked. The flow is fire-and-forget - the outcome is
//! logged, never propagated as an error - and every step that misses its
//! UI target halts the remaining steps for that command.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::traits::PostSurface;

/// Menu labels that undo a reshare, with known localized alternates.
pub const UNDO_REPOST_LABELS: &[&str] = &["Undo Repost", "Undo Retweet", "Retweeti Geri Al"];

/// Menu labels that delete a post, with the known localized alternate.
pub const DELETE_LABELS: &[&str] = &["Delete", "Sil"];

/// Pacing and retry bounds for the UI interaction.
///
/// The defaults simulate human-speed interaction and give the host page
/// time to settle between steps.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// Upward scroll-search attempts before giving up on locating the post.
    pub scroll_attempts: u32,
    /// Viewport delta per search attempt (negative scrolls up).
    pub scroll_step: i64,
    /// Wait after each search scroll before re-searching.
    pub search_settle: Duration,
    /// Wait between UI interaction steps (menu open, item click).
    pub step_settle: Duration,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            scroll_attempts: 5,
            scroll_step: -300,
            search_settle: Duration::from_millis(300),
            step_settle: Duration::from_millis(500),
        }
    }
}

/// How a delete command ended. Purely informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Standard delete flow ran to the confirmation click.
    Deleted,
    /// The post was a reshare and was un-reposted instead of deleted.
    UnReposted,
    /// The post never turned up within the scroll-search bound.
    PostNotFound,
    /// The overflow control was missing on the located article.
    OverflowMissing,
    /// The expected menu item was missing; the menu was dismissed.
    MenuItemMissing,
    /// Everything up to the final confirmation worked, but no confirmation
    /// affordance appeared.
    ConfirmMissing,
}

/// Drives the host UI's delete / un-repost flow for one post at a time.
pub struct DeleteExecutor {
    surface: Arc<dyn PostSurface>,
    config: ActionConfig,
}

impl DeleteExecutor {
    pub fn new(surface: Arc<dyn PostSurface>) -> Self {
        Self::with_config(surface, ActionConfig::default())
    }

    pub fn with_config(surface: Arc<dyn PostSurface>, config: ActionConfig) -> Self {
        Self { surface, config }
    }

    /// Execute a delete command for `post_id`.
    ///
    /// Branches on the article's affordances: a reshare gets un-reposted
    /// (and never falls through to the delete flow), anything else goes
    /// through overflow menu -> delete item -> confirmation.
    pub async fn execute(&self, post_id: &str) -> ExecutionOutcome {
        if !self.locate(post_id).await {
            warn!(id = %post_id, "post not found after scroll search; abandoning delete");
            return ExecutionOutcome::PostNotFound;
        }

        if self.surface.click_unrepost(post_id).await {
            tokio::time::sleep(self.config.step_settle).await;
            if self.surface.click_menu_item(UNDO_REPOST_LABELS).await {
                info!(id = %post_id, "un-reposted");
                return ExecutionOutcome::UnReposted;
            }
            warn!(id = %post_id, "undo-repost menu item not found; dismissing menu");
            self.surface.dismiss_menu().await;
            return ExecutionOutcome::MenuItemMissing;
        }

        if !self.surface.click_overflow(post_id).await {
            warn!(id = %post_id, "overflow control not found");
            return ExecutionOutcome::OverflowMissing;
        }
        tokio::time::sleep(self.config.step_settle).await;

        if !self.surface.click_menu_item(DELETE_LABELS).await {
            warn!(id = %post_id, "delete menu item not found; dismissing menu");
            self.surface.dismiss_menu().await;
            return ExecutionOutcome::MenuItemMissing;
        }
        tokio::time::sleep(self.config.step_settle).await;

        if self.surface.click_confirm().await {
            info!(id = %post_id, "deleted");
            ExecutionOutcome::Deleted
        } else {
            warn!(id = %post_id, "confirmation affordance not found");
            ExecutionOutcome::ConfirmMissing
        }
    }

    /// Find the target article, scroll-searching upward within the bound.
    async fn locate(&self, post_id: &str) -> bool {
        if self.surface.is_rendered(post_id).await {
            return true;
        }

        debug!(id = %post_id, "post not rendered; scroll-searching upward");
        for attempt in 1..=self.config.scroll_attempts {
            self.surface.scroll_by(self.config.scroll_step).await;
            tokio::time::sleep(self.config.search_settle).await;
            if self.surface.is_rendered(post_id).await {
                debug!(id = %post_id, attempt, "found post while scroll-searching");
                self.surface.reveal(post_id).await;
                tokio::time::sleep(self.config.step_settle).await;
                return true;
            }
        }
        false
    }
}
