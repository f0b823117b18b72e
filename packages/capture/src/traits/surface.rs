//! Post surface - the interactive page the action executor drives.

use async_trait::async_trait;

/// The live, mutable page as seen by the delete flow.
///
/// Every `click_*` probe combines presence check and activation: `false`
/// means the affordance was absent and nothing happened. The executor owns
/// all sequencing, pacing, and retry policy; implementations only touch
/// the page.
#[async_trait]
pub trait PostSurface: Send + Sync {
    /// Whether an article whose permalink contains `post_id` is currently
    /// rendered.
    async fn is_rendered(&self, post_id: &str) -> bool;

    /// Scroll the target article into the center of the viewport.
    async fn reveal(&self, post_id: &str);

    /// Scroll the viewport by `dy` pixels (negative is up).
    async fn scroll_by(&self, dy: i64);

    /// Click the un-repost control on the target article.
    async fn click_unrepost(&self, post_id: &str) -> bool;

    /// Click the overflow ("more actions") control on the target article.
    async fn click_overflow(&self, post_id: &str) -> bool;

    /// Click the first open menu item whose label matches any of `labels`.
    async fn click_menu_item(&self, labels: &[&str]) -> bool;

    /// Click the confirmation affordance if present.
    async fn click_confirm(&self) -> bool;

    /// Dismiss any open menu without selecting an item.
    async fn dismiss_menu(&self);
}
