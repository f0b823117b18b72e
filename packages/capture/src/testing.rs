//! Testing utilities including mock implementations.
//!
//! Deterministic fakes for the three trait seams, with call recording so
//! tests can assert on interaction order and bounds without a browser or a
//! network.

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::ForwardError;
use crate::traits::{BatchSink, PostSurface, SnapshotSource};
use crate::types::{PageSnapshot, PostRecord};

/// Record of a call made to [`ScriptedSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    IsRendered,
    Reveal,
    ScrollBy(i64),
    ClickUnrepost,
    ClickOverflow,
    ClickMenuItem(Vec<String>),
    ClickConfirm,
    DismissMenu,
}

#[derive(Default)]
struct SurfaceState {
    /// Scrolls needed before the target renders; `None` means never.
    visible_after_scrolls: Option<u32>,
    scrolls: u32,
    unrepost_control: bool,
    overflow_control: bool,
    menu_labels: Vec<String>,
    confirm_control: bool,
    calls: Vec<SurfaceCall>,
}

/// A scripted page for action-executor tests.
///
/// By default the target post is never rendered and only the overflow
/// control exists; `with_*` builders shape the rest of the page.
pub struct ScriptedSurface {
    state: RwLock<SurfaceState>,
}

impl Default for ScriptedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SurfaceState {
                overflow_control: true,
                ..SurfaceState::default()
            }),
        }
    }

    /// The target post is rendered from the start.
    pub fn with_rendered(self) -> Self {
        self.state.write().unwrap().visible_after_scrolls = Some(0);
        self
    }

    /// The target post renders after `scrolls` upward scroll attempts.
    pub fn with_rendered_after(self, scrolls: u32) -> Self {
        self.state.write().unwrap().visible_after_scrolls = Some(scrolls);
        self
    }

    /// The article carries an un-repost control.
    pub fn with_unrepost_control(self) -> Self {
        self.state.write().unwrap().unrepost_control = true;
        self
    }

    /// Remove the overflow control.
    pub fn without_overflow_control(self) -> Self {
        self.state.write().unwrap().overflow_control = false;
        self
    }

    /// Add a labelled item to the opened menu.
    pub fn with_menu_item(self, label: impl Into<String>) -> Self {
        self.state.write().unwrap().menu_labels.push(label.into());
        self
    }

    /// A confirmation affordance appears after the delete item.
    pub fn with_confirm_control(self) -> Self {
        self.state.write().unwrap().confirm_control = true;
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.read().unwrap().calls.clone()
    }

    /// Number of scroll attempts performed.
    pub fn scroll_count(&self) -> u32 {
        self.state.read().unwrap().scrolls
    }

    fn record(&self, call: SurfaceCall) {
        self.state.write().unwrap().calls.push(call);
    }
}

#[async_trait]
impl PostSurface for ScriptedSurface {
    async fn is_rendered(&self, _post_id: &str) -> bool {
        self.record(SurfaceCall::IsRendered);
        let state = self.state.read().unwrap();
        state
            .visible_after_scrolls
            .is_some_and(|needed| state.scrolls >= needed)
    }

    async fn reveal(&self, _post_id: &str) {
        self.record(SurfaceCall::Reveal);
    }

    async fn scroll_by(&self, dy: i64) {
        let mut state = self.state.write().unwrap();
        state.scrolls += 1;
        state.calls.push(SurfaceCall::ScrollBy(dy));
    }

    async fn click_unrepost(&self, _post_id: &str) -> bool {
        self.record(SurfaceCall::ClickUnrepost);
        self.state.read().unwrap().unrepost_control
    }

    async fn click_overflow(&self, _post_id: &str) -> bool {
        self.record(SurfaceCall::ClickOverflow);
        self.state.read().unwrap().overflow_control
    }

    async fn click_menu_item(&self, labels: &[&str]) -> bool {
        self.record(SurfaceCall::ClickMenuItem(
            labels.iter().map(|label| label.to_string()).collect(),
        ));
        let state = self.state.read().unwrap();
        state
            .menu_labels
            .iter()
            .any(|present| labels.contains(&present.as_str()))
    }

    async fn click_confirm(&self) -> bool {
        self.record(SurfaceCall::ClickConfirm);
        self.state.read().unwrap().confirm_control
    }

    async fn dismiss_menu(&self) {
        self.record(SurfaceCall::DismissMenu);
    }
}

/// A snapshot source that replays a fixed page forever.
pub struct StaticSnapshots {
    snapshot: RwLock<PageSnapshot>,
    advances: RwLock<Vec<i64>>,
}

impl StaticSnapshots {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            advances: RwLock::new(Vec::new()),
        }
    }

    /// Swap the page out from under the loop (simulates navigation).
    pub fn set_snapshot(&self, snapshot: PageSnapshot) {
        *self.snapshot.write().unwrap() = snapshot;
    }

    /// Number of advance nudges the loop performed.
    pub fn advance_count(&self) -> usize {
        self.advances.read().unwrap().len()
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshots {
    async fn snapshot(&self) -> PageSnapshot {
        self.snapshot.read().unwrap().clone()
    }

    async fn advance(&self, step: i64) {
        self.advances.write().unwrap().push(step);
    }
}

/// A batch sink that records everything it is given.
///
/// Failures queued with [`CollectingSink::fail_next`] are consumed, one per
/// forward attempt, before deliveries succeed again.
pub struct CollectingSink {
    batches: RwLock<Vec<Vec<PostRecord>>>,
    failures: RwLock<VecDeque<ForwardError>>,
}

impl Default for CollectingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectingSink {
    pub fn new() -> Self {
        Self {
            batches: RwLock::new(Vec::new()),
            failures: RwLock::new(VecDeque::new()),
        }
    }

    /// Queue a failure for an upcoming forward attempt.
    pub fn fail_next(&self, error: ForwardError) {
        self.failures.write().unwrap().push_back(error);
    }

    /// All delivered batches, in order.
    pub fn batches(&self) -> Vec<Vec<PostRecord>> {
        self.batches.read().unwrap().clone()
    }
}

#[async_trait]
impl BatchSink for CollectingSink {
    async fn forward(&self, batch: &[PostRecord]) -> Result<(), ForwardError> {
        if let Some(error) = self.failures.write().unwrap().pop_front() {
            return Err(error);
        }
        self.batches.write().unwrap().push(batch.to_vec());
        Ok(())
    }
}
