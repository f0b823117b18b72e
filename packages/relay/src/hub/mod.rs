//! The relay hub: post lifecycle state plus role-addressed routing.
//!
//! Bridges records from capture peers to review peers and decisions from
//! review peers back to capture peers. The lifecycle state machine is
//! `Pending -> {Kept, Deleted}`, both terminal; the hub owns every
//! transition and the store never sees an illegal one.

mod registry;

pub use registry::RoleRegistry;

use std::sync::Arc;

use capture::{ClientMessage, PostRecord, PostStatus, Role, ServerMessage};
use tracing::{debug, error, info, warn};

use crate::store::{PostStore, StoreResult};

/// Central broker between the capture and review roles.
pub struct HubService {
    store: Arc<dyn PostStore>,
    registry: RoleRegistry,
    advertise_addr: String,
}

impl HubService {
    /// `advertise_addr` is the reachable address pushed to capture peers on
    /// registration (shown to the human as a QR code for the phone).
    pub fn new(store: Arc<dyn PostStore>, advertise_addr: impl Into<String>) -> Self {
        Self {
            store,
            registry: RoleRegistry::default(),
            advertise_addr: advertise_addr.into(),
        }
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Number of currently pending records (health reporting).
    pub async fn pending_count(&self) -> StoreResult<usize> {
        Ok(self.store.pending().await?.len())
    }

    /// Registration side effects for a declared role.
    ///
    /// The returned messages are connection-scoped and go over the
    /// registering peer's own socket, not a group channel: capture peers
    /// get the discovery address, review peers get the pending backlog
    /// (most recent first) so a late joiner still sees everything open.
    pub async fn register(&self, role: Role) -> Vec<ServerMessage> {
        info!(role = ?role, "peer registered");
        match role {
            Role::Capture => vec![ServerMessage::Discovery {
                address: self.advertise_addr.clone(),
            }],
            Role::Review => match self.store.pending().await {
                Ok(backlog) if !backlog.is_empty() => {
                    debug!(count = backlog.len(), "flushing pending backlog");
                    vec![ServerMessage::NewPosts { posts: backlog }]
                }
                Ok(_) => Vec::new(),
                Err(err) => {
                    error!(error = %err, "failed to load pending backlog");
                    Vec::new()
                }
            },
        }
    }

    /// Ingest a scraped batch.
    ///
    /// Unknown ids are stored as `Pending` and forwarded; known ids still
    /// `Pending` are forwarded again (the capture agent re-scrapes the same
    /// page, so re-announcements are routine); ids with a terminal status
    /// are dropped - a decision is never re-opened by a later scrape. The
    /// forwarded subset goes to the review group once, in batch order.
    pub async fn ingest(&self, posts: Vec<PostRecord>) {
        debug!(count = posts.len(), "ingesting scraped batch");
        let mut forward = Vec::new();

        for post in posts {
            match self.store.get(&post.id).await {
                Ok(None) => match self.store.insert(&post).await {
                    Ok(()) => forward.push(post),
                    Err(err) => {
                        warn!(id = %post.id, error = %err, "failed to store post; skipping")
                    }
                },
                Ok(Some(existing)) if existing.status == PostStatus::Pending => {
                    forward.push(post);
                }
                Ok(Some(_)) => {}
                Err(err) => {
                    warn!(id = %post.id, error = %err, "failed to look up post; skipping")
                }
            }
        }

        if !forward.is_empty() {
            let count = forward.len();
            let peers = self
                .registry
                .broadcast(Role::Review, ServerMessage::NewPosts { posts: forward });
            debug!(count, peers, "forwarded new posts to review group");
        }
    }

    /// Delete decision: terminal transition plus command fan-out to the
    /// capture group. Unknown and already-decided ids are silent no-ops,
    /// and no command goes out for them.
    pub async fn decide_delete(&self, id: &str) {
        info!(id = %id, "delete decision");
        if self.transition(id, PostStatus::Deleted).await {
            self.registry.broadcast(
                Role::Capture,
                ServerMessage::DeleteCommand { id: id.to_string() },
            );
        }
    }

    /// Keep decision: terminal transition only, no outbound command.
    pub async fn decide_keep(&self, id: &str) {
        info!(id = %id, "keep decision");
        self.transition(id, PostStatus::Kept).await;
    }

    /// Purge all `Pending` records and tell review peers to clear their
    /// queues. Decided records are untouched.
    pub async fn reset(&self) {
        match self.store.clear_pending().await {
            Ok(purged) => {
                info!(purged, "cleared pending posts");
                self.registry.broadcast(Role::Review, ServerMessage::ResetUi);
            }
            Err(err) => error!(error = %err, "failed to clear pending posts"),
        }
    }

    /// Dispatch a post-registration frame from either role.
    pub async fn handle_message(&self, message: ClientMessage) {
        match message {
            ClientMessage::Register { role } => {
                warn!(role = ?role, "duplicate registration frame ignored")
            }
            ClientMessage::ScrapedBatch { posts } => self.ingest(posts).await,
            ClientMessage::DecideDelete { id } => self.decide_delete(&id).await,
            ClientMessage::DecideKeep { id } => self.decide_keep(&id).await,
            ClientMessage::Reset => self.reset().await,
        }
    }

    /// Apply `Pending -> status`. Unknown ids, terminal ids and store
    /// failures all answer false and leave everything untouched.
    async fn transition(&self, id: &str, status: PostStatus) -> bool {
        match self.store.get(id).await {
            Ok(Some(existing)) if existing.status == PostStatus::Pending => {
                match self.store.set_status(id, status).await {
                    Ok(true) => true,
                    Ok(false) => {
                        debug!(id = %id, "post vanished before transition");
                        false
                    }
                    Err(err) => {
                        error!(id = %id, error = %err, "failed to persist decision; skipping");
                        false
                    }
                }
            }
            Ok(Some(existing)) => {
                debug!(id = %id, status = ?existing.status, "ignoring decision on decided post");
                false
            }
            Ok(None) => {
                debug!(id = %id, "ignoring decision on unknown post");
                false
            }
            Err(err) => {
                error!(id = %id, error = %err, "failed to look up post for decision; skipping");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn hub() -> HubService {
        HubService::new(Arc::new(MemoryStore::new()), "ws://192.168.1.20:3000/ws")
    }

    fn post(id: &str) -> PostRecord {
        PostRecord::new(id, format!("post {id}"), Utc::now())
    }

    #[tokio::test]
    async fn capture_registration_pushes_the_discovery_address() {
        let hub = hub();
        let messages = hub.register(Role::Capture).await;
        assert_eq!(
            messages,
            vec![ServerMessage::Discovery {
                address: "ws://192.168.1.20:3000/ws".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn review_registration_flushes_backlog_most_recent_first() {
        let hub = hub();
        let now = Utc::now();
        hub.ingest(vec![
            PostRecord::new("old", "old", now - Duration::hours(1)),
            PostRecord::new("new", "new", now),
        ])
        .await;
        hub.decide_keep("old").await;
        hub.ingest(vec![PostRecord::new(
            "older",
            "older",
            now - Duration::hours(2),
        )])
        .await;

        let messages = hub.register(Role::Review).await;
        let [ServerMessage::NewPosts { posts }] = messages.as_slice() else {
            panic!("expected one backlog flush, got {messages:?}");
        };
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        // Only still-pending records, newest first - no historical log of
        // decided ones.
        assert_eq!(ids, vec!["new", "older"]);
    }

    #[tokio::test]
    async fn review_registration_with_no_backlog_sends_nothing() {
        let hub = hub();
        assert!(hub.register(Role::Review).await.is_empty());
    }

    #[tokio::test]
    async fn reingest_while_pending_forwards_again_but_stores_once() {
        let hub = hub();
        let mut review_rx = hub.registry().subscribe(Role::Review);

        hub.ingest(vec![post("1")]).await;
        hub.ingest(vec![post("1")]).await;

        // Forwarded once per distinct submission...
        assert!(matches!(
            review_rx.try_recv().unwrap(),
            ServerMessage::NewPosts { .. }
        ));
        assert!(matches!(
            review_rx.try_recv().unwrap(),
            ServerMessage::NewPosts { .. }
        ));
        // ...but the backlog snapshot holds exactly one record.
        assert_eq!(hub.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn terminal_records_ignore_reingest() {
        let hub = hub();
        hub.ingest(vec![post("1")]).await;
        hub.decide_keep("1").await;

        let mut review_rx = hub.registry().subscribe(Role::Review);
        hub.ingest(vec![post("1")]).await;

        assert!(review_rx.try_recv().is_err());
        assert_eq!(hub.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_decision_fans_out_exactly_one_command() {
        let hub = hub();
        hub.ingest(vec![post("123")]).await;

        let mut capture_rx = hub.registry().subscribe(Role::Capture);
        hub.decide_delete("123").await;

        assert_eq!(
            capture_rx.try_recv().unwrap(),
            ServerMessage::DeleteCommand { id: "123".into() }
        );
        assert!(capture_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn keep_decision_sends_no_command() {
        let hub = hub();
        hub.ingest(vec![post("1")]).await;

        let mut capture_rx = hub.registry().subscribe(Role::Capture);
        hub.decide_keep("1").await;

        assert!(capture_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn decisions_on_unknown_or_decided_ids_are_noops() {
        let hub = hub();
        let mut capture_rx = hub.registry().subscribe(Role::Capture);

        // Never seen: pre-registration race.
        hub.decide_delete("ghost").await;
        assert!(capture_rx.try_recv().is_err());

        // Already decided: the first decision wins, no second command.
        hub.ingest(vec![post("1")]).await;
        hub.decide_keep("1").await;
        hub.decide_delete("1").await;
        assert!(capture_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_purges_pending_only_and_notifies_review() {
        let hub = hub();
        hub.ingest(vec![post("a"), post("b")]).await;
        hub.decide_keep("b").await;

        let mut review_rx = hub.registry().subscribe(Role::Review);
        hub.reset().await;

        assert_eq!(review_rx.try_recv().unwrap(), ServerMessage::ResetUi);
        assert_eq!(hub.pending_count().await.unwrap(), 0);
        // The kept record survived the reset.
        let messages = hub.register(Role::Review).await;
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn batch_order_is_preserved_in_the_forwarded_subset() {
        let hub = hub();
        hub.ingest(vec![post("x")]).await;
        hub.decide_delete("x").await;

        let mut review_rx = hub.registry().subscribe(Role::Review);
        hub.ingest(vec![post("1"), post("x"), post("2"), post("3")]).await;

        let ServerMessage::NewPosts { posts } = review_rx.try_recv().unwrap() else {
            panic!("expected a forwarded batch");
        };
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        // The decided id dropped out; relative order of the rest held.
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
