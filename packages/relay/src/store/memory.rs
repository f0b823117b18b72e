//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use capture::{PostRecord, PostStatus};

use super::{PostStore, StoreResult};

/// In-memory post store.
///
/// Useful for testing and single-session runs. Not suitable for anything
/// that must survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<HashMap<String, PostRecord>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, any status.
    pub fn len(&self) -> usize {
        self.posts.read().unwrap().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.posts.read().unwrap().is_empty()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<PostRecord>> {
        Ok(self.posts.read().unwrap().get(id).cloned())
    }

    async fn insert(&self, record: &PostRecord) -> StoreResult<()> {
        let stored = record.clone().with_status(PostStatus::Pending);
        self.posts
            .write()
            .unwrap()
            .insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn set_status(&self, id: &str, status: PostStatus) -> StoreResult<bool> {
        let mut posts = self.posts.write().unwrap();
        match posts.get_mut(id) {
            Some(record) => {
                record.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pending(&self) -> StoreResult<Vec<PostRecord>> {
        let mut pending: Vec<PostRecord> = self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|record| record.status == PostStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn clear_pending(&self) -> StoreResult<u64> {
        let mut posts = self.posts.write().unwrap();
        let before = posts.len();
        posts.retain(|_, record| record.status != PostStatus::Pending);
        Ok((before - posts.len()) as u64)
    }
}
