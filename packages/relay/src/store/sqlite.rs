//! SQLite storage implementation.
//!
//! A file-based backend so decisions survive a hub restart. Records are
//! stored as JSON alongside indexed status and creation-time columns; the
//! status column and the JSON body are updated together.

use async_trait::async_trait;
use capture::{PostRecord, PostStatus};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::warn;

use super::{PostStore, StoreError, StoreResult};

/// SQLite-backed post store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a store with the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - in-memory database (ephemeral)
    /// - `sqlite://posts.db?mode=rwc` - file, created if missing
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(backend)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> StoreResult<Self> {
        Self::new("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_status ON posts(status);
            CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    fn decode(id: &str, raw: &str) -> StoreResult<PostRecord> {
        serde_json::from_str(raw).map_err(|err| StoreError::Corrupt {
            id: id.to_string(),
            reason: err.to_string(),
        })
    }

    fn status_text(status: PostStatus) -> &'static str {
        match status {
            PostStatus::Pending => "PENDING",
            PostStatus::Kept => "KEPT",
            PostStatus::Deleted => "DELETED",
        }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string().into())
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn get(&self, id: &str) -> StoreResult<Option<PostRecord>> {
        let row = sqlx::query("SELECT record FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|row| Self::decode(id, row.get::<String, _>(0).as_str()))
            .transpose()
    }

    async fn insert(&self, record: &PostRecord) -> StoreResult<()> {
        let stored = record.clone().with_status(PostStatus::Pending);
        let body = serde_json::to_string(&stored).map_err(|err| StoreError::Corrupt {
            id: stored.id.clone(),
            reason: err.to_string(),
        })?;

        sqlx::query(
            "INSERT INTO posts (id, record, status, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&stored.id)
        .bind(body)
        .bind(Self::status_text(PostStatus::Pending))
        .bind(stored.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }

    async fn set_status(&self, id: &str, status: PostStatus) -> StoreResult<bool> {
        let text = Self::status_text(status);
        let result = sqlx::query(
            "UPDATE posts SET status = ?, record = json_set(record, '$.status', ?) WHERE id = ?",
        )
        .bind(text)
        .bind(text)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn pending(&self) -> StoreResult<Vec<PostRecord>> {
        let rows = sqlx::query(
            "SELECT id, record FROM posts WHERE status = 'PENDING' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get(0);
            match Self::decode(&id, row.get::<String, _>(1).as_str()) {
                Ok(record) => records.push(record),
                // One corrupt row should not hide the rest of the backlog.
                Err(err) => warn!(id = %id, error = %err, "skipping undecodable stored record"),
            }
        }
        Ok(records)
    }

    async fn clear_pending(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE status = 'PENDING'")
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected())
    }
}
