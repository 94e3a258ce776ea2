//! Channel repository
//!
//! Database operations for tracked YouTube channels.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Channel, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Channel repository trait
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Create a new channel
    async fn create(&self, channel: &Channel) -> Result<Channel>;

    /// Get channel by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Channel>>;

    /// Get channel by its YouTube identifier
    async fn get_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Channel>>;

    /// Update a channel
    async fn update(&self, channel: &Channel) -> Result<Channel>;

    /// Delete a channel (videos cascade)
    async fn delete(&self, id: i64) -> Result<()>;

    /// List channels with pagination
    async fn list(&self, params: &ListParams) -> Result<(Vec<Channel>, i64)>;
}

/// SQLx-based channel repository supporting SQLite and MySQL.
pub struct SqlxChannelRepository {
    pool: DynDatabasePool,
}

impl SqlxChannelRepository {
    /// Create a new SQLx channel repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn ChannelRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ChannelRepository for SqlxChannelRepository {
    async fn create(&self, channel: &Channel) -> Result<Channel> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), channel).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), channel).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Channel>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Channel>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_youtube_id_sqlite(self.pool.as_sqlite().unwrap(), youtube_id).await
            }
            DatabaseDriver::Mysql => {
                get_by_youtube_id_mysql(self.pool.as_mysql().unwrap(), youtube_id).await
            }
        }
    }

    async fn update(&self, channel: &Channel) -> Result<Channel> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), channel).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), channel).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, params: &ListParams) -> Result<(Vec<Channel>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap(), params).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap(), params).await,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, youtube_id, title, description, owner_id, subscriber_count, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, channel: &Channel) -> Result<Channel> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO youtube_channels
            (youtube_id, title, description, owner_id, subscriber_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&channel.youtube_id)
    .bind(&channel.title)
    .bind(&channel.description)
    .bind(channel.owner_id)
    .bind(channel.subscriber_count)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create channel")?;

    Ok(Channel {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..channel.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Channel>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM youtube_channels WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get channel by ID")?;

    row.map(|row| row_to_channel_sqlite(&row)).transpose()
}

async fn get_by_youtube_id_sqlite(pool: &SqlitePool, youtube_id: &str) -> Result<Option<Channel>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM youtube_channels WHERE youtube_id = ?",
        SELECT_COLUMNS
    ))
    .bind(youtube_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get channel by YouTube ID")?;

    row.map(|row| row_to_channel_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, channel: &Channel) -> Result<Channel> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE youtube_channels
        SET title = ?, description = ?, subscriber_count = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&channel.title)
    .bind(&channel.description)
    .bind(channel.subscriber_count)
    .bind(now)
    .bind(channel.id)
    .execute(pool)
    .await
    .context("Failed to update channel")?;

    Ok(Channel {
        updated_at: now,
        ..channel.clone()
    })
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM youtube_channels WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete channel")?;
    Ok(())
}

async fn list_sqlite(pool: &SqlitePool, params: &ListParams) -> Result<(Vec<Channel>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM youtube_channels")
        .fetch_one(pool)
        .await
        .context("Failed to count channels")?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM youtube_channels ORDER BY id LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .context("Failed to list channels")?;

    let channels = rows
        .iter()
        .map(row_to_channel_sqlite)
        .collect::<Result<Vec<_>>>()?;

    Ok((channels, total))
}

fn row_to_channel_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Channel> {
    Ok(Channel {
        id: row.get("id"),
        youtube_id: row.get("youtube_id"),
        title: row.get("title"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        subscriber_count: row.get("subscriber_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, channel: &Channel) -> Result<Channel> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO youtube_channels
            (youtube_id, title, description, owner_id, subscriber_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&channel.youtube_id)
    .bind(&channel.title)
    .bind(&channel.description)
    .bind(channel.owner_id)
    .bind(channel.subscriber_count)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create channel")?;

    Ok(Channel {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..channel.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Channel>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM youtube_channels WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get channel by ID")?;

    row.map(|row| row_to_channel_mysql(&row)).transpose()
}

async fn get_by_youtube_id_mysql(pool: &MySqlPool, youtube_id: &str) -> Result<Option<Channel>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM youtube_channels WHERE youtube_id = ?",
        SELECT_COLUMNS
    ))
    .bind(youtube_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get channel by YouTube ID")?;

    row.map(|row| row_to_channel_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, channel: &Channel) -> Result<Channel> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE youtube_channels
        SET title = ?, description = ?, subscriber_count = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&channel.title)
    .bind(&channel.description)
    .bind(channel.subscriber_count)
    .bind(now)
    .bind(channel.id)
    .execute(pool)
    .await
    .context("Failed to update channel")?;

    Ok(Channel {
        updated_at: now,
        ..channel.clone()
    })
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM youtube_channels WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete channel")?;
    Ok(())
}

async fn list_mysql(pool: &MySqlPool, params: &ListParams) -> Result<(Vec<Channel>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM youtube_channels")
        .fetch_one(pool)
        .await
        .context("Failed to count channels")?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM youtube_channels ORDER BY id LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .context("Failed to list channels")?;

    let channels = rows
        .iter()
        .map(row_to_channel_mysql)
        .collect::<Result<Vec<_>>>()?;

    Ok((channels, total))
}

fn row_to_channel_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Channel> {
    Ok(Channel {
        id: row.get("id"),
        youtube_id: row.get("youtube_id"),
        title: row.get("title"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        subscriber_count: row.get("subscriber_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::repositories::UserRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};

    async fn setup() -> (SqlxChannelRepository, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let owner = users
            .create(&User::new(
                "owner".to_string(),
                "owner@example.com".to_string(),
                "hash".to_string(),
                UserRole::Member,
            ))
            .await
            .unwrap();

        (SqlxChannelRepository::new(pool), owner.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repo, owner_id) = setup().await;

        let channel = repo
            .create(&Channel::new(
                "UCabc".to_string(),
                "Test Channel".to_string(),
                owner_id,
            ))
            .await
            .unwrap();
        assert!(channel.id > 0);

        let fetched = repo.get_by_id(channel.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Test Channel");

        let by_yt = repo.get_by_youtube_id("UCabc").await.unwrap();
        assert!(by_yt.is_some());
    }

    #[tokio::test]
    async fn test_update() {
        let (repo, owner_id) = setup().await;

        let mut channel = repo
            .create(&Channel::new("UC1".to_string(), "Old".to_string(), owner_id))
            .await
            .unwrap();
        channel.title = "New".to_string();
        channel.subscriber_count = 1234;

        repo.update(&channel).await.unwrap();

        let fetched = repo.get_by_id(channel.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New");
        assert_eq!(fetched.subscriber_count, 1234);
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let (repo, owner_id) = setup().await;

        let c1 = repo
            .create(&Channel::new("UC1".to_string(), "One".to_string(), owner_id))
            .await
            .unwrap();
        repo.create(&Channel::new("UC2".to_string(), "Two".to_string(), owner_id))
            .await
            .unwrap();

        let (channels, total) = repo.list(&ListParams::default()).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(channels.len(), 2);

        repo.delete(c1.id).await.unwrap();
        let (_, total) = repo.list(&ListParams::default()).await.unwrap();
        assert_eq!(total, 1);
    }
}
