//! Video repository
//!
//! Database operations for tracked videos, including filtered listings
//! by channel and category.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ListParams, Video, VideoFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Video repository trait
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Create a new video
    async fn create(&self, video: &Video) -> Result<Video>;

    /// Get video by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Video>>;

    /// Get video by its YouTube identifier
    async fn get_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Video>>;

    /// Update a video
    async fn update(&self, video: &Video) -> Result<Video>;

    /// Delete a video
    async fn delete(&self, id: i64) -> Result<()>;

    /// List videos matching the filter, newest first
    async fn list(&self, filter: &VideoFilter, params: &ListParams) -> Result<(Vec<Video>, i64)>;

    /// Count videos referencing a category
    async fn count_by_category(&self, category_id: i64) -> Result<i64>;
}

/// SQLx-based video repository supporting SQLite and MySQL.
pub struct SqlxVideoRepository {
    pool: DynDatabasePool,
}

impl SqlxVideoRepository {
    /// Create a new SQLx video repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn VideoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(&self, video: &Video) -> Result<Video> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), video).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), video).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Video>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Video>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_youtube_id_sqlite(self.pool.as_sqlite().unwrap(), youtube_id).await
            }
            DatabaseDriver::Mysql => {
                get_by_youtube_id_mysql(self.pool.as_mysql().unwrap(), youtube_id).await
            }
        }
    }

    async fn update(&self, video: &Video) -> Result<Video> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), video).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), video).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, filter: &VideoFilter, params: &ListParams) -> Result<(Vec<Video>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), filter, params).await
            }
            DatabaseDriver::Mysql => {
                list_mysql(self.pool.as_mysql().unwrap(), filter, params).await
            }
        }
    }

    async fn count_by_category(&self, category_id: i64) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                count_by_category_sqlite(self.pool.as_sqlite().unwrap(), category_id).await
            }
            DatabaseDriver::Mysql => {
                count_by_category_mysql(self.pool.as_mysql().unwrap(), category_id).await
            }
        }
    }
}

const SELECT_COLUMNS: &str = "id, youtube_id, channel_id, category_id, title, description, \
     duration_seconds, view_count, published_at, created_at, updated_at";

/// Build the WHERE clause for a filter; bindings are appended in the
/// same order by the callers.
fn filter_clause(filter: &VideoFilter) -> String {
    let mut conditions = Vec::new();
    if filter.channel_id.is_some() {
        conditions.push("channel_id = ?");
    }
    if filter.category_id.is_some() {
        conditions.push("category_id = ?");
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, video: &Video) -> Result<Video> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO videos
            (youtube_id, channel_id, category_id, title, description,
             duration_seconds, view_count, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&video.youtube_id)
    .bind(video.channel_id)
    .bind(video.category_id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(video.duration_seconds)
    .bind(video.view_count)
    .bind(video.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create video")?;

    Ok(Video {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..video.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Video>> {
    let row = sqlx::query(&format!("SELECT {} FROM videos WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get video by ID")?;

    row.map(|row| row_to_video_sqlite(&row)).transpose()
}

async fn get_by_youtube_id_sqlite(pool: &SqlitePool, youtube_id: &str) -> Result<Option<Video>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM videos WHERE youtube_id = ?",
        SELECT_COLUMNS
    ))
    .bind(youtube_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get video by YouTube ID")?;

    row.map(|row| row_to_video_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, video: &Video) -> Result<Video> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE videos
        SET title = ?, description = ?, category_id = ?, duration_seconds = ?,
            view_count = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(video.category_id)
    .bind(video.duration_seconds)
    .bind(video.view_count)
    .bind(video.published_at)
    .bind(now)
    .bind(video.id)
    .execute(pool)
    .await
    .context("Failed to update video")?;

    Ok(Video {
        updated_at: now,
        ..video.clone()
    })
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM videos WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete video")?;
    Ok(())
}

async fn list_sqlite(
    pool: &SqlitePool,
    filter: &VideoFilter,
    params: &ListParams,
) -> Result<(Vec<Video>, i64)> {
    let clause = filter_clause(filter);

    let count_sql = format!("SELECT COUNT(*) FROM videos{}", clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(channel_id) = filter.channel_id {
        count_query = count_query.bind(channel_id);
    }
    if let Some(category_id) = filter.category_id {
        count_query = count_query.bind(category_id);
    }
    let total = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count videos")?;

    let sql = format!(
        "SELECT {} FROM videos{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS, clause
    );
    let mut query = sqlx::query(&sql);
    if let Some(channel_id) = filter.channel_id {
        query = query.bind(channel_id);
    }
    if let Some(category_id) = filter.category_id {
        query = query.bind(category_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list videos")?;

    let videos = rows
        .iter()
        .map(row_to_video_sqlite)
        .collect::<Result<Vec<_>>>()?;

    Ok((videos, total))
}

async fn count_by_category_sqlite(pool: &SqlitePool, category_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await
        .context("Failed to count videos by category")?;
    Ok(count)
}

fn row_to_video_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Video> {
    Ok(Video {
        id: row.get("id"),
        youtube_id: row.get("youtube_id"),
        channel_id: row.get("channel_id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        description: row.get("description"),
        duration_seconds: row.get("duration_seconds"),
        view_count: row.get("view_count"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, video: &Video) -> Result<Video> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO videos
            (youtube_id, channel_id, category_id, title, description,
             duration_seconds, view_count, published_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&video.youtube_id)
    .bind(video.channel_id)
    .bind(video.category_id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(video.duration_seconds)
    .bind(video.view_count)
    .bind(video.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create video")?;

    Ok(Video {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..video.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Video>> {
    let row = sqlx::query(&format!("SELECT {} FROM videos WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get video by ID")?;

    row.map(|row| row_to_video_mysql(&row)).transpose()
}

async fn get_by_youtube_id_mysql(pool: &MySqlPool, youtube_id: &str) -> Result<Option<Video>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM videos WHERE youtube_id = ?",
        SELECT_COLUMNS
    ))
    .bind(youtube_id)
    .fetch_optional(pool)
    .await
    .context("Failed to get video by YouTube ID")?;

    row.map(|row| row_to_video_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, video: &Video) -> Result<Video> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE videos
        SET title = ?, description = ?, category_id = ?, duration_seconds = ?,
            view_count = ?, published_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(video.category_id)
    .bind(video.duration_seconds)
    .bind(video.view_count)
    .bind(video.published_at)
    .bind(now)
    .bind(video.id)
    .execute(pool)
    .await
    .context("Failed to update video")?;

    Ok(Video {
        updated_at: now,
        ..video.clone()
    })
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM videos WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete video")?;
    Ok(())
}

async fn list_mysql(
    pool: &MySqlPool,
    filter: &VideoFilter,
    params: &ListParams,
) -> Result<(Vec<Video>, i64)> {
    let clause = filter_clause(filter);

    let count_sql = format!("SELECT COUNT(*) FROM videos{}", clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(channel_id) = filter.channel_id {
        count_query = count_query.bind(channel_id);
    }
    if let Some(category_id) = filter.category_id {
        count_query = count_query.bind(category_id);
    }
    let total = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count videos")?;

    let sql = format!(
        "SELECT {} FROM videos{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS, clause
    );
    let mut query = sqlx::query(&sql);
    if let Some(channel_id) = filter.channel_id {
        query = query.bind(channel_id);
    }
    if let Some(category_id) = filter.category_id {
        query = query.bind(category_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list videos")?;

    let videos = rows
        .iter()
        .map(row_to_video_mysql)
        .collect::<Result<Vec<_>>>()?;

    Ok((videos, total))
}

async fn count_by_category_mysql(pool: &MySqlPool, category_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE category_id = ?")
        .bind(category_id)
        .fetch_one(pool)
        .await
        .context("Failed to count videos by category")?;
    Ok(count)
}

fn row_to_video_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Video> {
    Ok(Video {
        id: row.get("id"),
        youtube_id: row.get("youtube_id"),
        channel_id: row.get("channel_id"),
        category_id: row.get("category_id"),
        title: row.get("title"),
        description: row.get("description"),
        duration_seconds: row.get("duration_seconds"),
        view_count: row.get("view_count"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ChannelRepository, SqlxChannelRepository, SqlxUserRepository, SqlxVideoCategoryRepository,
        UserRepository, VideoCategoryRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Channel, User, UserRole, VideoCategory};

    struct Fixture {
        repo: SqlxVideoRepository,
        channel_id: i64,
        other_channel_id: i64,
        category_id: i64,
    }

    async fn setup() -> Fixture {
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

        let channels = SqlxChannelRepository::new(pool.clone());
        let channel = channels
            .create(&Channel::new("UC1".to_string(), "One".to_string(), owner.id))
            .await
            .unwrap();
        let other = channels
            .create(&Channel::new("UC2".to_string(), "Two".to_string(), owner.id))
            .await
            .unwrap();

        let categories = SqlxVideoCategoryRepository::new(pool.clone());
        let category = categories
            .create(&VideoCategory::new("gaming".to_string(), "Gaming".to_string()))
            .await
            .unwrap();

        Fixture {
            repo: SqlxVideoRepository::new(pool),
            channel_id: channel.id,
            other_channel_id: other.id,
            category_id: category.id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let f = setup().await;

        let video = f
            .repo
            .create(&Video::new(
                "vid1".to_string(),
                f.channel_id,
                f.category_id,
                "First".to_string(),
            ))
            .await
            .unwrap();
        assert!(video.id > 0);

        let fetched = f.repo.get_by_id(video.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "First");
        assert!(f.repo.get_by_youtube_id("vid1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_filters_by_channel() {
        let f = setup().await;

        for (i, channel) in [f.channel_id, f.channel_id, f.other_channel_id]
            .iter()
            .enumerate()
        {
            f.repo
                .create(&Video::new(
                    format!("vid{}", i),
                    *channel,
                    f.category_id,
                    format!("Video {}", i),
                ))
                .await
                .unwrap();
        }

        let filter = VideoFilter {
            channel_id: Some(f.channel_id),
            category_id: None,
        };
        let (videos, total) = f.repo.list(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(videos.iter().all(|v| v.channel_id == f.channel_id));

        let (all, total_all) = f
            .repo
            .list(&VideoFilter::default(), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(total_all, 3);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_count_by_category() {
        let f = setup().await;

        let mut video = f
            .repo
            .create(&Video::new(
                "vid1".to_string(),
                f.channel_id,
                f.category_id,
                "Old".to_string(),
            ))
            .await
            .unwrap();

        video.title = "New".to_string();
        video.view_count = 42;
        f.repo.update(&video).await.unwrap();

        let fetched = f.repo.get_by_id(video.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "New");
        assert_eq!(fetched.view_count, 42);

        assert_eq!(f.repo.count_by_category(f.category_id).await.unwrap(), 1);

        f.repo.delete(video.id).await.unwrap();
        assert_eq!(f.repo.count_by_category(f.category_id).await.unwrap(), 0);
    }
}
