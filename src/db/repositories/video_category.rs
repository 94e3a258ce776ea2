//! Video category repository
//!
//! Database operations for the video classification taxonomy.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::VideoCategory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Video category repository trait
#[async_trait]
pub trait VideoCategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &VideoCategory) -> Result<VideoCategory>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<VideoCategory>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<VideoCategory>>;

    /// Update a category
    async fn update(&self, category: &VideoCategory) -> Result<VideoCategory>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<()>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<VideoCategory>>;
}

/// SQLx-based video category repository supporting SQLite and MySQL.
pub struct SqlxVideoCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxVideoCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn VideoCategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl VideoCategoryRepository for SqlxVideoCategoryRepository {
    async fn create(&self, category: &VideoCategory) -> Result<VideoCategory> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), category).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), category).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<VideoCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<VideoCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_slug_sqlite(self.pool.as_sqlite().unwrap(), slug).await
            }
            DatabaseDriver::Mysql => get_by_slug_mysql(self.pool.as_mysql().unwrap(), slug).await,
        }
    }

    async fn update(&self, category: &VideoCategory) -> Result<VideoCategory> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), category).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), category).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<VideoCategory>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

const SELECT_COLUMNS: &str = "id, slug, name, description, created_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, category: &VideoCategory) -> Result<VideoCategory> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO video_categories (slug, name, description, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&category.slug)
    .bind(&category.name)
    .bind(&category.description)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create video category")?;

    Ok(VideoCategory {
        id: result.last_insert_rowid(),
        created_at: now,
        ..category.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<VideoCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM video_categories WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    row.map(|row| row_to_category_sqlite(&row)).transpose()
}

async fn get_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<VideoCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM video_categories WHERE slug = ?",
        SELECT_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    row.map(|row| row_to_category_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, category: &VideoCategory) -> Result<VideoCategory> {
    sqlx::query("UPDATE video_categories SET name = ?, description = ? WHERE id = ?")
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.id)
        .execute(pool)
        .await
        .context("Failed to update video category")?;

    Ok(category.clone())
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM video_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete video category")?;
    Ok(())
}

async fn list_sqlite(pool: &SqlitePool) -> Result<Vec<VideoCategory>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM video_categories ORDER BY name",
        SELECT_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list video categories")?;

    rows.iter().map(row_to_category_sqlite).collect()
}

fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<VideoCategory> {
    Ok(VideoCategory {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, category: &VideoCategory) -> Result<VideoCategory> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO video_categories (slug, name, description, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&category.slug)
    .bind(&category.name)
    .bind(&category.description)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create video category")?;

    Ok(VideoCategory {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..category.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<VideoCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM video_categories WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    row.map(|row| row_to_category_mysql(&row)).transpose()
}

async fn get_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<VideoCategory>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM video_categories WHERE slug = ?",
        SELECT_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    row.map(|row| row_to_category_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, category: &VideoCategory) -> Result<VideoCategory> {
    sqlx::query("UPDATE video_categories SET name = ?, description = ? WHERE id = ?")
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.id)
        .execute(pool)
        .await
        .context("Failed to update video category")?;

    Ok(category.clone())
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM video_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete video category")?;
    Ok(())
}

async fn list_mysql(pool: &MySqlPool) -> Result<Vec<VideoCategory>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM video_categories ORDER BY name",
        SELECT_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list video categories")?;

    rows.iter().map(row_to_category_mysql).collect()
}

fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Result<VideoCategory> {
    Ok(VideoCategory {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxVideoCategoryRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxVideoCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let repo = setup().await;

        let created = repo
            .create(&VideoCategory::new("gaming".to_string(), "Gaming".to_string()))
            .await
            .unwrap();
        assert!(created.id > 0);

        let by_slug = repo.get_by_slug("gaming").await.unwrap().unwrap();
        assert_eq!(by_slug.name, "Gaming");

        repo.create(&VideoCategory::new("music".to_string(), "Music".to_string()))
            .await
            .unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by name
        assert_eq!(all[0].name, "Gaming");
        assert_eq!(all[1].name, "Music");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup().await;

        let mut category = repo
            .create(&VideoCategory::new("tech".to_string(), "Tech".to_string()))
            .await
            .unwrap();
        category.name = "Technology".to_string();
        repo.update(&category).await.unwrap();

        let fetched = repo.get_by_id(category.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Technology");

        repo.delete(category.id).await.unwrap();
        assert!(repo.get_by_id(category.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let repo = setup().await;

        repo.create(&VideoCategory::new("dup".to_string(), "One".to_string()))
            .await
            .unwrap();
        let result = repo
            .create(&VideoCategory::new("dup".to_string(), "Two".to_string()))
            .await;

        assert!(result.is_err());
    }
}
