//! Task comment repository
//!
//! Database operations for comments on tasks.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::TaskComment;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Task comment repository trait
#[async_trait]
pub trait TaskCommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &TaskComment) -> Result<TaskComment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<TaskComment>>;

    /// List comments for a task, oldest first
    async fn list_by_task(&self, task_id: i64) -> Result<Vec<TaskComment>>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based task comment repository supporting SQLite and MySQL.
pub struct SqlxTaskCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxTaskCommentRepository {
    /// Create a new SQLx task comment repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn TaskCommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TaskCommentRepository for SqlxTaskCommentRepository {
    async fn create(&self, comment: &TaskComment) -> Result<TaskComment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), comment).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), comment).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TaskComment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_by_task(&self, task_id: i64) -> Result<Vec<TaskComment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_task_sqlite(self.pool.as_sqlite().unwrap(), task_id).await
            }
            DatabaseDriver::Mysql => {
                list_by_task_mysql(self.pool.as_mysql().unwrap(), task_id).await
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }
}

const SELECT_COLUMNS: &str = "id, task_id, author_id, content, created_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, comment: &TaskComment) -> Result<TaskComment> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO task_comments (task_id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment.task_id)
    .bind(comment.author_id)
    .bind(&comment.content)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create task comment")?;

    Ok(TaskComment {
        id: result.last_insert_rowid(),
        created_at: now,
        ..comment.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<TaskComment>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM task_comments WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get task comment by ID")?;

    row.map(|row| row_to_comment_sqlite(&row)).transpose()
}

async fn list_by_task_sqlite(pool: &SqlitePool, task_id: i64) -> Result<Vec<TaskComment>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM task_comments WHERE task_id = ? ORDER BY created_at, id",
        SELECT_COLUMNS
    ))
    .bind(task_id)
    .fetch_all(pool)
    .await
    .context("Failed to list task comments")?;

    rows.iter().map(row_to_comment_sqlite).collect()
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM task_comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete task comment")?;
    Ok(())
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<TaskComment> {
    Ok(TaskComment {
        id: row.get("id"),
        task_id: row.get("task_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, comment: &TaskComment) -> Result<TaskComment> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO task_comments (task_id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(comment.task_id)
    .bind(comment.author_id)
    .bind(&comment.content)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create task comment")?;

    Ok(TaskComment {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..comment.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<TaskComment>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM task_comments WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get task comment by ID")?;

    row.map(|row| row_to_comment_mysql(&row)).transpose()
}

async fn list_by_task_mysql(pool: &MySqlPool, task_id: i64) -> Result<Vec<TaskComment>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM task_comments WHERE task_id = ? ORDER BY created_at, id",
        SELECT_COLUMNS
    ))
    .bind(task_id)
    .fetch_all(pool)
    .await
    .context("Failed to list task comments")?;

    rows.iter().map(row_to_comment_mysql).collect()
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM task_comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete task comment")?;
    Ok(())
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Result<TaskComment> {
    Ok(TaskComment {
        id: row.get("id"),
        task_id: row.get("task_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    })
}
