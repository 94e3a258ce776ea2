//! Task repository
//!
//! Database operations for internal work items, with filtered listings
//! by status and assignee.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ListParams, Task, TaskPriority, TaskStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Filter for task listings
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<i64>,
}

/// Task repository trait
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task
    async fn create(&self, task: &Task) -> Result<Task>;

    /// Get task by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Task>>;

    /// Update a task
    async fn update(&self, task: &Task) -> Result<Task>;

    /// Delete a task (comments cascade)
    async fn delete(&self, id: i64) -> Result<()>;

    /// List tasks matching the filter, newest first
    async fn list(&self, filter: &TaskFilter, params: &ListParams) -> Result<(Vec<Task>, i64)>;
}

/// SQLx-based task repository supporting SQLite and MySQL.
pub struct SqlxTaskRepository {
    pool: DynDatabasePool,
}

impl SqlxTaskRepository {
    /// Create a new SQLx task repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn TaskRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TaskRepository for SqlxTaskRepository {
    async fn create(&self, task: &Task) -> Result<Task> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), task).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), task).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Task>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, task: &Task) -> Result<Task> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), task).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), task).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, filter: &TaskFilter, params: &ListParams) -> Result<(Vec<Task>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_sqlite(self.pool.as_sqlite().unwrap(), filter, params).await
            }
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap(), filter, params).await,
        }
    }
}

const SELECT_COLUMNS: &str = "id, title, description, status, priority, creator_id, assignee_id, \
     due_date, created_at, updated_at";

/// Build the WHERE clause for a filter; bindings are appended in the
/// same order by the callers.
fn filter_clause(filter: &TaskFilter) -> String {
    let mut conditions = Vec::new();
    if filter.status.is_some() {
        conditions.push("status = ?");
    }
    if filter.assignee_id.is_some() {
        conditions.push("assignee_id = ?");
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

async fn create_sqlite(pool: &SqlitePool, task: &Task) -> Result<Task> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO tasks
            (title, description, status, priority, creator_id, assignee_id,
             due_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.to_string())
    .bind(task.priority.to_string())
    .bind(task.creator_id)
    .bind(task.assignee_id)
    .bind(task.due_date)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create task")?;

    Ok(Task {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..task.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Task>> {
    let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get task by ID")?;

    row.map(|row| row_to_task_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, task: &Task) -> Result<Task> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE tasks
        SET title = ?, description = ?, status = ?, priority = ?, assignee_id = ?,
            due_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.to_string())
    .bind(task.priority.to_string())
    .bind(task.assignee_id)
    .bind(task.due_date)
    .bind(now)
    .bind(task.id)
    .execute(pool)
    .await
    .context("Failed to update task")?;

    Ok(Task {
        updated_at: now,
        ..task.clone()
    })
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete task")?;
    Ok(())
}

async fn list_sqlite(
    pool: &SqlitePool,
    filter: &TaskFilter,
    params: &ListParams,
) -> Result<(Vec<Task>, i64)> {
    let clause = filter_clause(filter);

    let count_sql = format!("SELECT COUNT(*) FROM tasks{}", clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = filter.status {
        count_query = count_query.bind(status.to_string());
    }
    if let Some(assignee_id) = filter.assignee_id {
        count_query = count_query.bind(assignee_id);
    }
    let total = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count tasks")?;

    let sql = format!(
        "SELECT {} FROM tasks{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS, clause
    );
    let mut query = sqlx::query(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status.to_string());
    }
    if let Some(assignee_id) = filter.assignee_id {
        query = query.bind(assignee_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list tasks")?;

    let tasks = rows
        .iter()
        .map(row_to_task_sqlite)
        .collect::<Result<Vec<_>>>()?;

    Ok((tasks, total))
}

fn row_to_task_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Task> {
    let status: String = row.get("status");
    let priority: String = row.get("priority");

    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: TaskStatus::from_str(&status)?,
        priority: TaskPriority::from_str(&priority)?,
        creator_id: row.get("creator_id"),
        assignee_id: row.get("assignee_id"),
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, task: &Task) -> Result<Task> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO tasks
            (title, description, status, priority, creator_id, assignee_id,
             due_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.to_string())
    .bind(task.priority.to_string())
    .bind(task.creator_id)
    .bind(task.assignee_id)
    .bind(task.due_date)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create task")?;

    Ok(Task {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..task.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Task>> {
    let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get task by ID")?;

    row.map(|row| row_to_task_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, task: &Task) -> Result<Task> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE tasks
        SET title = ?, description = ?, status = ?, priority = ?, assignee_id = ?,
            due_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.to_string())
    .bind(task.priority.to_string())
    .bind(task.assignee_id)
    .bind(task.due_date)
    .bind(now)
    .bind(task.id)
    .execute(pool)
    .await
    .context("Failed to update task")?;

    Ok(Task {
        updated_at: now,
        ..task.clone()
    })
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete task")?;
    Ok(())
}

async fn list_mysql(
    pool: &MySqlPool,
    filter: &TaskFilter,
    params: &ListParams,
) -> Result<(Vec<Task>, i64)> {
    let clause = filter_clause(filter);

    let count_sql = format!("SELECT COUNT(*) FROM tasks{}", clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = filter.status {
        count_query = count_query.bind(status.to_string());
    }
    if let Some(assignee_id) = filter.assignee_id {
        count_query = count_query.bind(assignee_id);
    }
    let total = count_query
        .fetch_one(pool)
        .await
        .context("Failed to count tasks")?;

    let sql = format!(
        "SELECT {} FROM tasks{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS, clause
    );
    let mut query = sqlx::query(&sql);
    if let Some(status) = filter.status {
        query = query.bind(status.to_string());
    }
    if let Some(assignee_id) = filter.assignee_id {
        query = query.bind(assignee_id);
    }
    let rows = query
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list tasks")?;

    let tasks = rows
        .iter()
        .map(row_to_task_mysql)
        .collect::<Result<Vec<_>>>()?;

    Ok((tasks, total))
}

fn row_to_task_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Task> {
    let status: String = row.get("status");
    let priority: String = row.get("priority");

    Ok(Task {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: TaskStatus::from_str(&status)?,
        priority: TaskPriority::from_str(&priority)?,
        creator_id: row.get("creator_id"),
        assignee_id: row.get("assignee_id"),
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
