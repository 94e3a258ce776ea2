//! User repository
//!
//! Database operations for user accounts.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ListParams, User, UserRole, UserStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update a user
    async fn update(&self, user: &User) -> Result<User>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count total users
    async fn count(&self) -> Result<i64>;

    /// Count admin users
    async fn count_admins(&self) -> Result<i64>;

    /// List users with pagination, returning the page and the total count
    async fn list(&self, params: &ListParams) -> Result<(Vec<User>, i64)>;
}

/// SQLx-based user repository supporting SQLite and MySQL.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_username_sqlite(self.pool.as_sqlite().unwrap(), username).await
            }
            DatabaseDriver::Mysql => {
                get_by_username_mysql(self.pool.as_mysql().unwrap(), username).await
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_by_email_sqlite(self.pool.as_sqlite().unwrap(), email).await
            }
            DatabaseDriver::Mysql => get_by_email_mysql(self.pool.as_mysql().unwrap(), email).await,
        }
    }

    async fn update(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), user).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count_admins(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_admins_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_admins_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn list(&self, params: &ListParams) -> Result<(Vec<User>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap(), params).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap(), params).await,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, username, email, password_hash, role, status, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, role, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.status.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..user.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn get_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE username = ?",
        SELECT_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn get_by_email_sqlite(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE email = ?",
        SELECT_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by email")?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, role = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.status.to_string())
    .bind(now)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    Ok(User {
        updated_at: now,
        ..user.clone()
    })
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;
    Ok(())
}

async fn count_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(count)
}

async fn count_admins_sqlite(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .context("Failed to count admins")?;
    Ok(count)
}

async fn list_sqlite(pool: &SqlitePool, params: &ListParams) -> Result<(Vec<User>, i64)> {
    let total = count_sqlite(pool).await?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM users ORDER BY id LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let users = rows
        .iter()
        .map(row_to_user_sqlite)
        .collect::<Result<Vec<_>>>()?;

    Ok((users, total))
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    let status: String = row.get("status");

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(&role)?,
        status: UserStatus::from_str(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, role, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.status.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..user.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn get_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE username = ?",
        SELECT_COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by username")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn get_by_email_mysql(pool: &MySqlPool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE email = ?",
        SELECT_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by email")?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, role = ?, status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.status.to_string())
    .bind(now)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    Ok(User {
        updated_at: now,
        ..user.clone()
    })
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;
    Ok(())
}

async fn count_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    Ok(count)
}

async fn count_admins_mysql(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .context("Failed to count admins")?;
    Ok(count)
}

async fn list_mysql(pool: &MySqlPool, params: &ListParams) -> Result<(Vec<User>, i64)> {
    let total = count_mysql(pool).await?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM users ORDER BY id LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .context("Failed to list users")?;

    let users = rows
        .iter()
        .map(row_to_user_mysql)
        .collect::<Result<Vec<_>>>()?;

    Ok((users, total))
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role: String = row.get("role");
    let status: String = row.get("status");

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(&role)?,
        status: UserStatus::from_str(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxUserRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxUserRepository::new(pool)
    }

    fn sample_user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
            UserRole::Member,
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup().await;

        let created = repo.create(&sample_user("alice")).await.unwrap();
        assert!(created.id > 0);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.role, UserRole::Member);

        let by_name = repo.get_by_username("alice").await.unwrap();
        assert!(by_name.is_some());

        let by_email = repo.get_by_email("alice@example.com").await.unwrap();
        assert!(by_email.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = setup().await;
        assert!(repo.get_by_id(42).await.unwrap().is_none());
        assert!(repo.get_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update() {
        let repo = setup().await;

        let mut user = repo.create(&sample_user("bob")).await.unwrap();
        user.role = UserRole::Manager;
        user.status = UserStatus::Suspended;

        repo.update(&user).await.unwrap();

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.role, UserRole::Manager);
        assert_eq!(fetched.status, UserStatus::Suspended);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup().await;

        let user = repo.create(&sample_user("carol")).await.unwrap();
        repo.delete(user.id).await.unwrap();

        assert!(repo.get_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_admins() {
        let repo = setup().await;

        assert_eq!(repo.count_admins().await.unwrap(), 0);

        let mut admin = sample_user("root");
        admin.role = UserRole::Admin;
        repo.create(&admin).await.unwrap();
        repo.create(&sample_user("plain")).await.unwrap();

        assert_eq!(repo.count_admins().await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = setup().await;

        for i in 0..5 {
            repo.create(&sample_user(&format!("user{}", i))).await.unwrap();
        }

        let (page, total) = repo.list(&ListParams::new(1, 2)).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);

        let (page, _) = repo.list(&ListParams::new(3, 2)).await.unwrap();
        assert_eq!(page.len(), 1);
    }
}
