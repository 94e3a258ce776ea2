//! Revenue repository
//!
//! Database operations for daily ad revenue entries, including the
//! per-campaign aggregation used by the summary endpoint.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{RevenueEntry, RevenueSummary};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Revenue repository trait
#[async_trait]
pub trait RevenueRepository: Send + Sync {
    /// Create a new revenue entry
    async fn create(&self, entry: &RevenueEntry) -> Result<RevenueEntry>;

    /// Get revenue entry by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<RevenueEntry>>;

    /// Delete a revenue entry
    async fn delete(&self, id: i64) -> Result<()>;

    /// List entries for a campaign, optionally bounded by date range,
    /// ordered by entry date
    async fn list_by_campaign(
        &self,
        campaign_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RevenueEntry>>;

    /// Aggregate totals for a campaign
    async fn summarize(&self, campaign_id: i64) -> Result<RevenueSummary>;
}

/// SQLx-based revenue repository supporting SQLite and MySQL.
pub struct SqlxRevenueRepository {
    pool: DynDatabasePool,
}

impl SqlxRevenueRepository {
    /// Create a new SQLx revenue repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn RevenueRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RevenueRepository for SqlxRevenueRepository {
    async fn create(&self, entry: &RevenueEntry) -> Result<RevenueEntry> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), entry).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), entry).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<RevenueEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list_by_campaign(
        &self,
        campaign_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RevenueEntry>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_by_campaign_sqlite(self.pool.as_sqlite().unwrap(), campaign_id, from, to).await
            }
            DatabaseDriver::Mysql => {
                list_by_campaign_mysql(self.pool.as_mysql().unwrap(), campaign_id, from, to).await
            }
        }
    }

    async fn summarize(&self, campaign_id: i64) -> Result<RevenueSummary> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                summarize_sqlite(self.pool.as_sqlite().unwrap(), campaign_id).await
            }
            DatabaseDriver::Mysql => {
                summarize_mysql(self.pool.as_mysql().unwrap(), campaign_id).await
            }
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, campaign_id, entry_date, amount_micros, impressions, clicks, created_at";

const SUMMARY_SQL_SQLITE: &str = r#"
    SELECT COUNT(*) AS entry_count,
           COALESCE(SUM(amount_micros), 0) AS total_amount_micros,
           COALESCE(SUM(impressions), 0) AS total_impressions,
           COALESCE(SUM(clicks), 0) AS total_clicks
    FROM ad_revenues
    WHERE campaign_id = ?
"#;

// MySQL SUM() yields DECIMAL, which does not decode as i64
const SUMMARY_SQL_MYSQL: &str = r#"
    SELECT COUNT(*) AS entry_count,
           CAST(COALESCE(SUM(amount_micros), 0) AS SIGNED) AS total_amount_micros,
           CAST(COALESCE(SUM(impressions), 0) AS SIGNED) AS total_impressions,
           CAST(COALESCE(SUM(clicks), 0) AS SIGNED) AS total_clicks
    FROM ad_revenues
    WHERE campaign_id = ?
"#;

/// Build the list query for the optional date bounds; bindings are
/// appended in the same order by the callers.
fn list_sql(from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
    let mut sql = format!(
        "SELECT {} FROM ad_revenues WHERE campaign_id = ?",
        SELECT_COLUMNS
    );
    if from.is_some() {
        sql.push_str(" AND entry_date >= ?");
    }
    if to.is_some() {
        sql.push_str(" AND entry_date <= ?");
    }
    sql.push_str(" ORDER BY entry_date, id");
    sql
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, entry: &RevenueEntry) -> Result<RevenueEntry> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO ad_revenues
            (campaign_id, entry_date, amount_micros, impressions, clicks, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.campaign_id)
    .bind(entry.entry_date)
    .bind(entry.amount_micros)
    .bind(entry.impressions)
    .bind(entry.clicks)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create revenue entry")?;

    Ok(RevenueEntry {
        id: result.last_insert_rowid(),
        created_at: now,
        ..entry.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<RevenueEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM ad_revenues WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get revenue entry by ID")?;

    row.map(|row| row_to_entry_sqlite(&row)).transpose()
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM ad_revenues WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete revenue entry")?;
    Ok(())
}

async fn list_by_campaign_sqlite(
    pool: &SqlitePool,
    campaign_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<RevenueEntry>> {
    let sql = list_sql(from, to);
    let mut query = sqlx::query(&sql).bind(campaign_id);
    if let Some(from) = from {
        query = query.bind(from);
    }
    if let Some(to) = to {
        query = query.bind(to);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list revenue entries")?;

    rows.iter().map(row_to_entry_sqlite).collect()
}

async fn summarize_sqlite(pool: &SqlitePool, campaign_id: i64) -> Result<RevenueSummary> {
    let row = sqlx::query(SUMMARY_SQL_SQLITE)
        .bind(campaign_id)
        .fetch_one(pool)
        .await
        .context("Failed to summarize revenue")?;

    Ok(RevenueSummary {
        campaign_id,
        entry_count: row.get("entry_count"),
        total_amount_micros: row.get("total_amount_micros"),
        total_impressions: row.get("total_impressions"),
        total_clicks: row.get("total_clicks"),
    })
}

fn row_to_entry_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<RevenueEntry> {
    Ok(RevenueEntry {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        entry_date: row.get("entry_date"),
        amount_micros: row.get("amount_micros"),
        impressions: row.get("impressions"),
        clicks: row.get("clicks"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, entry: &RevenueEntry) -> Result<RevenueEntry> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO ad_revenues
            (campaign_id, entry_date, amount_micros, impressions, clicks, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.campaign_id)
    .bind(entry.entry_date)
    .bind(entry.amount_micros)
    .bind(entry.impressions)
    .bind(entry.clicks)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create revenue entry")?;

    Ok(RevenueEntry {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..entry.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<RevenueEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM ad_revenues WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get revenue entry by ID")?;

    row.map(|row| row_to_entry_mysql(&row)).transpose()
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM ad_revenues WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete revenue entry")?;
    Ok(())
}

async fn list_by_campaign_mysql(
    pool: &MySqlPool,
    campaign_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<RevenueEntry>> {
    let sql = list_sql(from, to);
    let mut query = sqlx::query(&sql).bind(campaign_id);
    if let Some(from) = from {
        query = query.bind(from);
    }
    if let Some(to) = to {
        query = query.bind(to);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to list revenue entries")?;

    rows.iter().map(row_to_entry_mysql).collect()
}

async fn summarize_mysql(pool: &MySqlPool, campaign_id: i64) -> Result<RevenueSummary> {
    let row = sqlx::query(SUMMARY_SQL_MYSQL)
        .bind(campaign_id)
        .fetch_one(pool)
        .await
        .context("Failed to summarize revenue")?;

    Ok(RevenueSummary {
        campaign_id,
        entry_count: row.get("entry_count"),
        total_amount_micros: row.get("total_amount_micros"),
        total_impressions: row.get("total_impressions"),
        total_clicks: row.get("total_clicks"),
    })
}

fn row_to_entry_mysql(row: &sqlx::mysql::MySqlRow) -> Result<RevenueEntry> {
    Ok(RevenueEntry {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        entry_date: row.get("entry_date"),
        amount_micros: row.get("amount_micros"),
        impressions: row.get("impressions"),
        clicks: row.get("clicks"),
        created_at: row.get("created_at"),
    })
}
