//! Campaign repository
//!
//! Database operations for AdSense campaigns.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Campaign, CampaignStatus, ListParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Campaign repository trait
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Create a new campaign
    async fn create(&self, campaign: &Campaign) -> Result<Campaign>;

    /// Get campaign by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Campaign>>;

    /// Update a campaign
    async fn update(&self, campaign: &Campaign) -> Result<Campaign>;

    /// Delete a campaign (revenue entries cascade)
    async fn delete(&self, id: i64) -> Result<()>;

    /// List campaigns with pagination, newest first
    async fn list(&self, params: &ListParams) -> Result<(Vec<Campaign>, i64)>;
}

/// SQLx-based campaign repository supporting SQLite and MySQL.
pub struct SqlxCampaignRepository {
    pool: DynDatabasePool,
}

impl SqlxCampaignRepository {
    /// Create a new SQLx campaign repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository handle
    pub fn shared(pool: DynDatabasePool) -> Arc<dyn CampaignRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CampaignRepository for SqlxCampaignRepository {
    async fn create(&self, campaign: &Campaign) -> Result<Campaign> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.as_sqlite().unwrap(), campaign).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.as_mysql().unwrap(), campaign).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Campaign>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn update(&self, campaign: &Campaign) -> Result<Campaign> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_sqlite(self.pool.as_sqlite().unwrap(), campaign).await,
            DatabaseDriver::Mysql => update_mysql(self.pool.as_mysql().unwrap(), campaign).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self, params: &ListParams) -> Result<(Vec<Campaign>, i64)> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_sqlite(self.pool.as_sqlite().unwrap(), params).await,
            DatabaseDriver::Mysql => list_mysql(self.pool.as_mysql().unwrap(), params).await,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, name, advertiser, status, starts_on, ends_on, budget_micros, created_at, updated_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, campaign: &Campaign) -> Result<Campaign> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO adsense_campaigns
            (name, advertiser, status, starts_on, ends_on, budget_micros, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.name)
    .bind(&campaign.advertiser)
    .bind(campaign.status.to_string())
    .bind(campaign.starts_on)
    .bind(campaign.ends_on)
    .bind(campaign.budget_micros)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create campaign")?;

    Ok(Campaign {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..campaign.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Campaign>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM adsense_campaigns WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get campaign by ID")?;

    row.map(|row| row_to_campaign_sqlite(&row)).transpose()
}

async fn update_sqlite(pool: &SqlitePool, campaign: &Campaign) -> Result<Campaign> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE adsense_campaigns
        SET name = ?, advertiser = ?, status = ?, starts_on = ?, ends_on = ?,
            budget_micros = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&campaign.name)
    .bind(&campaign.advertiser)
    .bind(campaign.status.to_string())
    .bind(campaign.starts_on)
    .bind(campaign.ends_on)
    .bind(campaign.budget_micros)
    .bind(now)
    .bind(campaign.id)
    .execute(pool)
    .await
    .context("Failed to update campaign")?;

    Ok(Campaign {
        updated_at: now,
        ..campaign.clone()
    })
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM adsense_campaigns WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete campaign")?;
    Ok(())
}

async fn list_sqlite(pool: &SqlitePool, params: &ListParams) -> Result<(Vec<Campaign>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM adsense_campaigns")
        .fetch_one(pool)
        .await
        .context("Failed to count campaigns")?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM adsense_campaigns ORDER BY starts_on DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .context("Failed to list campaigns")?;

    let campaigns = rows
        .iter()
        .map(row_to_campaign_sqlite)
        .collect::<Result<Vec<_>>>()?;

    Ok((campaigns, total))
}

fn row_to_campaign_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Campaign> {
    let status: String = row.get("status");

    Ok(Campaign {
        id: row.get("id"),
        name: row.get("name"),
        advertiser: row.get("advertiser"),
        status: CampaignStatus::from_str(&status)?,
        starts_on: row.get("starts_on"),
        ends_on: row.get("ends_on"),
        budget_micros: row.get("budget_micros"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, campaign: &Campaign) -> Result<Campaign> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO adsense_campaigns
            (name, advertiser, status, starts_on, ends_on, budget_micros, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.name)
    .bind(&campaign.advertiser)
    .bind(campaign.status.to_string())
    .bind(campaign.starts_on)
    .bind(campaign.ends_on)
    .bind(campaign.budget_micros)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create campaign")?;

    Ok(Campaign {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..campaign.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Campaign>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM adsense_campaigns WHERE id = ?",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get campaign by ID")?;

    row.map(|row| row_to_campaign_mysql(&row)).transpose()
}

async fn update_mysql(pool: &MySqlPool, campaign: &Campaign) -> Result<Campaign> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE adsense_campaigns
        SET name = ?, advertiser = ?, status = ?, starts_on = ?, ends_on = ?,
            budget_micros = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&campaign.name)
    .bind(&campaign.advertiser)
    .bind(campaign.status.to_string())
    .bind(campaign.starts_on)
    .bind(campaign.ends_on)
    .bind(campaign.budget_micros)
    .bind(now)
    .bind(campaign.id)
    .execute(pool)
    .await
    .context("Failed to update campaign")?;

    Ok(Campaign {
        updated_at: now,
        ..campaign.clone()
    })
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM adsense_campaigns WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete campaign")?;
    Ok(())
}

async fn list_mysql(pool: &MySqlPool, params: &ListParams) -> Result<(Vec<Campaign>, i64)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM adsense_campaigns")
        .fetch_one(pool)
        .await
        .context("Failed to count campaigns")?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM adsense_campaigns ORDER BY starts_on DESC, id DESC LIMIT ? OFFSET ?",
        SELECT_COLUMNS
    ))
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .context("Failed to list campaigns")?;

    let campaigns = rows
        .iter()
        .map(row_to_campaign_mysql)
        .collect::<Result<Vec<_>>>()?;

    Ok((campaigns, total))
}

fn row_to_campaign_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Campaign> {
    let status: String = row.get("status");

    Ok(Campaign {
        id: row.get("id"),
        name: row.get("name"),
        advertiser: row.get("advertiser"),
        status: CampaignStatus::from_str(&status)?,
        starts_on: row.get("starts_on"),
        ends_on: row.get("ends_on"),
        budget_micros: row.get("budget_micros"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
