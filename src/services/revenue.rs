//! Revenue service
//!
//! Business logic for daily ad revenue entries: recording with
//! non-negative validation against an existing campaign, date-bounded
//! listings, and per-campaign summaries.

use crate::db::repositories::{CampaignRepository, RevenueRepository};
use crate::models::{CreateRevenueInput, RevenueEntry, RevenueSummary};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;

/// Error types for revenue service operations
#[derive(Debug, thiserror::Error)]
pub enum RevenueServiceError {
    /// Revenue entry not found
    #[error("Revenue entry not found")]
    NotFound,

    /// Referenced campaign does not exist
    #[error("Campaign not found")]
    CampaignNotFound,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Revenue service
pub struct RevenueService {
    repo: Arc<dyn RevenueRepository>,
    campaign_repo: Arc<dyn CampaignRepository>,
}

impl RevenueService {
    /// Create a new revenue service
    pub fn new(repo: Arc<dyn RevenueRepository>, campaign_repo: Arc<dyn CampaignRepository>) -> Self {
        Self {
            repo,
            campaign_repo,
        }
    }

    /// Record a revenue entry for a campaign
    pub async fn record(
        &self,
        campaign_id: i64,
        input: CreateRevenueInput,
    ) -> Result<RevenueEntry, RevenueServiceError> {
        self.check_campaign(campaign_id).await?;

        if input.amount_micros < 0 {
            return Err(RevenueServiceError::ValidationError(
                "Revenue amount cannot be negative".to_string(),
            ));
        }
        let impressions = input.impressions.unwrap_or(0);
        let clicks = input.clicks.unwrap_or(0);
        if impressions < 0 || clicks < 0 {
            return Err(RevenueServiceError::ValidationError(
                "Impressions and clicks cannot be negative".to_string(),
            ));
        }
        if clicks > impressions {
            return Err(RevenueServiceError::ValidationError(
                "Clicks cannot exceed impressions".to_string(),
            ));
        }

        let mut entry = RevenueEntry::new(campaign_id, input.entry_date, input.amount_micros);
        entry.impressions = impressions;
        entry.clicks = clicks;

        self.repo
            .create(&entry)
            .await
            .context("Failed to record revenue")
            .map_err(Into::into)
    }

    /// List a campaign's entries, optionally bounded by date range
    pub async fn list(
        &self,
        campaign_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<RevenueEntry>, RevenueServiceError> {
        self.check_campaign(campaign_id).await?;

        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(RevenueServiceError::ValidationError(
                    "Date range end cannot precede its start".to_string(),
                ));
            }
        }

        self.repo
            .list_by_campaign(campaign_id, from, to)
            .await
            .context("Failed to list revenue entries")
            .map_err(Into::into)
    }

    /// Aggregate totals for a campaign
    pub async fn summarize(&self, campaign_id: i64) -> Result<RevenueSummary, RevenueServiceError> {
        self.check_campaign(campaign_id).await?;

        self.repo
            .summarize(campaign_id)
            .await
            .context("Failed to summarize revenue")
            .map_err(Into::into)
    }

    /// Delete an entry; it must belong to the given campaign
    pub async fn delete(&self, campaign_id: i64, entry_id: i64) -> Result<(), RevenueServiceError> {
        let entry = self
            .repo
            .get_by_id(entry_id)
            .await
            .context("Failed to get revenue entry")?
            .ok_or(RevenueServiceError::NotFound)?;

        if entry.campaign_id != campaign_id {
            return Err(RevenueServiceError::NotFound);
        }

        self.repo
            .delete(entry_id)
            .await
            .context("Failed to delete revenue entry")
            .map_err(Into::into)
    }

    async fn check_campaign(&self, campaign_id: i64) -> Result<(), RevenueServiceError> {
        self.campaign_repo
            .get_by_id(campaign_id)
            .await
            .context("Failed to check campaign")?
            .ok_or(RevenueServiceError::CampaignNotFound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CampaignRepository as _, SqlxCampaignRepository, SqlxRevenueRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::Campaign;

    async fn setup() -> (RevenueService, i64) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let campaigns = SqlxCampaignRepository::new(pool.clone());
        let campaign = campaigns
            .create(&Campaign::new(
                "C".to_string(),
                "Acme".to_string(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ))
            .await
            .unwrap();

        let service = RevenueService::new(
            SqlxRevenueRepository::shared(pool.clone()),
            SqlxCampaignRepository::shared(pool),
        );
        (service, campaign.id)
    }

    fn input(day: u32, amount: i64) -> CreateRevenueInput {
        CreateRevenueInput {
            entry_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            amount_micros: amount,
            impressions: Some(1000),
            clicks: Some(25),
        }
    }

    #[tokio::test]
    async fn test_record_requires_campaign() {
        let (service, _) = setup().await;

        let result = service.record(999, input(1, 100)).await;
        assert!(matches!(result, Err(RevenueServiceError::CampaignNotFound)));
    }

    #[tokio::test]
    async fn test_record_rejects_negative_amount() {
        let (service, campaign_id) = setup().await;

        let result = service.record(campaign_id, input(1, -5)).await;
        assert!(matches!(result, Err(RevenueServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_record_rejects_clicks_above_impressions() {
        let (service, campaign_id) = setup().await;

        let mut bad = input(1, 100);
        bad.impressions = Some(10);
        bad.clicks = Some(20);
        let result = service.record(campaign_id, bad).await;
        assert!(matches!(result, Err(RevenueServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_summary_totals_match_entries() {
        let (service, campaign_id) = setup().await;

        service.record(campaign_id, input(1, 1_000_000)).await.unwrap();
        service.record(campaign_id, input(2, 500_000)).await.unwrap();

        let summary = service.summarize(campaign_id).await.unwrap();
        assert_eq!(summary.entry_count, 2);
        assert_eq!(summary.total_amount_micros, 1_500_000);
        assert_eq!(summary.total_impressions, 2000);
        assert_eq!(summary.total_clicks, 50);
    }

    #[tokio::test]
    async fn test_list_rejects_inverted_range() {
        let (service, campaign_id) = setup().await;

        let result = service
            .list(
                campaign_id,
                NaiveDate::from_ymd_opt(2025, 2, 1),
                NaiveDate::from_ymd_opt(2025, 1, 1),
            )
            .await;
        assert!(matches!(result, Err(RevenueServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_checks_campaign_match() {
        let (service, campaign_id) = setup().await;

        let entry = service.record(campaign_id, input(1, 100)).await.unwrap();

        // Wrong campaign id behaves as not-found
        let result = service.delete(campaign_id + 1, entry.id).await;
        assert!(matches!(result, Err(RevenueServiceError::NotFound)));

        service.delete(campaign_id, entry.id).await.unwrap();
        let entries = service.list(campaign_id, None, None).await.unwrap();
        assert!(entries.is_empty());
    }
}
