//! Campaign service
//!
//! Business logic for AdSense campaigns: CRUD with date-window
//! validation. Mutations are gated to managers at the API layer.

use crate::db::repositories::CampaignRepository;
use crate::models::{Campaign, CreateCampaignInput, ListParams, UpdateCampaignInput};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;

/// Error types for campaign service operations
#[derive(Debug, thiserror::Error)]
pub enum CampaignServiceError {
    /// Campaign not found
    #[error("Campaign not found")]
    NotFound,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Campaign service
pub struct CampaignService {
    repo: Arc<dyn CampaignRepository>,
}

impl CampaignService {
    /// Create a new campaign service
    pub fn new(repo: Arc<dyn CampaignRepository>) -> Self {
        Self { repo }
    }

    /// Create a campaign
    pub async fn create(
        &self,
        input: CreateCampaignInput,
    ) -> Result<Campaign, CampaignServiceError> {
        if input.name.trim().is_empty() {
            return Err(CampaignServiceError::ValidationError(
                "Campaign name cannot be empty".to_string(),
            ));
        }
        if input.advertiser.trim().is_empty() {
            return Err(CampaignServiceError::ValidationError(
                "Advertiser cannot be empty".to_string(),
            ));
        }
        check_window(input.starts_on, input.ends_on)?;

        if let Some(budget) = input.budget_micros {
            if budget < 0 {
                return Err(CampaignServiceError::ValidationError(
                    "Budget cannot be negative".to_string(),
                ));
            }
        }

        let mut campaign = Campaign::new(
            input.name.trim().to_string(),
            input.advertiser.trim().to_string(),
            input.starts_on,
        );
        campaign.ends_on = input.ends_on;
        campaign.budget_micros = input.budget_micros.unwrap_or(0);

        self.repo
            .create(&campaign)
            .await
            .context("Failed to create campaign")
            .map_err(Into::into)
    }

    /// Get a campaign by ID
    pub async fn get(&self, id: i64) -> Result<Campaign, CampaignServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get campaign")?
            .ok_or(CampaignServiceError::NotFound)
    }

    /// List campaigns with pagination
    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<(Vec<Campaign>, i64), CampaignServiceError> {
        self.repo
            .list(params)
            .await
            .context("Failed to list campaigns")
            .map_err(Into::into)
    }

    /// Update a campaign
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCampaignInput,
    ) -> Result<Campaign, CampaignServiceError> {
        let mut campaign = self.get(id).await?;

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(CampaignServiceError::ValidationError(
                    "Campaign name cannot be empty".to_string(),
                ));
            }
            campaign.name = name.trim().to_string();
        }
        if let Some(advertiser) = input.advertiser {
            if advertiser.trim().is_empty() {
                return Err(CampaignServiceError::ValidationError(
                    "Advertiser cannot be empty".to_string(),
                ));
            }
            campaign.advertiser = advertiser.trim().to_string();
        }
        if let Some(status) = input.status {
            campaign.status = status;
        }
        if let Some(starts_on) = input.starts_on {
            campaign.starts_on = starts_on;
        }
        if let Some(ends_on) = input.ends_on {
            campaign.ends_on = ends_on;
        }
        if let Some(budget) = input.budget_micros {
            if budget < 0 {
                return Err(CampaignServiceError::ValidationError(
                    "Budget cannot be negative".to_string(),
                ));
            }
            campaign.budget_micros = budget;
        }

        check_window(campaign.starts_on, campaign.ends_on)?;

        self.repo
            .update(&campaign)
            .await
            .context("Failed to update campaign")
            .map_err(Into::into)
    }

    /// Delete a campaign and its revenue entries
    pub async fn delete(&self, id: i64) -> Result<(), CampaignServiceError> {
        // Surface 404 before deleting nothing
        self.get(id).await?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete campaign")
            .map_err(Into::into)
    }
}

fn check_window(
    starts_on: NaiveDate,
    ends_on: Option<NaiveDate>,
) -> Result<(), CampaignServiceError> {
    if let Some(ends_on) = ends_on {
        if ends_on < starts_on {
            return Err(CampaignServiceError::ValidationError(
                "Campaign end date cannot precede its start date".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxCampaignRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::CampaignStatus;

    async fn setup() -> CampaignService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        CampaignService::new(SqlxCampaignRepository::shared(pool))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input() -> CreateCampaignInput {
        CreateCampaignInput {
            name: "Spring push".to_string(),
            advertiser: "Acme".to_string(),
            starts_on: date(2025, 3, 1),
            ends_on: Some(date(2025, 5, 31)),
            budget_micros: Some(1_000_000_000),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = setup().await;

        let campaign = service.create(input()).await.unwrap();
        assert_eq!(campaign.status, CampaignStatus::Active);

        let fetched = service.get(campaign.id).await.unwrap();
        assert_eq!(fetched.name, "Spring push");
    }

    #[tokio::test]
    async fn test_end_before_start_rejected() {
        let service = setup().await;

        let mut bad = input();
        bad.ends_on = Some(date(2025, 1, 1));
        let result = service.create(bad).await;
        assert!(matches!(result, Err(CampaignServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_revalidates_window() {
        let service = setup().await;
        let campaign = service.create(input()).await.unwrap();

        // Moving the start past the end must be rejected
        let result = service
            .update(
                campaign.id,
                UpdateCampaignInput {
                    starts_on: Some(date(2025, 7, 1)),
                    ..UpdateCampaignInput::default()
                },
            )
            .await;
        assert!(matches!(result, Err(CampaignServiceError::ValidationError(_))));

        // Clearing the end date makes the campaign open-ended
        let updated = service
            .update(
                campaign.id,
                UpdateCampaignInput {
                    ends_on: Some(None),
                    status: Some(CampaignStatus::Paused),
                    ..UpdateCampaignInput::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.ends_on.is_none());
        assert_eq!(updated.status, CampaignStatus::Paused);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = setup().await;
        assert!(matches!(
            service.delete(99).await,
            Err(CampaignServiceError::NotFound)
        ));
    }
}
