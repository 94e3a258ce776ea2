//! Ad campaign model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An AdSense campaign.
///
/// Campaigns accumulate daily revenue entries; monetary values are
/// stored in micros (1e-6 currency units) as AdSense reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier
    pub id: i64,
    /// Campaign name
    pub name: String,
    /// Advertiser name
    pub advertiser: String,
    /// Campaign status
    pub status: CampaignStatus,
    /// First day of the campaign
    pub starts_on: NaiveDate,
    /// Last day of the campaign, open-ended when absent
    pub ends_on: Option<NaiveDate>,
    /// Total budget in micros
    pub budget_micros: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a new active campaign
    pub fn new(name: String, advertiser: String, starts_on: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            name,
            advertiser,
            status: CampaignStatus::Active,
            starts_on,
            ends_on: None,
            budget_micros: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Running and accepting revenue entries
    #[default]
    Active,
    /// Temporarily paused
    Paused,
    /// Finished
    Completed,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignStatus::Active => write!(f, "active"),
            CampaignStatus::Paused => write!(f, "paused"),
            CampaignStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(CampaignStatus::Active),
            "paused" => Ok(CampaignStatus::Paused),
            "completed" => Ok(CampaignStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid campaign status: {}", s)),
        }
    }
}

/// Input for creating a campaign
#[derive(Debug, Clone)]
pub struct CreateCampaignInput {
    pub name: String,
    pub advertiser: String,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub budget_micros: Option<i64>,
}

/// Input for updating a campaign
#[derive(Debug, Clone, Default)]
pub struct UpdateCampaignInput {
    pub name: Option<String>,
    pub advertiser: Option<String>,
    pub status: Option<CampaignStatus>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<Option<NaiveDate>>,
    pub budget_micros: Option<i64>,
}
