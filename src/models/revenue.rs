//! Ad revenue model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A daily revenue entry tied to a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueEntry {
    /// Unique identifier
    pub id: i64,
    /// Owning campaign
    pub campaign_id: i64,
    /// Day the revenue was earned
    pub entry_date: NaiveDate,
    /// Earned amount in micros
    pub amount_micros: i64,
    /// Ad impressions served
    pub impressions: i64,
    /// Ad clicks
    pub clicks: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RevenueEntry {
    /// Create a new revenue entry
    pub fn new(campaign_id: i64, entry_date: NaiveDate, amount_micros: i64) -> Self {
        Self {
            id: 0, // Will be set by the database
            campaign_id,
            entry_date,
            amount_micros,
            impressions: 0,
            clicks: 0,
            created_at: Utc::now(),
        }
    }
}

/// Input for recording revenue
#[derive(Debug, Clone)]
pub struct CreateRevenueInput {
    pub entry_date: NaiveDate,
    pub amount_micros: i64,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
}

/// Aggregated revenue figures for one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSummary {
    /// Campaign the summary covers
    pub campaign_id: i64,
    /// Number of revenue entries
    pub entry_count: i64,
    /// Total earned amount in micros
    pub total_amount_micros: i64,
    /// Total impressions
    pub total_impressions: i64,
    /// Total clicks
    pub total_clicks: i64,
}

impl RevenueSummary {
    /// Effective CPM: earnings per thousand impressions, in currency
    /// units. Zero when no impressions were served.
    pub fn ecpm(&self) -> f64 {
        if self.total_impressions == 0 {
            return 0.0;
        }
        (self.total_amount_micros as f64 / 1_000_000.0) / self.total_impressions as f64 * 1000.0
    }

    /// Click-through rate as a fraction. Zero when no impressions.
    pub fn ctr(&self) -> f64 {
        if self.total_impressions == 0 {
            return 0.0;
        }
        self.total_clicks as f64 / self.total_impressions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_entry_new() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let entry = RevenueEntry::new(5, date, 1_250_000);

        assert_eq!(entry.campaign_id, 5);
        assert_eq!(entry.amount_micros, 1_250_000);
        assert_eq!(entry.impressions, 0);
    }

    #[test]
    fn test_summary_ecpm() {
        let summary = RevenueSummary {
            campaign_id: 1,
            entry_count: 2,
            total_amount_micros: 5_000_000, // 5.0 units
            total_impressions: 2_000,
            total_clicks: 40,
        };

        assert!((summary.ecpm() - 2.5).abs() < 1e-9);
        assert!((summary.ctr() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_summary_ecpm_no_impressions() {
        let summary = RevenueSummary {
            campaign_id: 1,
            entry_count: 0,
            total_amount_micros: 0,
            total_impressions: 0,
            total_clicks: 0,
        };

        assert_eq!(summary.ecpm(), 0.0);
        assert_eq!(summary.ctr(), 0.0);
    }
}
