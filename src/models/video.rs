//! Video model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked video.
///
/// Every video belongs to one channel and one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    /// Unique identifier
    pub id: i64,
    /// YouTube video identifier (unique)
    pub youtube_id: String,
    /// Owning channel
    pub channel_id: i64,
    /// Category
    pub category_id: i64,
    /// Video title
    pub title: String,
    /// Video description
    pub description: Option<String>,
    /// Duration in seconds
    pub duration_seconds: i64,
    /// Last known view count
    pub view_count: i64,
    /// Publication timestamp on YouTube, if published
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Create a new video in the given channel and category
    pub fn new(youtube_id: String, channel_id: i64, category_id: i64, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            youtube_id,
            channel_id,
            category_id,
            title,
            description: None,
            duration_seconds: 0,
            view_count: 0,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for registering a video
#[derive(Debug, Clone)]
pub struct CreateVideoInput {
    pub youtube_id: String,
    pub channel_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Input for updating a video
#[derive(Debug, Clone, Default)]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub view_count: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Filter for video listings
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoFilter {
    pub channel_id: Option<i64>,
    pub category_id: Option<i64>,
}
