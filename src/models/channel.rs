//! YouTube channel model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked YouTube channel.
///
/// Channels are owned by the user who registered them; videos belong to
/// exactly one channel and are removed together with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Unique identifier
    pub id: i64,
    /// YouTube channel identifier (unique, e.g. "UC...")
    pub youtube_id: String,
    /// Channel title
    pub title: String,
    /// Channel description
    pub description: Option<String>,
    /// Owning user
    pub owner_id: i64,
    /// Last known subscriber count
    pub subscriber_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Channel {
    /// Create a new channel owned by `owner_id`
    pub fn new(youtube_id: String, title: String, owner_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            youtube_id,
            title,
            description: None,
            owner_id,
            subscriber_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for registering a channel
#[derive(Debug, Clone)]
pub struct CreateChannelInput {
    pub youtube_id: String,
    pub title: String,
    pub description: Option<String>,
    pub subscriber_count: Option<i64>,
}

/// Input for updating a channel
#[derive(Debug, Clone, Default)]
pub struct UpdateChannelInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subscriber_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_new() {
        let channel = Channel::new("UCabc123".to_string(), "My Channel".to_string(), 7);

        assert_eq!(channel.id, 0);
        assert_eq!(channel.youtube_id, "UCabc123");
        assert_eq!(channel.owner_id, 7);
        assert_eq!(channel.subscriber_count, 0);
        assert!(channel.description.is_none());
    }
}
