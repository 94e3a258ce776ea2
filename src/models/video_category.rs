//! Video category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification taxonomy for videos, admin-managed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoCategory {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly identifier (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl VideoCategory {
    /// Create a new category
    pub fn new(slug: String, name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            slug,
            name,
            description: None,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub name: String,
    /// Slug (optional, generated from the name when absent)
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Input for updating a category
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}
