//! Video category service
//!
//! Business logic for the admin-managed video taxonomy. A category that
//! still has videos attached refuses deletion.

use crate::db::repositories::{VideoCategoryRepository, VideoRepository};
use crate::models::{CreateCategoryInput, UpdateCategoryInput, VideoCategory};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category not found
    #[error("Category not found")]
    NotFound,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Category still referenced by videos
    #[error("Category is in use by {0} video(s)")]
    InUse(i64),

    /// A category with this slug already exists
    #[error("Category already exists: {0}")]
    AlreadyExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Video category service
pub struct CategoryService {
    repo: Arc<dyn VideoCategoryRepository>,
    video_repo: Arc<dyn VideoRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn VideoCategoryRepository>, video_repo: Arc<dyn VideoRepository>) -> Self {
        Self { repo, video_repo }
    }

    /// Create a category. The slug is generated from the name when not
    /// provided.
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<VideoCategory, CategoryServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        let slug = match input.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_lowercase(),
            _ => generate_slug(name),
        };
        if slug.is_empty() {
            return Err(CategoryServiceError::ValidationError(
                "Category slug cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_slug(&slug)
            .await
            .context("Failed to check existing category")?
            .is_some()
        {
            return Err(CategoryServiceError::AlreadyExists(slug));
        }

        let mut category = VideoCategory::new(slug, name.to_string());
        category.description = input.description;

        self.repo
            .create(&category)
            .await
            .context("Failed to create category")
            .map_err(Into::into)
    }

    /// Get a category by ID
    pub async fn get(&self, id: i64) -> Result<VideoCategory, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or(CategoryServiceError::NotFound)
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<VideoCategory>, CategoryServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list categories")
            .map_err(Into::into)
    }

    /// Update a category's name or description
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<VideoCategory, CategoryServiceError> {
        let mut category = self.get(id).await?;

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(CategoryServiceError::ValidationError(
                    "Category name cannot be empty".to_string(),
                ));
            }
            category.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            category.description = if description.trim().is_empty() {
                None
            } else {
                Some(description)
            };
        }

        self.repo
            .update(&category)
            .await
            .context("Failed to update category")
            .map_err(Into::into)
    }

    /// Delete a category. Refused while videos still reference it.
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self.get(id).await?;

        let in_use = self
            .video_repo
            .count_by_category(category.id)
            .await
            .context("Failed to count videos in category")?;
        if in_use > 0 {
            return Err(CategoryServiceError::InUse(in_use));
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")
            .map_err(Into::into)
    }
}

/// Generate a URL-friendly slug from a name
fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ChannelRepository, SqlxChannelRepository, SqlxUserRepository, SqlxVideoCategoryRepository,
        SqlxVideoRepository, UserRepository, VideoRepository as _,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Channel, User, UserRole, Video};

    async fn setup() -> (CategoryService, crate::db::DynDatabasePool) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let service = CategoryService::new(
            SqlxVideoCategoryRepository::shared(pool.clone()),
            SqlxVideoRepository::shared(pool.clone()),
        );
        (service, pool)
    }

    fn input(name: &str) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.to_string(),
            slug: None,
            description: None,
        }
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Gaming"), "gaming");
        assert_eq!(generate_slug("Let's Play!"), "let-s-play");
        assert_eq!(generate_slug("  Tech  Talks  "), "tech-talks");
    }

    #[tokio::test]
    async fn test_create_generates_slug() {
        let (service, _pool) = setup().await;

        let category = service.create(input("Let's Play")).await.unwrap();
        assert_eq!(category.slug, "let-s-play");
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let (service, _pool) = setup().await;

        service.create(input("Gaming")).await.unwrap();
        let result = service.create(input("Gaming")).await;
        assert!(matches!(result, Err(CategoryServiceError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_delete_refused_while_in_use() {
        let (service, pool) = setup().await;

        let category = service.create(input("Gaming")).await.unwrap();

        // Attach a video to the category
        let users = SqlxUserRepository::new(pool.clone());
        let owner = users
            .create(&User::new(
                "owner".to_string(),
                "owner@example.com".to_string(),
                "hash".to_string(),
                UserRole::Member,
            ))
            .await
            .unwrap();
        let channels = SqlxChannelRepository::new(pool.clone());
        let channel = channels
            .create(&Channel::new("UC1".to_string(), "C".to_string(), owner.id))
            .await
            .unwrap();
        let videos = SqlxVideoRepository::new(pool.clone());
        let video = videos
            .create(&Video::new(
                "v1".to_string(),
                channel.id,
                category.id,
                "V".to_string(),
            ))
            .await
            .unwrap();

        let result = service.delete(category.id).await;
        assert!(matches!(result, Err(CategoryServiceError::InUse(1))));

        // Once the video is gone, deletion succeeds
        videos.delete(video.id).await.unwrap();
        service.delete(category.id).await.unwrap();
        assert!(matches!(
            service.get(category.id).await,
            Err(CategoryServiceError::NotFound)
        ));
    }
}
