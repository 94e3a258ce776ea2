//! Video service
//!
//! Business logic for tracked videos: creation with channel/category
//! existence validation, filtered listings, updates and deletion.
//! Mutations require the owning channel's owner or an admin.

use crate::db::repositories::{ChannelRepository, VideoCategoryRepository, VideoRepository};
use crate::models::{
    CreateVideoInput, ListParams, UpdateVideoInput, UserRole, Video, VideoFilter,
};
use crate::services::token::AccessClaims;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for video service operations
#[derive(Debug, thiserror::Error)]
pub enum VideoServiceError {
    /// Video not found
    #[error("Video not found")]
    NotFound,

    /// Referenced channel does not exist
    #[error("Channel not found")]
    ChannelNotFound,

    /// Referenced category does not exist
    #[error("Category not found")]
    CategoryNotFound,

    /// Actor is not allowed to mutate this video
    #[error("Not allowed to modify this video")]
    Forbidden,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A video with this YouTube ID already exists
    #[error("Video already registered: {0}")]
    AlreadyExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Video service
pub struct VideoService {
    repo: Arc<dyn VideoRepository>,
    channel_repo: Arc<dyn ChannelRepository>,
    category_repo: Arc<dyn VideoCategoryRepository>,
}

impl VideoService {
    /// Create a new video service
    pub fn new(
        repo: Arc<dyn VideoRepository>,
        channel_repo: Arc<dyn ChannelRepository>,
        category_repo: Arc<dyn VideoCategoryRepository>,
    ) -> Self {
        Self {
            repo,
            channel_repo,
            category_repo,
        }
    }

    /// Register a video in one of the actor's channels
    pub async fn create(
        &self,
        actor: &AccessClaims,
        input: CreateVideoInput,
    ) -> Result<Video, VideoServiceError> {
        let youtube_id = input.youtube_id.trim();
        if youtube_id.is_empty() {
            return Err(VideoServiceError::ValidationError(
                "YouTube video ID cannot be empty".to_string(),
            ));
        }
        if input.title.trim().is_empty() {
            return Err(VideoServiceError::ValidationError(
                "Video title cannot be empty".to_string(),
            ));
        }

        let channel = self
            .channel_repo
            .get_by_id(input.channel_id)
            .await
            .context("Failed to check channel")?
            .ok_or(VideoServiceError::ChannelNotFound)?;

        if actor.role != UserRole::Admin && actor.user_id != channel.owner_id {
            return Err(VideoServiceError::Forbidden);
        }

        self.category_repo
            .get_by_id(input.category_id)
            .await
            .context("Failed to check category")?
            .ok_or(VideoServiceError::CategoryNotFound)?;

        if self
            .repo
            .get_by_youtube_id(youtube_id)
            .await
            .context("Failed to check existing video")?
            .is_some()
        {
            return Err(VideoServiceError::AlreadyExists(youtube_id.to_string()));
        }

        let mut video = Video::new(
            youtube_id.to_string(),
            input.channel_id,
            input.category_id,
            input.title.trim().to_string(),
        );
        video.description = input.description;
        video.duration_seconds = input.duration_seconds.unwrap_or(0).max(0);
        video.published_at = input.published_at;

        self.repo
            .create(&video)
            .await
            .context("Failed to create video")
            .map_err(Into::into)
    }

    /// Get a video by ID
    pub async fn get(&self, id: i64) -> Result<Video, VideoServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get video")?
            .ok_or(VideoServiceError::NotFound)
    }

    /// List videos matching the filter
    pub async fn list(
        &self,
        filter: &VideoFilter,
        params: &ListParams,
    ) -> Result<(Vec<Video>, i64), VideoServiceError> {
        self.repo
            .list(filter, params)
            .await
            .context("Failed to list videos")
            .map_err(Into::into)
    }

    /// Update a video. Channel owner or admin only.
    pub async fn update(
        &self,
        actor: &AccessClaims,
        id: i64,
        input: UpdateVideoInput,
    ) -> Result<Video, VideoServiceError> {
        let mut video = self.get(id).await?;
        self.check_can_manage(actor, &video).await?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(VideoServiceError::ValidationError(
                    "Video title cannot be empty".to_string(),
                ));
            }
            video.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            video.description = if description.trim().is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(category_id) = input.category_id {
            self.category_repo
                .get_by_id(category_id)
                .await
                .context("Failed to check category")?
                .ok_or(VideoServiceError::CategoryNotFound)?;
            video.category_id = category_id;
        }
        if let Some(duration) = input.duration_seconds {
            if duration < 0 {
                return Err(VideoServiceError::ValidationError(
                    "Duration cannot be negative".to_string(),
                ));
            }
            video.duration_seconds = duration;
        }
        if let Some(views) = input.view_count {
            if views < 0 {
                return Err(VideoServiceError::ValidationError(
                    "View count cannot be negative".to_string(),
                ));
            }
            video.view_count = views;
        }
        if let Some(published_at) = input.published_at {
            video.published_at = Some(published_at);
        }

        self.repo
            .update(&video)
            .await
            .context("Failed to update video")
            .map_err(Into::into)
    }

    /// Delete a video. Channel owner or admin only.
    pub async fn delete(&self, actor: &AccessClaims, id: i64) -> Result<(), VideoServiceError> {
        let video = self.get(id).await?;
        self.check_can_manage(actor, &video).await?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete video")
            .map_err(Into::into)
    }

    async fn check_can_manage(
        &self,
        actor: &AccessClaims,
        video: &Video,
    ) -> Result<(), VideoServiceError> {
        if actor.role == UserRole::Admin {
            return Ok(());
        }

        let channel = self
            .channel_repo
            .get_by_id(video.channel_id)
            .await
            .context("Failed to check channel")?
            .ok_or(VideoServiceError::ChannelNotFound)?;

        if actor.user_id == channel.owner_id {
            Ok(())
        } else {
            Err(VideoServiceError::Forbidden)
        }
    }
}
