//! Channel service
//!
//! Business logic for tracked YouTube channels. Mutations are restricted
//! to the channel owner or an admin; deleting a channel removes its
//! videos through the database cascade.

use crate::db::repositories::ChannelRepository;
use crate::models::{Channel, CreateChannelInput, ListParams, UpdateChannelInput, UserRole};
use crate::services::token::AccessClaims;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for channel service operations
#[derive(Debug, thiserror::Error)]
pub enum ChannelServiceError {
    /// Channel not found
    #[error("Channel not found")]
    NotFound,

    /// Actor is not allowed to mutate this channel
    #[error("Not allowed to modify this channel")]
    Forbidden,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A channel with this YouTube ID already exists
    #[error("Channel already registered: {0}")]
    AlreadyExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Channel service
pub struct ChannelService {
    repo: Arc<dyn ChannelRepository>,
}

impl ChannelService {
    /// Create a new channel service
    pub fn new(repo: Arc<dyn ChannelRepository>) -> Self {
        Self { repo }
    }

    /// Register a channel, owned by the acting user
    pub async fn create(
        &self,
        actor: &AccessClaims,
        input: CreateChannelInput,
    ) -> Result<Channel, ChannelServiceError> {
        let youtube_id = input.youtube_id.trim();
        if youtube_id.is_empty() {
            return Err(ChannelServiceError::ValidationError(
                "YouTube channel ID cannot be empty".to_string(),
            ));
        }
        if input.title.trim().is_empty() {
            return Err(ChannelServiceError::ValidationError(
                "Channel title cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_youtube_id(youtube_id)
            .await
            .context("Failed to check existing channel")?
            .is_some()
        {
            return Err(ChannelServiceError::AlreadyExists(youtube_id.to_string()));
        }

        let mut channel = Channel::new(
            youtube_id.to_string(),
            input.title.trim().to_string(),
            actor.user_id,
        );
        channel.description = input.description;
        channel.subscriber_count = input.subscriber_count.unwrap_or(0).max(0);

        self.repo
            .create(&channel)
            .await
            .context("Failed to create channel")
            .map_err(Into::into)
    }

    /// Get a channel by ID
    pub async fn get(&self, id: i64) -> Result<Channel, ChannelServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get channel")?
            .ok_or(ChannelServiceError::NotFound)
    }

    /// List channels with pagination
    pub async fn list(
        &self,
        params: &ListParams,
    ) -> Result<(Vec<Channel>, i64), ChannelServiceError> {
        self.repo
            .list(params)
            .await
            .context("Failed to list channels")
            .map_err(Into::into)
    }

    /// Update a channel. Owner or admin only.
    pub async fn update(
        &self,
        actor: &AccessClaims,
        id: i64,
        input: UpdateChannelInput,
    ) -> Result<Channel, ChannelServiceError> {
        let mut channel = self.get(id).await?;
        self.check_can_manage(actor, &channel)?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ChannelServiceError::ValidationError(
                    "Channel title cannot be empty".to_string(),
                ));
            }
            channel.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            channel.description = if description.trim().is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(count) = input.subscriber_count {
            if count < 0 {
                return Err(ChannelServiceError::ValidationError(
                    "Subscriber count cannot be negative".to_string(),
                ));
            }
            channel.subscriber_count = count;
        }

        self.repo
            .update(&channel)
            .await
            .context("Failed to update channel")
            .map_err(Into::into)
    }

    /// Delete a channel and its videos. Owner or admin only.
    pub async fn delete(&self, actor: &AccessClaims, id: i64) -> Result<(), ChannelServiceError> {
        let channel = self.get(id).await?;
        self.check_can_manage(actor, &channel)?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete channel")
            .map_err(Into::into)
    }

    fn check_can_manage(
        &self,
        actor: &AccessClaims,
        channel: &Channel,
    ) -> Result<(), ChannelServiceError> {
        if actor.role == UserRole::Admin || actor.user_id == channel.owner_id {
            Ok(())
        } else {
            Err(ChannelServiceError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxChannelRepository;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};

    async fn setup() -> (ChannelService, AccessClaims, AccessClaims, AccessClaims) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let mut ids = Vec::new();
        for (name, role) in [
            ("owner", UserRole::Member),
            ("intruder", UserRole::Member),
            ("boss", UserRole::Admin),
        ] {
            let user = users
                .create(&User::new(
                    name.to_string(),
                    format!("{}@example.com", name),
                    "hash".to_string(),
                    role,
                ))
                .await
                .unwrap();
            ids.push((user.id, name.to_string(), role));
        }

        let claims = |i: usize| AccessClaims {
            user_id: ids[i].0,
            username: ids[i].1.clone(),
            role: ids[i].2,
        };

        (
            ChannelService::new(SqlxChannelRepository::shared(pool)),
            claims(0),
            claims(1),
            claims(2),
        )
    }

    fn input(youtube_id: &str) -> CreateChannelInput {
        CreateChannelInput {
            youtube_id: youtube_id.to_string(),
            title: "Channel".to_string(),
            description: None,
            subscriber_count: None,
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner() {
        let (service, owner, _, _) = setup().await;

        let channel = service.create(&owner, input("UC1")).await.unwrap();
        assert_eq!(channel.owner_id, owner.user_id);
    }

    #[tokio::test]
    async fn test_duplicate_youtube_id_rejected() {
        let (service, owner, _, _) = setup().await;

        service.create(&owner, input("UC1")).await.unwrap();
        let result = service.create(&owner, input("UC1")).await;
        assert!(matches!(result, Err(ChannelServiceError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_mutate() {
        let (service, owner, intruder, _) = setup().await;

        let channel = service.create(&owner, input("UC1")).await.unwrap();

        let result = service
            .update(
                &intruder,
                channel.id,
                UpdateChannelInput {
                    title: Some("Hijacked".to_string()),
                    ..UpdateChannelInput::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ChannelServiceError::Forbidden)));

        let result = service.delete(&intruder, channel.id).await;
        assert!(matches!(result, Err(ChannelServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_can_mutate_any_channel() {
        let (service, owner, _, admin) = setup().await;

        let channel = service.create(&owner, input("UC1")).await.unwrap();

        let updated = service
            .update(
                &admin,
                channel.id,
                UpdateChannelInput {
                    title: Some("Renamed".to_string()),
                    ..UpdateChannelInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");

        service.delete(&admin, channel.id).await.unwrap();
        assert!(matches!(
            service.get(channel.id).await,
            Err(ChannelServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_negative_subscriber_count_rejected() {
        let (service, owner, _, _) = setup().await;

        let channel = service.create(&owner, input("UC1")).await.unwrap();
        let result = service
            .update(
                &owner,
                channel.id,
                UpdateChannelInput {
                    subscriber_count: Some(-5),
                    ..UpdateChannelInput::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ChannelServiceError::ValidationError(_))));
    }
}
