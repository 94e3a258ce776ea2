//! Channel API endpoints
//!
//! Handles HTTP requests for tracked channels:
//! - GET /api/v1/channels - List channels
//! - POST /api/v1/channels - Register a channel
//! - GET /api/v1/channels/{id} - Get a channel
//! - PUT /api/v1/channels/{id} - Update a channel
//! - DELETE /api/v1/channels/{id} - Delete a channel
//! - GET /api/v1/channels/{id}/videos - List the channel's videos

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::videos::VideoResponse;
use crate::models::{
    Channel, CreateChannelInput, ListParams, UpdateChannelInput, VideoFilter,
};
use crate::services::ChannelServiceError;

/// Query parameters for paginated listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

impl PageQuery {
    pub fn params(&self) -> ListParams {
        ListParams::new(self.page, self.per_page)
    }
}

/// Request body for registering a channel
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChannelRequest {
    pub youtube_id: String,
    pub title: String,
    pub description: Option<String>,
    pub subscriber_count: Option<i64>,
}

/// Request body for updating a channel
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateChannelRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subscriber_count: Option<i64>,
}

/// Response for a channel
#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelResponse {
    pub id: i64,
    pub youtube_id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub subscriber_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            youtube_id: channel.youtube_id,
            title: channel.title,
            description: channel.description,
            owner_id: channel.owner_id,
            subscriber_count: channel.subscriber_count,
            created_at: channel.created_at.to_rfc3339(),
            updated_at: channel.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a channel listing
#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Build the channels router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_channels).post(create_channel))
        .route(
            "/{id}",
            get(get_channel).put(update_channel).delete(delete_channel),
        )
        .route("/{id}/videos", get(list_channel_videos))
}

fn map_error(e: ChannelServiceError) -> ApiError {
    match e {
        ChannelServiceError::NotFound => ApiError::not_found("Channel not found"),
        ChannelServiceError::Forbidden => ApiError::forbidden("Not allowed to modify this channel"),
        ChannelServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        ChannelServiceError::AlreadyExists(id) => {
            ApiError::conflict(format!("Channel already registered: {}", id))
        }
        ChannelServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/channels - List channels
#[utoipa::path(
    get,
    path = "/api/v1/channels",
    params(PageQuery),
    responses(
        (status = 200, description = "Channel listing", body = ChannelListResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn list_channels(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ChannelListResponse>, ApiError> {
    let params = query.params();
    let (channels, total) = state
        .channel_service
        .list(&params)
        .await
        .map_err(map_error)?;

    Ok(Json(ChannelListResponse {
        channels: channels.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}

/// POST /api/v1/channels - Register a channel
#[utoipa::path(
    post,
    path = "/api/v1/channels",
    request_body = CreateChannelRequest,
    responses(
        (status = 201, description = "Channel registered", body = ChannelResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 409, description = "Channel already registered", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn create_channel(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = state
        .channel_service
        .create(
            &user.0,
            CreateChannelInput {
                youtube_id: body.youtube_id,
                title: body.title,
                description: body.description,
                subscriber_count: body.subscriber_count,
            },
        )
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(ChannelResponse::from(channel))))
}

/// GET /api/v1/channels/{id} - Get a channel
#[utoipa::path(
    get,
    path = "/api/v1/channels/{id}",
    params(("id" = i64, Path, description = "Channel ID")),
    responses(
        (status = 200, description = "Channel", body = ChannelResponse),
        (status = 404, description = "Channel not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn get_channel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ChannelResponse>, ApiError> {
    let channel = state.channel_service.get(id).await.map_err(map_error)?;
    Ok(Json(channel.into()))
}

/// PUT /api/v1/channels/{id} - Update a channel (owner or admin)
#[utoipa::path(
    put,
    path = "/api/v1/channels/{id}",
    params(("id" = i64, Path, description = "Channel ID")),
    request_body = UpdateChannelRequest,
    responses(
        (status = 200, description = "Updated channel", body = ChannelResponse),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Channel not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn update_channel(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateChannelRequest>,
) -> Result<Json<ChannelResponse>, ApiError> {
    let channel = state
        .channel_service
        .update(
            &user.0,
            id,
            UpdateChannelInput {
                title: body.title,
                description: body.description,
                subscriber_count: body.subscriber_count,
            },
        )
        .await
        .map_err(map_error)?;

    Ok(Json(channel.into()))
}

/// DELETE /api/v1/channels/{id} - Delete a channel (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/channels/{id}",
    params(("id" = i64, Path, description = "Channel ID")),
    responses(
        (status = 204, description = "Channel deleted"),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Channel not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn delete_channel(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .channel_service
        .delete(&user.0, id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/channels/{id}/videos - List the channel's videos
#[utoipa::path(
    get,
    path = "/api/v1/channels/{id}/videos",
    params(("id" = i64, Path, description = "Channel ID"), PageQuery),
    responses(
        (status = 200, description = "Video listing", body = crate::api::videos::VideoListResponse),
        (status = 404, description = "Channel not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "channels"
)]
pub async fn list_channel_videos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<crate::api::videos::VideoListResponse>, ApiError> {
    // Surface 404 for unknown channels rather than an empty list
    state.channel_service.get(id).await.map_err(map_error)?;

    let params = query.params();
    let filter = VideoFilter {
        channel_id: Some(id),
        category_id: None,
    };
    let (videos, total) = state
        .video_service
        .list(&filter, &params)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(crate::api::videos::VideoListResponse {
        videos: videos.into_iter().map(VideoResponse::from).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}
