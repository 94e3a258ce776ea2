//! Video API endpoints
//!
//! Handles HTTP requests for tracked videos:
//! - GET /api/v1/videos - List videos (filter by channel/category)
//! - POST /api/v1/videos - Register a video
//! - GET /api/v1/videos/{id} - Get a video
//! - PUT /api/v1/videos/{id} - Update a video
//! - DELETE /api/v1/videos/{id} - Delete a video

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CreateVideoInput, ListParams, UpdateVideoInput, Video, VideoFilter};
use crate::services::VideoServiceError;

/// Query parameters for video listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct VideoListQuery {
    pub channel_id: Option<i64>,
    pub category_id: Option<i64>,
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

/// Request body for registering a video
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub youtube_id: String,
    pub channel_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Request body for updating a video
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub duration_seconds: Option<i64>,
    pub view_count: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Response for a video
#[derive(Debug, Serialize, ToSchema)]
pub struct VideoResponse {
    pub id: i64,
    pub youtube_id: String,
    pub channel_id: i64,
    pub category_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: i64,
    pub view_count: i64,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            youtube_id: video.youtube_id,
            channel_id: video.channel_id,
            category_id: video.category_id,
            title: video.title,
            description: video.description,
            duration_seconds: video.duration_seconds,
            view_count: video.view_count,
            published_at: video.published_at.map(|dt| dt.to_rfc3339()),
            created_at: video.created_at.to_rfc3339(),
            updated_at: video.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a video listing
#[derive(Debug, Serialize, ToSchema)]
pub struct VideoListResponse {
    pub videos: Vec<VideoResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Build the videos router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_videos).post(create_video))
        .route(
            "/{id}",
            get(get_video).put(update_video).delete(delete_video),
        )
}

fn map_error(e: VideoServiceError) -> ApiError {
    match e {
        VideoServiceError::NotFound => ApiError::not_found("Video not found"),
        VideoServiceError::ChannelNotFound => ApiError::not_found("Channel not found"),
        VideoServiceError::CategoryNotFound => ApiError::not_found("Category not found"),
        VideoServiceError::Forbidden => ApiError::forbidden("Not allowed to modify this video"),
        VideoServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        VideoServiceError::AlreadyExists(id) => {
            ApiError::conflict(format!("Video already registered: {}", id))
        }
        VideoServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/videos - List videos
#[utoipa::path(
    get,
    path = "/api/v1/videos",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Video listing", body = VideoListResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let filter = VideoFilter {
        channel_id: query.channel_id,
        category_id: query.category_id,
    };

    let (videos, total) = state
        .video_service
        .list(&filter, &params)
        .await
        .map_err(map_error)?;

    Ok(Json(VideoListResponse {
        videos: videos.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}

/// POST /api/v1/videos - Register a video
#[utoipa::path(
    post,
    path = "/api/v1/videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video registered", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 403, description = "Not the channel owner", body = ApiError),
        (status = 404, description = "Channel or category not found", body = ApiError),
        (status = 409, description = "Video already registered", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn create_video(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let video = state
        .video_service
        .create(
            &user.0,
            CreateVideoInput {
                youtube_id: body.youtube_id,
                channel_id: body.channel_id,
                category_id: body.category_id,
                title: body.title,
                description: body.description,
                duration_seconds: body.duration_seconds,
                published_at: body.published_at,
            },
        )
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(VideoResponse::from(video))))
}

/// GET /api/v1/videos/{id} - Get a video
#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    params(("id" = i64, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video", body = VideoResponse),
        (status = 404, description = "Video not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VideoResponse>, ApiError> {
    let video = state.video_service.get(id).await.map_err(map_error)?;
    Ok(Json(video.into()))
}

/// PUT /api/v1/videos/{id} - Update a video (channel owner or admin)
#[utoipa::path(
    put,
    path = "/api/v1/videos/{id}",
    params(("id" = i64, Path, description = "Video ID")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Updated video", body = VideoResponse),
        (status = 403, description = "Not the channel owner", body = ApiError),
        (status = 404, description = "Video not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn update_video(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateVideoRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    let video = state
        .video_service
        .update(
            &user.0,
            id,
            UpdateVideoInput {
                title: body.title,
                description: body.description,
                category_id: body.category_id,
                duration_seconds: body.duration_seconds,
                view_count: body.view_count,
                published_at: body.published_at,
            },
        )
        .await
        .map_err(map_error)?;

    Ok(Json(video.into()))
}

/// DELETE /api/v1/videos/{id} - Delete a video (channel owner or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/videos/{id}",
    params(("id" = i64, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 403, description = "Not the channel owner", body = ApiError),
        (status = 404, description = "Video not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "videos"
)]
pub async fn delete_video(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .video_service
        .delete(&user.0, id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}
