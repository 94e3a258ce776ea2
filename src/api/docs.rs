//! OpenAPI documentation
//!
//! The OpenAPI document is served at /api/openapi.json and the RapiDoc
//! UI at the application root. Both are reachable without a token.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::middleware::{ApiError, ApiErrorDetail};
use crate::api::{admin, auth, campaigns, categories, channels, revenues, tasks, videos};

/// Registers the bearer security scheme referenced by the handlers
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TubeDesk API",
        description = "Management backend for YouTube channels, videos, ad campaigns, revenue tracking and team workflows. All endpoints are versioned under /api/v1/ and, except for registration, login and OAuth, require a bearer token."
    ),
    paths(
        // Auth
        auth::register,
        auth::login,
        auth::get_current_user,
        auth::change_password,
        auth::google_authorize_url,
        auth::google_callback,
        // Channels
        channels::list_channels,
        channels::create_channel,
        channels::get_channel,
        channels::update_channel,
        channels::delete_channel,
        channels::list_channel_videos,
        // Videos
        videos::list_videos,
        videos::create_video,
        videos::get_video,
        videos::update_video,
        videos::delete_video,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Campaigns
        campaigns::list_campaigns,
        campaigns::get_campaign,
        campaigns::get_campaign_summary,
        campaigns::create_campaign,
        campaigns::update_campaign,
        campaigns::delete_campaign,
        // Revenues
        revenues::list_revenues,
        revenues::create_revenue,
        revenues::delete_revenue,
        // Tasks
        tasks::list_tasks,
        tasks::create_task,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::list_comments,
        tasks::create_comment,
        tasks::delete_comment,
        // Admin
        admin::list_users,
        admin::update_user,
        admin::delete_user,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::ChangePasswordRequest,
            auth::OauthCallbackRequest,
            auth::AuthResponse,
            auth::UserResponse,
            auth::AuthorizeUrlResponse,
            channels::CreateChannelRequest,
            channels::UpdateChannelRequest,
            channels::ChannelResponse,
            channels::ChannelListResponse,
            videos::CreateVideoRequest,
            videos::UpdateVideoRequest,
            videos::VideoResponse,
            videos::VideoListResponse,
            categories::CreateCategoryRequest,
            categories::UpdateCategoryRequest,
            categories::CategoryResponse,
            categories::CategoryListResponse,
            campaigns::CreateCampaignRequest,
            campaigns::UpdateCampaignRequest,
            campaigns::CampaignResponse,
            campaigns::CampaignListResponse,
            campaigns::RevenueSummaryResponse,
            revenues::CreateRevenueRequest,
            revenues::RevenueResponse,
            revenues::RevenueListResponse,
            tasks::CreateTaskRequest,
            tasks::UpdateTaskRequest,
            tasks::CreateCommentRequest,
            tasks::TaskResponse,
            tasks::TaskListResponse,
            tasks::CommentResponse,
            tasks::CommentListResponse,
            admin::AdminUpdateUserRequest,
            admin::UserListResponse,
            ApiError,
            ApiErrorDetail,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and OAuth"),
        (name = "channels", description = "Tracked YouTube channels"),
        (name = "videos", description = "Videos within tracked channels"),
        (name = "categories", description = "Video classification taxonomy"),
        (name = "campaigns", description = "AdSense campaigns"),
        (name = "revenues", description = "Daily ad revenue entries"),
        (name = "tasks", description = "Internal work items and comments"),
        (name = "admin", description = "User administration"),
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI spec
pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
