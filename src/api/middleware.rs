//! API middleware
//!
//! Contains middleware for:
//! - Authentication (bearer token validation)
//! - Authorization (role checking)
//!
//! The authenticated identity is attached to request extensions before
//! any handler runs; handlers receive it through the
//! `AuthenticatedUser` extractor.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::JwtConfig;
use crate::models::UserRole;
use crate::services::token::{self, AccessClaims, TokenError};
use crate::services::{
    CampaignService, CategoryService, ChannelService, OauthService, RevenueService, TaskService,
    UserService, VideoService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtConfig,
    pub user_service: Arc<UserService>,
    pub oauth_service: Arc<OauthService>,
    pub channel_service: Arc<ChannelService>,
    pub video_service: Arc<VideoService>,
    pub category_service: Arc<CategoryService>,
    pub campaign_service: Arc<CampaignService>,
    pub revenue_service: Arc<RevenueService>,
    pub task_service: Arc<TaskService>,
}

/// Authenticated identity extracted from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AccessClaims);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new("SERVICE_UNAVAILABLE", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            "SERVICE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Authentication middleware: verifies the bearer token and attaches
/// the identity it carries. Rejects with 401 before any handler runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let claims = token::verify_token(&state.jwt, token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthorized("Token expired"),
        _ => ApiError::unauthorized("Invalid token"),
    })?;

    request.extensions_mut().insert(AuthenticatedUser(claims));
    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if user.0.role != UserRole::Admin {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Manager (or admin) authorization middleware
pub async fn require_manager(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !matches!(user.0.role, UserRole::Admin | UserRole::Manager) {
        return Err(ApiError::forbidden("Manager privileges required"));
    }

    Ok(next.run(request).await)
}

// Extractor for AuthenticatedUser from request extensions
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
