//! Authentication API endpoints
//!
//! Handles HTTP requests for accounts and login:
//! - POST /api/v1/auth/register - User registration
//! - POST /api/v1/auth/login - Login, returns a bearer token
//! - GET /api/v1/auth/me - Current user
//! - PUT /api/v1/auth/password - Change password
//! - GET /api/v1/auth/oauth/google - Google authorization URL
//! - POST /api/v1/auth/oauth/google/callback - Complete OAuth login

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::User;
use crate::services::{LoginInput, OauthServiceError, RegisterInput, UserServiceError};

/// Request body for user registration
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for user login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Request body for changing the password
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for the OAuth callback
#[derive(Debug, Deserialize, ToSchema)]
pub struct OauthCallbackRequest {
    pub code: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Response for user info
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            status: user.status.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response carrying the provider authorization URL
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorizeUrlResponse {
    pub url: String,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/oauth/google", get(google_authorize_url))
        .route("/oauth/google/callback", post(google_callback))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/password", put(change_password))
}

fn map_user_error(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        UserServiceError::UserExists(msg) => ApiError::conflict(msg),
        UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        UserServiceError::NotFound => ApiError::not_found("User not found"),
        UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

fn map_oauth_error(e: OauthServiceError) -> ApiError {
    match e {
        OauthServiceError::Disabled => {
            ApiError::service_unavailable("OAuth login is not configured")
        }
        OauthServiceError::ExchangeFailed(msg) => ApiError::unauthorized(msg),
        OauthServiceError::NoVerifiedEmail => {
            ApiError::validation_error("OAuth account has no verified email")
        }
        OauthServiceError::Suspended => ApiError::forbidden("Account is suspended"),
        OauthServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// POST /api/v1/auth/register - User registration
///
/// The first registered user becomes the admin.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created and logged in", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 409, description = "Username or email taken", body = ApiError),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let input = RegisterInput::new(body.username, body.email, body.password);

    let user = state
        .user_service
        .register(input)
        .await
        .map_err(map_user_error)?;

    // Log the fresh account in right away
    let (user, token) = state
        .user_service
        .login(LoginInput::new(user.username.clone(), password))
        .await
        .map_err(map_user_error)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /api/v1/auth/login - Login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = state
        .user_service
        .login(LoginInput::new(body.username_or_email, body.password))
        .await
        .map_err(map_user_error)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// GET /api/v1/auth/me - Current user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_id(user.0.user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

/// PUT /api/v1/auth/password - Change the current user's password
#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .user_service
        .change_password(user.0.user_id, &body.current_password, &body.new_password)
        .await
        .map_err(map_user_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/oauth/google - Google authorization URL
#[utoipa::path(
    get,
    path = "/api/v1/auth/oauth/google",
    responses(
        (status = 200, description = "Authorization URL", body = AuthorizeUrlResponse),
        (status = 503, description = "OAuth not configured", body = ApiError),
    ),
    tag = "auth"
)]
pub async fn google_authorize_url(
    State(state): State<AppState>,
) -> Result<Json<AuthorizeUrlResponse>, ApiError> {
    let url = state
        .oauth_service
        .authorize_url(&uuid::Uuid::new_v4().to_string())
        .map_err(map_oauth_error)?;

    Ok(Json(AuthorizeUrlResponse { url }))
}

/// POST /api/v1/auth/oauth/google/callback - Complete OAuth login
#[utoipa::path(
    post,
    path = "/api/v1/auth/oauth/google/callback",
    request_body = OauthCallbackRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Code exchange rejected", body = ApiError),
        (status = 503, description = "OAuth not configured", body = ApiError),
    ),
    tag = "auth"
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Json(body): Json<OauthCallbackRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = state
        .oauth_service
        .login_with_code(&body.code)
        .await
        .map_err(map_oauth_error)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}
