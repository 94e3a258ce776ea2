//! Admin API endpoints
//!
//! User administration, gated behind the admin role:
//! - GET /api/v1/admin/users - List users
//! - PUT /api/v1/admin/users/{id} - Update role/status/credentials
//! - DELETE /api/v1/admin/users/{id} - Delete a user

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::api::auth::UserResponse;
use crate::api::channels::PageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{UpdateUserInput, UserRole, UserStatus};
use crate::services::UserServiceError;

/// Request body for an admin user update
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Role (admin, manager, member)
    pub role: Option<String>,
    /// Status (active, suspended)
    pub status: Option<String>,
}

/// Response for a user listing
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Build the admin router (mounted behind require_admin)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

fn map_error(e: UserServiceError) -> ApiError {
    match e {
        UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        UserServiceError::UserExists(msg) => ApiError::conflict(msg),
        UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        UserServiceError::NotFound => ApiError::not_found("User not found"),
        UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/admin/users - List users (admin)
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(PageQuery),
    responses(
        (status = 200, description = "User listing", body = UserListResponse),
        (status = 403, description = "Admin privileges required", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let params = query.params();
    let (users, total) = state.user_service.list(&params).await.map_err(map_error)?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}

/// PUT /api/v1/admin/users/{id} - Update a user (admin)
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let role = body
        .role
        .map(|r| UserRole::from_str(&r))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let status = body
        .status
        .map(|s| UserStatus::from_str(&s))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let user = state
        .user_service
        .admin_update(
            id,
            UpdateUserInput {
                username: body.username,
                email: body.email,
                password: body.password,
                role,
                status,
            },
        )
        .await
        .map_err(map_error)?;

    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id} - Delete a user (admin)
///
/// The last remaining admin cannot be removed.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete the last admin", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.user_service.admin_delete(id).await.map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}
