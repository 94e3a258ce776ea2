//! Video category API endpoints
//!
//! Handles HTTP requests for the video taxonomy:
//! - GET /api/v1/categories - List categories
//! - GET /api/v1/categories/{id} - Get a category
//! - POST /api/v1/categories - Create a category (admin)
//! - PUT /api/v1/categories/{id} - Update a category (admin)
//! - DELETE /api/v1/categories/{id} - Delete a category (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateCategoryInput, UpdateCategoryInput, VideoCategory};
use crate::services::CategoryServiceError;

/// Request body for creating a category
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Request body for updating a category
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Response for a category
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<VideoCategory> for CategoryResponse {
    fn from(category: VideoCategory) -> Self {
        Self {
            id: category.id,
            slug: category.slug,
            name: category.name,
            description: category.description,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Response for a category listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryResponse>,
}

/// Build the read-only categories router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}", get(get_category))
}

/// Build the admin-only category mutation router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/{id}", put(update_category).delete(delete_category))
}

fn map_error(e: CategoryServiceError) -> ApiError {
    match e {
        CategoryServiceError::NotFound => ApiError::not_found("Category not found"),
        CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CategoryServiceError::InUse(count) => {
            ApiError::conflict(format!("Category is in use by {} video(s)", count))
        }
        CategoryServiceError::AlreadyExists(slug) => {
            ApiError::conflict(format!("Category already exists: {}", slug))
        }
        CategoryServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/categories - List categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Category listing", body = CategoryListResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state.category_service.list().await.map_err(map_error)?;

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/categories/{id} - Get a category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Category not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state.category_service.get(id).await.map_err(map_error)?;
    Ok(Json(category.into()))
}

/// POST /api/v1/categories - Create a category (admin)
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 403, description = "Admin privileges required", body = ApiError),
        (status = 409, description = "Slug already exists", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .category_service
        .create(CreateCategoryInput {
            name: body.name,
            slug: body.slug,
            description: body.description,
        })
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// PUT /api/v1/categories/{id} - Update a category (admin)
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 403, description = "Admin privileges required", body = ApiError),
        (status = 404, description = "Category not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state
        .category_service
        .update(
            id,
            UpdateCategoryInput {
                name: body.name,
                description: body.description,
            },
        )
        .await
        .map_err(map_error)?;

    Ok(Json(category.into()))
}

/// DELETE /api/v1/categories/{id} - Delete a category (admin)
///
/// Refused while videos still reference the category.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Admin privileges required", body = ApiError),
        (status = 404, description = "Category not found", body = ApiError),
        (status = 409, description = "Category still in use", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.category_service.delete(id).await.map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}
