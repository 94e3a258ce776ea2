//! Task API endpoints
//!
//! Handles HTTP requests for internal work items and their comments:
//! - GET /api/v1/tasks - List tasks (filter by status/assignee)
//! - POST /api/v1/tasks - Create a task
//! - GET /api/v1/tasks/{id} - Get a task
//! - PUT /api/v1/tasks/{id} - Update a task
//! - DELETE /api/v1/tasks/{id} - Delete a task (creator or admin)
//! - GET /api/v1/tasks/{id}/comments - List comments
//! - POST /api/v1/tasks/{id}/comments - Add a comment
//! - DELETE /api/v1/tasks/{id}/comments/{comment_id} - Delete a comment

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::TaskFilter;
use crate::models::{
    CreateTaskInput, ListParams, Task, TaskComment, TaskPriority, TaskStatus, UpdateTaskInput,
};
use crate::services::TaskServiceError;

/// Query parameters for task listings
#[derive(Debug, Deserialize, IntoParams)]
pub struct TaskListQuery {
    /// Filter by status (open, in_progress, review, done)
    pub status: Option<String>,
    /// Filter by assignee user ID
    pub assignee_id: Option<i64>,
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

/// Request body for creating a task
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

/// Request body for updating a task.
///
/// `assignee_id` and `due_date` use a double option: omitted leaves the
/// field alone, null clears it, a value sets it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub assignee_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an omitted field (outer None) from an explicit null
/// (inner None) in PATCH-style bodies.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Request body for adding a comment
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Response for a task
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub creator_id: i64,
    pub assignee_id: Option<i64>,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status.to_string(),
            priority: task.priority.to_string(),
            creator_id: task.creator_id,
            assignee_id: task.assignee_id,
            due_date: task.due_date.map(|d| d.to_string()),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a task listing
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Response for a task comment
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub task_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: String,
}

impl From<TaskComment> for CommentResponse {
    fn from(comment: TaskComment) -> Self {
        Self {
            id: comment.id,
            task_id: comment.task_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Response for a comment listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
}

/// Build the tasks router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/{id}/comments", get(list_comments).post(create_comment))
        .route(
            "/{id}/comments/{comment_id}",
            axum::routing::delete(delete_comment),
        )
}

fn map_error(e: TaskServiceError) -> ApiError {
    match e {
        TaskServiceError::NotFound => ApiError::not_found("Task not found"),
        TaskServiceError::CommentNotFound => ApiError::not_found("Comment not found"),
        TaskServiceError::AssigneeNotFound => ApiError::not_found("Assignee not found"),
        TaskServiceError::Forbidden => ApiError::forbidden("Not allowed"),
        TaskServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        TaskServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/tasks - List tasks
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Task listing", body = TaskListResponse),
        (status = 400, description = "Invalid filter", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let status = query
        .status
        .map(|s| TaskStatus::from_str(&s))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let filter = TaskFilter {
        status,
        assignee_id: query.assignee_id,
    };
    let params = ListParams::new(query.page, query.per_page);

    let (tasks, total) = state
        .task_service
        .list(&filter, &params)
        .await
        .map_err(map_error)?;

    Ok(Json(TaskListResponse {
        tasks: tasks.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}

/// POST /api/v1/tasks - Create a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Assignee not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let priority = body
        .priority
        .map(|p| TaskPriority::from_str(&p))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let task = state
        .task_service
        .create(
            &user.0,
            CreateTaskInput {
                title: body.title,
                description: body.description,
                priority,
                assignee_id: body.assignee_id,
                due_date: body.due_date,
            },
        )
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// GET /api/v1/tasks/{id} - Get a task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.task_service.get(id).await.map_err(map_error)?;
    Ok(Json(task.into()))
}

/// PUT /api/v1/tasks/{id} - Update a task
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 404, description = "Task or assignee not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let status = body
        .status
        .map(|s| TaskStatus::from_str(&s))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let priority = body
        .priority
        .map(|p| TaskPriority::from_str(&p))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let task = state
        .task_service
        .update(
            id,
            UpdateTaskInput {
                title: body.title,
                description: body.description,
                status,
                priority,
                assignee_id: body.assignee_id,
                due_date: body.due_date,
            },
        )
        .await
        .map_err(map_error)?;

    Ok(Json(task.into()))
}

/// DELETE /api/v1/tasks/{id} - Delete a task (creator or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Not the creator", body = ApiError),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .task_service
        .delete(&user.0, id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/tasks/{id}/comments - List a task's comments
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}/comments",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = CommentListResponse),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = state
        .task_service
        .list_comments(id)
        .await
        .map_err(map_error)?;

    Ok(Json(CommentListResponse {
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/tasks/{id}/comments - Add a comment
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/comments",
    params(("id" = i64, Path, description = "Task ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Empty comment", body = ApiError),
        (status = 404, description = "Task not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .task_service
        .add_comment(&user.0, id, &body.content)
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// DELETE /api/v1/tasks/{id}/comments/{comment_id} - Delete a comment
/// (author or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}/comments/{comment_id}",
    params(
        ("id" = i64, Path, description = "Task ID"),
        ("comment_id" = i64, Path, description = "Comment ID"),
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Not the author", body = ApiError),
        (status = 404, description = "Comment not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((task_id, comment_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .task_service
        .delete_comment(&user.0, task_id, comment_id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}
