//! Revenue API endpoints
//!
//! Handles HTTP requests for a campaign's revenue entries, nested under
//! the campaign resource:
//! - GET /api/v1/campaigns/{campaign_id}/revenues - List entries
//! - POST /api/v1/campaigns/{campaign_id}/revenues - Record an entry (manager)
//! - DELETE /api/v1/campaigns/{campaign_id}/revenues/{revenue_id} - Delete (manager)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateRevenueInput, RevenueEntry};
use crate::services::RevenueServiceError;

/// Query parameters for bounding the listing by date
#[derive(Debug, Deserialize, IntoParams)]
pub struct RevenueListQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Request body for recording revenue
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRevenueRequest {
    pub entry_date: NaiveDate,
    pub amount_micros: i64,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
}

/// Response for a revenue entry
#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueResponse {
    pub id: i64,
    pub campaign_id: i64,
    pub entry_date: String,
    pub amount_micros: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub created_at: String,
}

impl From<RevenueEntry> for RevenueResponse {
    fn from(entry: RevenueEntry) -> Self {
        Self {
            id: entry.id,
            campaign_id: entry.campaign_id,
            entry_date: entry.entry_date.to_string(),
            amount_micros: entry.amount_micros,
            impressions: entry.impressions,
            clicks: entry.clicks,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// Response for a revenue listing
#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueListResponse {
    pub entries: Vec<RevenueResponse>,
}

/// Build the read-only revenues router (nested under /campaigns; the
/// first segment is named {id} to line up with the campaign routes)
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/revenues", get(list_revenues))
}

/// Build the manager-only revenue mutation router (nested under /campaigns)
pub fn manager_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/revenues", post(create_revenue))
        .route("/{id}/revenues/{revenue_id}", delete(delete_revenue))
}

fn map_error(e: RevenueServiceError) -> ApiError {
    match e {
        RevenueServiceError::NotFound => ApiError::not_found("Revenue entry not found"),
        RevenueServiceError::CampaignNotFound => ApiError::not_found("Campaign not found"),
        RevenueServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        RevenueServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/campaigns/{campaign_id}/revenues - List revenue entries
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{campaign_id}/revenues",
    params(("campaign_id" = i64, Path, description = "Campaign ID"), RevenueListQuery),
    responses(
        (status = 200, description = "Revenue entries", body = RevenueListResponse),
        (status = 404, description = "Campaign not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "revenues"
)]
pub async fn list_revenues(
    State(state): State<AppState>,
    Path(campaign_id): Path<i64>,
    Query(query): Query<RevenueListQuery>,
) -> Result<Json<RevenueListResponse>, ApiError> {
    let entries = state
        .revenue_service
        .list(campaign_id, query.from, query.to)
        .await
        .map_err(map_error)?;

    Ok(Json(RevenueListResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/campaigns/{campaign_id}/revenues - Record revenue (manager)
#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{campaign_id}/revenues",
    params(("campaign_id" = i64, Path, description = "Campaign ID")),
    request_body = CreateRevenueRequest,
    responses(
        (status = 201, description = "Entry recorded", body = RevenueResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 403, description = "Manager privileges required", body = ApiError),
        (status = 404, description = "Campaign not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "revenues"
)]
pub async fn create_revenue(
    State(state): State<AppState>,
    Path(campaign_id): Path<i64>,
    Json(body): Json<CreateRevenueRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .revenue_service
        .record(
            campaign_id,
            CreateRevenueInput {
                entry_date: body.entry_date,
                amount_micros: body.amount_micros,
                impressions: body.impressions,
                clicks: body.clicks,
            },
        )
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(RevenueResponse::from(entry))))
}

/// DELETE /api/v1/campaigns/{campaign_id}/revenues/{revenue_id} - Delete an entry (manager)
#[utoipa::path(
    delete,
    path = "/api/v1/campaigns/{campaign_id}/revenues/{revenue_id}",
    params(
        ("campaign_id" = i64, Path, description = "Campaign ID"),
        ("revenue_id" = i64, Path, description = "Revenue entry ID"),
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Manager privileges required", body = ApiError),
        (status = 404, description = "Entry not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "revenues"
)]
pub async fn delete_revenue(
    State(state): State<AppState>,
    Path((campaign_id, revenue_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .revenue_service
        .delete(campaign_id, revenue_id)
        .await
        .map_err(map_error)?;

    Ok(StatusCode::NO_CONTENT)
}
