//! Campaign API endpoints
//!
//! Handles HTTP requests for AdSense campaigns:
//! - GET /api/v1/campaigns - List campaigns
//! - GET /api/v1/campaigns/{id} - Get a campaign
//! - GET /api/v1/campaigns/{id}/summary - Revenue summary
//! - POST /api/v1/campaigns - Create a campaign (manager)
//! - PUT /api/v1/campaigns/{id} - Update a campaign (manager)
//! - DELETE /api/v1/campaigns/{id} - Delete a campaign (manager)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::api::channels::PageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    Campaign, CampaignStatus, CreateCampaignInput, RevenueSummary, UpdateCampaignInput,
};
use crate::services::{CampaignServiceError, RevenueServiceError};

/// Request body for creating a campaign
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub advertiser: String,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub budget_micros: Option<i64>,
}

/// Request body for updating a campaign.
///
/// `ends_on` uses a double option: omitted leaves the end date alone,
/// null clears it, a date sets it.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub advertiser: Option<String>,
    pub status: Option<String>,
    pub starts_on: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub ends_on: Option<Option<NaiveDate>>,
    pub budget_micros: Option<i64>,
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

/// Response for a campaign
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignResponse {
    pub id: i64,
    pub name: String,
    pub advertiser: String,
    pub status: String,
    pub starts_on: String,
    pub ends_on: Option<String>,
    pub budget_micros: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name,
            advertiser: campaign.advertiser,
            status: campaign.status.to_string(),
            starts_on: campaign.starts_on.to_string(),
            ends_on: campaign.ends_on.map(|d| d.to_string()),
            budget_micros: campaign.budget_micros,
            created_at: campaign.created_at.to_rfc3339(),
            updated_at: campaign.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a campaign listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Response for a campaign revenue summary
#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueSummaryResponse {
    pub campaign_id: i64,
    pub entry_count: i64,
    pub total_amount_micros: i64,
    pub total_impressions: i64,
    pub total_clicks: i64,
    /// Earnings per thousand impressions, in currency units
    pub ecpm: f64,
    /// Click-through rate as a fraction
    pub ctr: f64,
}

impl From<RevenueSummary> for RevenueSummaryResponse {
    fn from(summary: RevenueSummary) -> Self {
        let ecpm = summary.ecpm();
        let ctr = summary.ctr();
        Self {
            campaign_id: summary.campaign_id,
            entry_count: summary.entry_count,
            total_amount_micros: summary.total_amount_micros,
            total_impressions: summary.total_impressions,
            total_clicks: summary.total_clicks,
            ecpm,
            ctr,
        }
    }
}

/// Build the read-only campaigns router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_campaigns))
        .route("/{id}", get(get_campaign))
        .route("/{id}/summary", get(get_campaign_summary))
}

/// Build the manager-only campaign mutation router
pub fn manager_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_campaign))
        .route("/{id}", put(update_campaign).delete(delete_campaign))
}

fn map_error(e: CampaignServiceError) -> ApiError {
    match e {
        CampaignServiceError::NotFound => ApiError::not_found("Campaign not found"),
        CampaignServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CampaignServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

fn map_revenue_error(e: RevenueServiceError) -> ApiError {
    match e {
        RevenueServiceError::NotFound => ApiError::not_found("Revenue entry not found"),
        RevenueServiceError::CampaignNotFound => ApiError::not_found("Campaign not found"),
        RevenueServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        RevenueServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// GET /api/v1/campaigns - List campaigns
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    params(PageQuery),
    responses(
        (status = 200, description = "Campaign listing", body = CampaignListResponse),
        (status = 401, description = "Not authenticated", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "campaigns"
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CampaignListResponse>, ApiError> {
    let params = query.params();
    let (campaigns, total) = state
        .campaign_service
        .list(&params)
        .await
        .map_err(map_error)?;

    Ok(Json(CampaignListResponse {
        campaigns: campaigns.into_iter().map(Into::into).collect(),
        total,
        page: params.page,
        per_page: params.per_page,
    }))
}

/// GET /api/v1/campaigns/{id} - Get a campaign
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}",
    params(("id" = i64, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign", body = CampaignResponse),
        (status = 404, description = "Campaign not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "campaigns"
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let campaign = state.campaign_service.get(id).await.map_err(map_error)?;
    Ok(Json(campaign.into()))
}

/// GET /api/v1/campaigns/{id}/summary - Revenue summary for a campaign
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}/summary",
    params(("id" = i64, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Revenue summary", body = RevenueSummaryResponse),
        (status = 404, description = "Campaign not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "campaigns"
)]
pub async fn get_campaign_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RevenueSummaryResponse>, ApiError> {
    let summary = state
        .revenue_service
        .summarize(id)
        .await
        .map_err(map_revenue_error)?;

    Ok(Json(summary.into()))
}

/// POST /api/v1/campaigns - Create a campaign (manager)
#[utoipa::path(
    post,
    path = "/api/v1/campaigns",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created", body = CampaignResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 403, description = "Manager privileges required", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "campaigns"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let campaign = state
        .campaign_service
        .create(CreateCampaignInput {
            name: body.name,
            advertiser: body.advertiser,
            starts_on: body.starts_on,
            ends_on: body.ends_on,
            budget_micros: body.budget_micros,
        })
        .await
        .map_err(map_error)?;

    Ok((StatusCode::CREATED, Json(CampaignResponse::from(campaign))))
}

/// PUT /api/v1/campaigns/{id} - Update a campaign (manager)
#[utoipa::path(
    put,
    path = "/api/v1/campaigns/{id}",
    params(("id" = i64, Path, description = "Campaign ID")),
    request_body = UpdateCampaignRequest,
    responses(
        (status = 200, description = "Updated campaign", body = CampaignResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 403, description = "Manager privileges required", body = ApiError),
        (status = 404, description = "Campaign not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "campaigns"
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCampaignRequest>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let status = body
        .status
        .map(|s| CampaignStatus::from_str(&s))
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;

    let campaign = state
        .campaign_service
        .update(
            id,
            UpdateCampaignInput {
                name: body.name,
                advertiser: body.advertiser,
                status,
                starts_on: body.starts_on,
                ends_on: body.ends_on,
                budget_micros: body.budget_micros,
            },
        )
        .await
        .map_err(map_error)?;

    Ok(Json(campaign.into()))
}

/// DELETE /api/v1/campaigns/{id} - Delete a campaign (manager)
#[utoipa::path(
    delete,
    path = "/api/v1/campaigns/{id}",
    params(("id" = i64, Path, description = "Campaign ID")),
    responses(
        (status = 204, description = "Campaign deleted"),
        (status = 403, description = "Manager privileges required", body = ApiError),
        (status = 404, description = "Campaign not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "campaigns"
)]
pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.campaign_service.delete(id).await.map_err(map_error)?;
    Ok(StatusCode::NO_CONTENT)
}
