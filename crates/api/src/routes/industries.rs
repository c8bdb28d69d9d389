//! Industry reference list routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::industry::{CreateIndustryRequest, Industry};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ValidJson;

/// List industries, alphabetically.
///
/// GET /api/v1/industries
pub async fn list_industries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Industry>>, ApiError> {
    let industries = state
        .industries
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(industries))
}

/// Add an industry.
///
/// POST /api/v1/admin/industries
pub async fn create_industry(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CreateIndustryRequest>,
) -> Result<(StatusCode, Json<Industry>), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Industry name is required".to_string()));
    }

    let industry = state.industries.create(name).await.map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict(format!("Industry {} already exists", name)),
        other => other,
    })?;

    info!(industry_id = %industry.id, name = %industry.name, "Industry created");

    Ok((StatusCode::CREATED, Json(industry.into())))
}

/// Remove an industry. Member profiles keep their stored value.
///
/// DELETE /api/v1/admin/industries/:id
pub async fn delete_industry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.industries.delete(id).await? {
        return Err(ApiError::NotFound("Industry not found".to_string()));
    }

    info!(industry_id = %id, "Industry deleted");

    Ok(StatusCode::NO_CONTENT)
}
