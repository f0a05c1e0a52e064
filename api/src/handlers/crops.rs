//! Crop cycle handlers
//!
//! Endpoints for registering and tracking crop cycles.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::crop_service::{CropDetail, CropRegistration, CropSummary};
use crate::domain::entities::{
    CropCycle, CropCycleId, CropCycleUpdate, CropRecommendation, CycleStatus, Profile,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing crops
#[derive(Debug, Deserialize)]
pub struct ListCropsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetCropQuery {
    #[serde(default)]
    pub include_yield: bool,
}

#[derive(Debug, Serialize)]
pub struct CropListResponse {
    pub crops: Vec<CropSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CropResponse {
    pub message: &'static str,
    pub crop: CropCycle,
}

/// GET /crops
///
/// Crops visible to the caller, newest first.
pub async fn list_crops(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<ListCropsQuery>,
) -> Result<Json<CropListResponse>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<CycleStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let crops = state.crop_service.list(&profile, status).await?;
    Ok(Json(CropListResponse {
        count: crops.len(),
        crops,
    }))
}

/// GET /crops/:id
pub async fn get_crop(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
    Query(query): Query<GetCropQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let crop: CropDetail = state
        .crop_service
        .get(&profile, &CropCycleId(id), query.include_yield)
        .await?;
    Ok(Json(serde_json::json!({ "crop": crop })))
}

/// POST /crops
pub async fn create_crop(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<CropRegistration>,
) -> Result<(StatusCode, Json<CropResponse>), AppError> {
    let crop = state
        .crop_service
        .create(&profile, &req, Utc::now().date_naive())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CropResponse {
            message: "Crop cycle created successfully",
            crop,
        }),
    ))
}

/// PUT /crops/:id
pub async fn update_crop(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(update): Json<CropCycleUpdate>,
) -> Result<Json<CropResponse>, AppError> {
    let crop = state
        .crop_service
        .update(&profile, &CropCycleId(id), &update)
        .await?;

    Ok(Json(CropResponse {
        message: "Crop cycle updated successfully",
        crop,
    }))
}

/// DELETE /crops/:id
pub async fn delete_crop(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.crop_service.delete(&profile, &CropCycleId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /crops/recommendations
///
/// Seasonal crop suggestions for the current month. Each call is persisted.
pub async fn crop_recommendations(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<serde_json::Value>, AppError> {
    let recommendations: Vec<CropRecommendation> = state
        .crop_service
        .recommendations(&profile, Utc::now())
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Crop recommendations generated",
        "recommendations": recommendations,
    })))
}
