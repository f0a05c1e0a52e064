//! Yield prediction handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::{CropCycleId, Profile, YieldPredictionId, YieldPredictionUpdate};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct YieldQuery {
    pub crop_cycle_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePredictionRequest {
    pub crop_cycle_id: Option<Uuid>,
}

/// GET /yield-predictions
///
/// Latest prediction for one crop with `?crop_cycle_id=`, otherwise every
/// prediction in scope.
pub async fn get_predictions(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<YieldQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(crop_id) = query.crop_cycle_id {
        let prediction = state
            .yield_service
            .latest_for_crop(&profile, &CropCycleId(crop_id))
            .await?;
        return Ok(Json(serde_json::json!({ "prediction": prediction })));
    }

    let predictions = state.yield_service.list(&profile).await?;
    Ok(Json(serde_json::json!({
        "count": predictions.len(),
        "predictions": predictions,
    })))
}

/// POST /yield-predictions
pub async fn create_prediction(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<CreatePredictionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let crop_id = req
        .crop_cycle_id
        .ok_or_else(|| AppError::BadRequest("Crop cycle ID required".to_string()))?;

    let prediction = state
        .yield_service
        .create(&profile, &CropCycleId(crop_id), Utc::now().date_naive())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Yield prediction created successfully",
            "prediction": prediction,
        })),
    ))
}

/// PUT /yield-predictions/:id
pub async fn update_prediction(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(update): Json<YieldPredictionUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let prediction = state
        .yield_service
        .update(&profile, &YieldPredictionId(id), &update)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Yield prediction updated successfully",
        "prediction": prediction,
    })))
}
