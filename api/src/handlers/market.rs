//! Market price handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::app::market_service::{PriceForecast, PriceListing, UpsertResult};
use crate::domain::entities::{CropType, NewMarketPrice, Profile};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing prices
#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    pub crop_type: Option<String>,
    pub state: Option<String>,
    #[serde(default = "default_price_days")]
    pub days: u32,
    #[serde(default)]
    pub trend: bool,
}

fn default_price_days() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
pub struct PredictionsQuery {
    pub crop_type: Option<String>,
    #[serde(default = "default_forecast_days")]
    pub days: u32,
}

fn default_forecast_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
pub struct UpsertPricesRequest {
    pub market_data: Vec<NewMarketPrice>,
}

#[derive(Debug, Serialize)]
pub struct UpsertPricesResponse {
    pub message: &'static str,
    pub results: Vec<UpsertResult>,
}

fn parse_crop_type(raw: &str) -> Result<CropType, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

/// GET /market/prices
pub async fn list_prices(
    State(state): State<AppState>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<PriceListing>, AppError> {
    let crop_type = query.crop_type.as_deref().map(parse_crop_type).transpose()?;

    let listing = state
        .market_service
        .list(crop_type, query.state, query.days, query.trend)
        .await?;
    Ok(Json(listing))
}

/// POST /market/prices
pub async fn upsert_prices(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<UpsertPricesRequest>,
) -> Result<Json<UpsertPricesResponse>, AppError> {
    let results = state
        .market_service
        .upsert_many(&profile, &req.market_data)
        .await?;

    Ok(Json(UpsertPricesResponse {
        message: "Market data update completed",
        results,
    }))
}

/// GET /market/predictions
pub async fn predict_prices(
    State(state): State<AppState>,
    Query(query): Query<PredictionsQuery>,
) -> Result<Json<PriceForecast>, AppError> {
    let crop_type = query
        .crop_type
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Crop type required".to_string()))
        .and_then(parse_crop_type)?;

    let forecast = state
        .market_service
        .predict(crop_type, query.days, Utc::now().date_naive())
        .await?;
    Ok(Json(forecast))
}
