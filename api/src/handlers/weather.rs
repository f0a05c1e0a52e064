//! Weather handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::app::access::require_role;
use crate::app::weather_service::{RefreshResult, WeatherLookup};
use crate::domain::entities::{GeoPoint, Profile, Role};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for a weather lookup
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl WeatherQuery {
    fn location(&self) -> Result<GeoPoint, AppError> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return Err(AppError::BadRequest(
                "Latitude and longitude are required".to_string(),
            ));
        };
        let location = GeoPoint::new(lat, lng);
        if !location.is_valid() {
            return Err(AppError::BadRequest(format!(
                "Coordinates out of range: {}, {}",
                lat, lng
            )));
        }
        Ok(location)
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub locations: Vec<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: &'static str,
    pub results: Vec<RefreshResult>,
}

/// GET /weather
///
/// Public. Serves the cached row while fresh, otherwise fetches and stores
/// a new one.
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherLookup>, AppError> {
    let location = query.location()?;
    let now = Utc::now();
    let date = query.date.unwrap_or_else(|| now.date_naive());

    let lookup = state.weather_service.get(location, date, now).await?;
    Ok(Json(lookup))
}

/// POST /weather
///
/// Admin-only refresh of today's row for each location.
pub async fn refresh_weather(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    require_role(&profile, Role::Admin)?;

    let now = Utc::now();
    let results = state
        .weather_service
        .refresh_many(&req.locations, now.date_naive(), now)
        .await;

    Ok(Json(RefreshResponse {
        message: "Weather update completed",
        results,
    }))
}
