//! Dashboard handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::app::dashboard_service::{Analytics, AnalyticsMetric, Dashboard, DEFAULT_PERIOD_DAYS};
use crate::domain::entities::Profile;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub metric: Option<String>,
    #[serde(default = "default_period")]
    pub period: i64,
}

fn default_period() -> i64 {
    DEFAULT_PERIOD_DAYS
}

/// GET /dashboard
///
/// Shape depends on the caller's role.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<Dashboard>, AppError> {
    let now = Utc::now();
    let dashboard = state
        .dashboard_service
        .dashboard(&profile, now.date_naive(), now)
        .await?;
    Ok(Json(dashboard))
}

/// GET /dashboard/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Analytics>, AppError> {
    let metric: AnalyticsMetric = query
        .metric
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)?;

    let analytics = state
        .dashboard_service
        .analytics(&profile, metric, query.period, Utc::now())
        .await?;
    Ok(Json(analytics))
}
