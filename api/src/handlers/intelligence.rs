//! Intelligence handlers
//!
//! `GET /intelligence?type=` reads one view; `POST /intelligence` dispatches
//! an `{action, data}` command.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app::intelligence_service::ImpactReport;
use crate::domain::entities::{CropCycleId, GeoPoint, Profile, RiskType};
use crate::error::AppError;
use crate::AppState;

const DEFAULT_AREA_RADIUS_KM: f64 = 10.0;

/// Views served by `GET /intelligence`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntelligenceView {
    RiskPredictions,
    AreaIntelligence,
    DecisionWarnings,
    HarvestTiming,
    SeasonalComparison,
    EconomicImpacts,
}

impl std::str::FromStr for IntelligenceView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "risk_predictions" => Ok(IntelligenceView::RiskPredictions),
            "area_intelligence" => Ok(IntelligenceView::AreaIntelligence),
            "decision_warnings" => Ok(IntelligenceView::DecisionWarnings),
            "harvest_timing" => Ok(IntelligenceView::HarvestTiming),
            "seasonal_comparison" => Ok(IntelligenceView::SeasonalComparison),
            "economic_impacts" => Ok(IntelligenceView::EconomicImpacts),
            _ => Err(format!("Invalid intelligence type: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IntelligenceQuery {
    #[serde(rename = "type")]
    pub view: Option<String>,
    pub crop_cycle_id: Option<Uuid>,
}

impl IntelligenceQuery {
    fn crop_id(&self) -> Result<CropCycleId, AppError> {
        self.crop_cycle_id
            .map(CropCycleId)
            .ok_or_else(|| AppError::BadRequest("Crop cycle ID required".to_string()))
    }
}

/// Raw command body
#[derive(Debug, Deserialize)]
pub struct IntelligenceRequest {
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RiskRequest {
    pub crop_cycle_id: Uuid,
    pub risk_types: Option<Vec<RiskType>>,
}

#[derive(Debug, Deserialize)]
pub struct WarningRequest {
    pub warning_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AreaRequest {
    pub center_lat: f64,
    pub center_lng: f64,
    #[serde(default = "default_radius")]
    pub radius_km: f64,
}

fn default_radius() -> f64 {
    DEFAULT_AREA_RADIUS_KM
}

#[derive(Debug, Deserialize)]
pub struct CropRequest {
    pub crop_cycle_id: Uuid,
}

/// Commands accepted by `POST /intelligence`
#[derive(Debug)]
pub enum IntelligenceAction {
    GenerateRiskPredictions(RiskRequest),
    AcknowledgeWarning(WarningRequest),
    DismissWarning(WarningRequest),
    UpdateAreaIntelligence(AreaRequest),
    GenerateSeasonalComparison(CropRequest),
    RecordEconomicImpact(ImpactReport),
}

impl IntelligenceAction {
    pub fn parse(req: IntelligenceRequest) -> Result<Self, AppError> {
        let action = req.action;
        let data = req.data;

        match action.as_str() {
            "generate_risk_predictions" => {
                payload(&action, data).map(IntelligenceAction::GenerateRiskPredictions)
            }
            "acknowledge_warning" => {
                payload(&action, data).map(IntelligenceAction::AcknowledgeWarning)
            }
            "dismiss_warning" => payload(&action, data).map(IntelligenceAction::DismissWarning),
            "update_area_intelligence" => {
                payload(&action, data).map(IntelligenceAction::UpdateAreaIntelligence)
            }
            "generate_seasonal_comparison" => {
                payload(&action, data).map(IntelligenceAction::GenerateSeasonalComparison)
            }
            "record_economic_impact" => {
                payload(&action, data).map(IntelligenceAction::RecordEconomicImpact)
            }
            _ => Err(AppError::BadRequest(format!("Invalid action: {}", action))),
        }
    }
}

fn payload<T: DeserializeOwned>(action: &str, data: serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid data for {}: {}", action, e)))
}

/// GET /intelligence
pub async fn get_intelligence(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<IntelligenceQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view: IntelligenceView = query
        .view
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Intelligence type required".to_string()))?
        .parse()
        .map_err(AppError::BadRequest)?;

    let service = &state.intelligence_service;
    let now = Utc::now();

    let body = match view {
        IntelligenceView::RiskPredictions => {
            let crop_id = query.crop_cycle_id.map(CropCycleId);
            let risks = service
                .risk_predictions(&profile, crop_id.as_ref(), now)
                .await?;
            json!({ "count": risks.len(), "risk_predictions": risks })
        }
        IntelligenceView::AreaIntelligence => json!(service.area_report(&profile, now).await?),
        IntelligenceView::DecisionWarnings => {
            let warnings = service.decision_warnings(&profile).await?;
            json!({ "count": warnings.len(), "decision_warnings": warnings })
        }
        IntelligenceView::HarvestTiming => json!(
            service
                .harvest_timing(&profile, &query.crop_id()?, now.date_naive())
                .await?
        ),
        IntelligenceView::SeasonalComparison => {
            json!(service.seasonal_comparison(&profile, &query.crop_id()?).await?)
        }
        IntelligenceView::EconomicImpacts => json!(service.economic_impacts(&profile).await?),
    };

    Ok(Json(body))
}

/// POST /intelligence
pub async fn post_intelligence(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<IntelligenceRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let action = IntelligenceAction::parse(req)?;
    let service = &state.intelligence_service;
    let now = Utc::now();
    let today = now.date_naive();

    let body = match action {
        IntelligenceAction::GenerateRiskPredictions(req) => {
            let predictions = service
                .generate_risk_predictions(
                    &profile,
                    &CropCycleId(req.crop_cycle_id),
                    req.risk_types.as_deref(),
                    today,
                    now,
                )
                .await?;
            json!({
                "message": "Risk predictions generated successfully",
                "count": predictions.len(),
                "predictions": predictions,
            })
        }
        IntelligenceAction::AcknowledgeWarning(req) => {
            service.acknowledge_warning(&profile, &req.warning_id).await?;
            json!({ "message": "Warning acknowledged successfully" })
        }
        IntelligenceAction::DismissWarning(req) => {
            service.dismiss_warning(&profile, &req.warning_id).await?;
            json!({ "message": "Warning dismissed successfully" })
        }
        IntelligenceAction::UpdateAreaIntelligence(req) => {
            let center = GeoPoint::new(req.center_lat, req.center_lng);
            if !center.is_valid() || req.radius_km <= 0.0 {
                return Err(AppError::BadRequest(
                    "Center must be a valid coordinate and radius positive".to_string(),
                ));
            }
            let area = service.update_area(center, req.radius_km, now).await?;
            json!({
                "message": "Area intelligence updated successfully",
                "area_intelligence": area,
            })
        }
        IntelligenceAction::GenerateSeasonalComparison(req) => {
            let report = service
                .generate_seasonal_comparison(&profile, &CropCycleId(req.crop_cycle_id), today)
                .await?;
            json!({
                "message": "Seasonal comparison generated successfully",
                "seasonal_comparisons": report.seasonal_comparisons,
                "difference_analysis": report.difference_analysis,
                "key_insights": report.key_insights,
            })
        }
        IntelligenceAction::RecordEconomicImpact(report) => {
            let impact = service.record_economic_impact(&profile, &report).await?;
            json!({
                "message": "Economic impact recorded successfully",
                "economic_impact": impact,
            })
        }
    };

    Ok(Json(body))
}
