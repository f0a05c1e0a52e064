//! Crop management service
//!
//! Crop cycle CRUD with the side effects of registering and completing a
//! cycle, and seasonal crop recommendations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::app::access::{require_owner, FarmerScope};
use crate::app::yield_model::{initial_estimate, MODEL_VERSION};
use crate::domain::entities::{
    AdvisoryType, CropCycle, CropCycleFilter, CropCycleId, CropCycleUpdate, CropRecommendation,
    CropType, CycleStatus, GeoPoint, NewAdvisory, NewCropCycle, NewDecisionWarning,
    NewYieldPrediction, Priority, Profile, ProfileId, Range, RiskLevel, Season, YieldPrediction,
    YieldPredictionId,
};
use crate::domain::ports::{
    AdvisoryRepository, CropCycleRepository, FpoRepository, IntelligenceRepository,
    RecommendationRepository, YieldPredictionRepository,
};
use crate::error::{AppError, DomainError};

/// Loss per acre assumed when the same crop is planted twice in a row
pub const ROTATION_LOSS_PER_ACRE: f64 = 5000.0;

/// Body of a crop registration; `crop_type` stays a string so unknown
/// values can be reported as a bad request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CropRegistration {
    pub crop_type: Option<String>,
    pub sowing_date: Option<NaiveDate>,
    pub crop_variety: Option<String>,
    pub field_size_acres: Option<f64>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub soil_type: Option<String>,
    pub irrigation_method: Option<String>,
}

/// A crop cycle in a list, with its advisory count and latest prediction
#[derive(Debug, Clone, Serialize)]
pub struct CropSummary {
    #[serde(flatten)]
    pub crop: CropCycle,
    pub advisory_count: u64,
    pub latest_prediction: Option<YieldPrediction>,
}

/// One point of a crop's prediction history
#[derive(Debug, Clone, Serialize)]
pub struct PredictionPoint {
    pub id: YieldPredictionId,
    pub predicted_yield_tons: f64,
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CropDetail {
    #[serde(flatten)]
    pub crop: CropCycle,
    pub advisory_count: u64,
    pub yield_predictions: Vec<PredictionPoint>,
}

/// Service for crop cycle operations
pub struct CropService<CR, AR, YR, IR, FR, RR>
where
    CR: CropCycleRepository,
    AR: AdvisoryRepository,
    YR: YieldPredictionRepository,
    IR: IntelligenceRepository,
    FR: FpoRepository,
    RR: RecommendationRepository,
{
    crops: Arc<CR>,
    advisories: Arc<AR>,
    predictions: Arc<YR>,
    intelligence: Arc<IR>,
    fpos: Arc<FR>,
    recommendations: Arc<RR>,
}

impl<CR, AR, YR, IR, FR, RR> CropService<CR, AR, YR, IR, FR, RR>
where
    CR: CropCycleRepository,
    AR: AdvisoryRepository,
    YR: YieldPredictionRepository,
    IR: IntelligenceRepository,
    FR: FpoRepository,
    RR: RecommendationRepository,
{
    pub fn new(
        crops: Arc<CR>,
        advisories: Arc<AR>,
        predictions: Arc<YR>,
        intelligence: Arc<IR>,
        fpos: Arc<FR>,
        recommendations: Arc<RR>,
    ) -> Self {
        Self {
            crops,
            advisories,
            predictions,
            intelligence,
            fpos,
            recommendations,
        }
    }

    /// Crop cycles visible to the caller, newest first
    pub async fn list(
        &self,
        profile: &Profile,
        status: Option<CycleStatus>,
    ) -> Result<Vec<CropSummary>, AppError> {
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
        let crops = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: scope.farmer_ids(),
                status,
                ..Default::default()
            })
            .await?;
        Ok(summarize(crops, self.advisories.as_ref(), self.predictions.as_ref()).await?)
    }

    /// One crop cycle with its prediction history
    pub async fn get(
        &self,
        profile: &Profile,
        id: &CropCycleId,
        include_factors: bool,
    ) -> Result<CropDetail, AppError> {
        let crop = self.find_crop(id).await?;
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
        if !scope.contains(&crop.farmer_id) {
            return Err(DomainError::Forbidden("Crop cycle is outside your scope".into()).into());
        }

        let counts = self.advisories.count_by_crop(std::slice::from_ref(id)).await?;
        let history = self
            .predictions
            .list(Some(std::slice::from_ref(id)), None)
            .await?
            .into_iter()
            .map(|p| PredictionPoint {
                id: p.id,
                predicted_yield_tons: p.predicted_yield_tons,
                confidence_score: p.confidence_score,
                prediction_date: p.prediction_date,
                factors: include_factors.then_some(p.factors),
            })
            .collect();

        Ok(CropDetail {
            advisory_count: counts.get(id).copied().unwrap_or(0),
            yield_predictions: history,
            crop,
        })
    }

    /// Register a crop cycle for the caller.
    ///
    /// Also stores the initial yield prediction and a welcome advisory, and
    /// warns when the caller's previous cycle was the same crop.
    pub async fn create(
        &self,
        profile: &Profile,
        registration: &CropRegistration,
        today: NaiveDate,
    ) -> Result<CropCycle, AppError> {
        let (crop_type, sowing_date) = match (&registration.crop_type, registration.sowing_date) {
            (Some(crop_type), Some(sowing_date)) if !crop_type.trim().is_empty() => {
                (crop_type, sowing_date)
            }
            _ => {
                return Err(AppError::BadRequest(
                    "Crop type and sowing date are required".to_string(),
                ))
            }
        };
        let crop_type: CropType = crop_type.trim().parse().map_err(AppError::BadRequest)?;
        validate_field(
            registration.field_size_acres,
            registration.location_lat,
            registration.location_lng,
        )?;

        let previous = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: Some(vec![profile.id]),
                ..Default::default()
            })
            .await?
            .into_iter()
            .next();

        let crop = self
            .crops
            .create(&NewCropCycle {
                farmer_id: profile.id,
                crop_type,
                crop_variety: registration.crop_variety.clone(),
                sowing_date,
                expected_harvest_date: crop_type.expected_harvest_date(sowing_date),
                field_size_acres: registration.field_size_acres,
                location_lat: registration.location_lat,
                location_lng: registration.location_lng,
                soil_type: registration.soil_type.clone(),
                irrigation_method: registration.irrigation_method.clone(),
            })
            .await?;

        tracing::info!(
            crop_cycle_id = %crop.id,
            farmer_id = %profile.id,
            crop_type = %crop_type,
            "Crop cycle registered"
        );

        let estimate = initial_estimate(crop_type);
        self.predictions
            .create(&NewYieldPrediction {
                crop_cycle_id: crop.id,
                predicted_yield_tons: estimate.yield_tons,
                confidence_score: estimate.confidence,
                prediction_date: today,
                model_version: MODEL_VERSION.to_string(),
                factors: estimate.factors,
            })
            .await?;

        self.advisories
            .create(&NewAdvisory {
                farmer_id: profile.id,
                crop_cycle_id: Some(crop.id),
                advisory_type: AdvisoryType::General,
                title: "New Crop Cycle Started".to_string(),
                description: format!(
                    "Your {} crop cycle has been successfully registered. We'll provide personalized advisories throughout the growing season.",
                    crop_type
                ),
                priority: Priority::Medium,
                action_required: false,
                valid_until: None,
                metadata: json!({}),
            })
            .await?;

        if let Some(previous) = previous.filter(|p| p.crop_type == crop_type) {
            self.intelligence
                .create_warning(&NewDecisionWarning {
                    farmer_id: profile.id,
                    crop_cycle_id: Some(crop.id),
                    warning_type: "crop_rotation_risk".to_string(),
                    risk_level: RiskLevel::Medium,
                    title: "Crop Rotation Risk".to_string(),
                    description: format!(
                        "Your previous cycle was also {}. Planting the same crop again depletes soil nutrients and builds up pests and diseases.",
                        previous.crop_type
                    ),
                    potential_loss_estimate: crop.acres() * ROTATION_LOSS_PER_ACRE,
                })
                .await?;
        }

        Ok(crop)
    }

    /// Owner update; completing a cycle adds a closing advisory
    pub async fn update(
        &self,
        profile: &Profile,
        id: &CropCycleId,
        update: &CropCycleUpdate,
    ) -> Result<CropCycle, AppError> {
        let existing = self.find_crop(id).await?;
        require_owner(profile, &existing.farmer_id)?;
        validate_field(update.field_size_acres, update.location_lat, update.location_lng)?;
        if update.actual_yield_tons.is_some_and(|y| y < 0.0) {
            return Err(
                DomainError::Validation("actual_yield_tons must not be negative".into()).into(),
            );
        }
        if let Some(stage) = update.current_stage {
            if stage < existing.current_stage {
                return Err(DomainError::Validation(format!(
                    "current_stage cannot move back from {} to {}",
                    existing.current_stage, stage
                ))
                .into());
            }
        }

        let updated = self.crops.update(id, update).await?;

        if update.status == Some(CycleStatus::Completed) && existing.is_active() {
            self.advisories
                .create(&NewAdvisory {
                    farmer_id: profile.id,
                    crop_cycle_id: Some(*id),
                    advisory_type: AdvisoryType::HarvestTiming,
                    title: "Crop Cycle Completed".to_string(),
                    description: "Your crop cycle has been marked as completed. Please update the actual harvest date and yield for better future predictions.".to_string(),
                    priority: Priority::High,
                    action_required: true,
                    valid_until: None,
                    metadata: json!({}),
                })
                .await?;
            tracing::info!(crop_cycle_id = %id, "Crop cycle completed");
        }

        Ok(updated)
    }

    pub async fn delete(&self, profile: &Profile, id: &CropCycleId) -> Result<(), AppError> {
        let crop = self.find_crop(id).await?;
        require_owner(profile, &crop.farmer_id)?;
        self.crops.delete(id).await?;
        Ok(())
    }

    /// Seasonal suggestions for the caller, saved for later reference
    pub async fn recommendations(
        &self,
        profile: &Profile,
        now: DateTime<Utc>,
    ) -> Result<Vec<CropRecommendation>, AppError> {
        let recommendations = seasonal_recommendations(profile.id, now.month0(), now);
        self.recommendations.save(&recommendations).await?;
        Ok(recommendations)
    }

    /// Move every active crop forward to the stage its age implies.
    /// Returns how many crops changed stage.
    pub async fn update_growth_stages(&self, today: NaiveDate) -> Result<usize, AppError> {
        let active = self
            .crops
            .list(&CropCycleFilter {
                status: Some(CycleStatus::Active),
                ..Default::default()
            })
            .await?;

        let mut updated = 0;
        for crop in active {
            if let Some(stage) = crop.current_stage.advance(crop.days_since_sowing(today)) {
                self.crops.set_stage(&crop.id, stage).await?;
                self.advisories
                    .create(&NewAdvisory {
                        farmer_id: crop.farmer_id,
                        crop_cycle_id: Some(crop.id),
                        advisory_type: AdvisoryType::General,
                        title: "Growth Stage Updated".to_string(),
                        description: format!(
                            "Your {} crop has entered the {} stage.",
                            crop.crop_type, stage
                        ),
                        priority: Priority::Medium,
                        action_required: false,
                        valid_until: None,
                        metadata: json!({ "stage": stage }),
                    })
                    .await?;
                tracing::debug!(crop_cycle_id = %crop.id, stage = %stage, "Growth stage advanced");
                updated += 1;
            }
        }

        tracing::info!(updated, "Growth stages updated");
        Ok(updated)
    }

    async fn find_crop(&self, id: &CropCycleId) -> Result<CropCycle, AppError> {
        self.crops
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Crop cycle {}", id)))
    }
}

/// Attach advisory counts and the latest prediction to each crop
pub async fn summarize<AR, YR>(
    crops: Vec<CropCycle>,
    advisories: &AR,
    predictions: &YR,
) -> Result<Vec<CropSummary>, DomainError>
where
    AR: AdvisoryRepository + ?Sized,
    YR: YieldPredictionRepository + ?Sized,
{
    if crops.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<CropCycleId> = crops.iter().map(|c| c.id).collect();
    let counts = advisories.count_by_crop(&ids).await?;

    let mut latest: HashMap<CropCycleId, YieldPrediction> = HashMap::new();
    for prediction in predictions.list(Some(&ids), None).await? {
        latest.entry(prediction.crop_cycle_id).or_insert(prediction);
    }

    Ok(crops
        .into_iter()
        .map(|crop| CropSummary {
            advisory_count: counts.get(&crop.id).copied().unwrap_or(0),
            latest_prediction: latest.remove(&crop.id),
            crop,
        })
        .collect())
}

fn validate_field(
    acres: Option<f64>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<(), AppError> {
    if acres.is_some_and(|a| a < 0.0) {
        return Err(DomainError::Validation("field_size_acres must not be negative".into()).into());
    }
    if let (Some(lat), Some(lng)) = (lat, lng) {
        if !GeoPoint::new(lat, lng).is_valid() {
            return Err(AppError::BadRequest("Invalid coordinates".to_string()));
        }
    }
    Ok(())
}

struct Suggestion {
    season: Season,
    crop: CropType,
    score: f64,
    yield_range: (f64, f64),
    cost_per_acre: f64,
    profit_range: (f64, f64),
    risks: serde_json::Value,
    outlook: &'static str,
}

/// Recommendations for the seasons open in a month (0 = January).
/// Season edges overlap: October is both Kharif and Rabi, March both Rabi
/// and Zaid, June both Kharif and Zaid.
pub fn seasonal_recommendations(
    farmer_id: ProfileId,
    month0: u32,
    now: DateTime<Utc>,
) -> Vec<CropRecommendation> {
    let mut suggestions = Vec::new();

    if (5..=9).contains(&month0) {
        suggestions.push(Suggestion {
            season: Season::Kharif,
            crop: CropType::Rice,
            score: 0.85,
            yield_range: (2.5, 3.2),
            cost_per_acre: 15000.0,
            profit_range: (8000.0, 15000.0),
            risks: json!({ "flood_risk": "low", "pest_risk": "medium" }),
            outlook: "Stable prices expected due to government procurement",
        });
        suggestions.push(Suggestion {
            season: Season::Kharif,
            crop: CropType::Cotton,
            score: 0.78,
            yield_range: (1.0, 1.5),
            cost_per_acre: 25000.0,
            profit_range: (12000.0, 20000.0),
            risks: json!({ "pest_risk": "high", "price_volatility": "medium" }),
            outlook: "Good export demand expected",
        });
    }

    if month0 >= 9 || month0 <= 2 {
        suggestions.push(Suggestion {
            season: Season::Rabi,
            crop: CropType::Wheat,
            score: 0.82,
            yield_range: (2.8, 3.5),
            cost_per_acre: 12000.0,
            profit_range: (10000.0, 18000.0),
            risks: json!({ "frost_risk": "low", "drought_risk": "medium" }),
            outlook: "Good market outlook with increasing demand",
        });
        suggestions.push(Suggestion {
            season: Season::Rabi,
            crop: CropType::Pulses,
            score: 0.75,
            yield_range: (1.5, 2.0),
            cost_per_acre: 10000.0,
            profit_range: (8000.0, 12000.0),
            risks: json!({ "pest_risk": "medium", "price_volatility": "high" }),
            outlook: "Government support prices available",
        });
    }

    if (2..=5).contains(&month0) {
        suggestions.push(Suggestion {
            season: Season::Zaid,
            crop: CropType::Maize,
            score: 0.80,
            yield_range: (2.0, 2.8),
            cost_per_acre: 14000.0,
            profit_range: (9000.0, 14000.0),
            risks: json!({ "heat_stress": "medium", "water_requirement": "high" }),
            outlook: "Steady demand from feed industry",
        });
    }

    suggestions
        .into_iter()
        .map(|s| CropRecommendation {
            id: Uuid::new_v4(),
            farmer_id,
            season: s.season,
            recommended_crop: s.crop,
            suitability_score: s.score,
            expected_yield_range: Range {
                min: s.yield_range.0,
                max: s.yield_range.1,
            },
            investment_required: s.cost_per_acre,
            expected_profit_range: Range {
                min: s.profit_range.0,
                max: s.profit_range.1,
            },
            risk_factors: s.risks,
            market_outlook: s.outlook.to_string(),
            created_at: now,
        })
        .collect()
}
