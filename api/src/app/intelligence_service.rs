//! Intelligence service
//!
//! Risk predictions, decision warnings, area intelligence, harvest timing,
//! seasonal comparison and economic impact tracking.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::access::{require_owner, FarmerScope};
use crate::app::harvest_timing::{self, HarvestOptimization, FORECAST_DAYS};
use crate::app::insights::{
    self, AlternativeBenefits, DifferenceAnalysis, EconomicConsequences, EconomicSummary,
    RegionalInsights, RoiByType, CURRENT_SEASON, PRESSURE_THRESHOLD,
};
use crate::app::risk_model::{
    self, FinancialSummary, PREDICTION_TTL_DAYS, RISK_MODEL_VERSION, WEATHER_WINDOW_DAYS,
};
use crate::app::yield_model::round2;
use crate::domain::entities::{
    AdvisoryId, AreaIntelligence, CommunityAlert, CropCycle, CropCycleFilter, CropCycleId,
    CycleStatus, DecisionWarning, EconomicImpact, GeoPoint, NewAreaIntelligence,
    NewCommunityAlert, NewEconomicImpact, NewRiskPrediction, Profile, RegionalRisks, RiskLevel,
    RiskPrediction, RiskType, SeasonalComparison, WeatherRecord,
};
use crate::domain::ports::{
    AdvisoryRepository, CropCycleRepository, FpoRepository, IntelligenceRepository,
    WeatherRepository,
};
use crate::error::{AppError, DomainError};

pub const DEFAULT_AREA_RADIUS_KM: f64 = 10.0;

/// Lifetime of area summaries and the alerts they raise
pub const AREA_TTL_DAYS: i64 = 7;

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRisk {
    #[serde(flatten)]
    pub prediction: RiskPrediction,
    pub urgency_level: RiskLevel,
    pub loss_prevention_insight: String,
    pub action_priority: u32,
    pub financial_impact_summary: FinancialSummary,
}

impl From<RiskPrediction> for EnrichedRisk {
    fn from(prediction: RiskPrediction) -> Self {
        Self {
            urgency_level: risk_model::urgency_level(
                prediction.probability,
                prediction.time_to_impact_days,
            ),
            loss_prevention_insight: risk_model::loss_prevention_insight(&prediction),
            action_priority: risk_model::action_priority(&prediction),
            financial_impact_summary: risk_model::financial_summary(&prediction),
            prediction,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedWarning {
    #[serde(flatten)]
    pub warning: DecisionWarning,
    pub urgency_score: u32,
    pub actionable_steps: Vec<String>,
    pub economic_consequences: EconomicConsequences,
    pub alternative_benefits: AlternativeBenefits,
}

impl From<DecisionWarning> for EnrichedWarning {
    fn from(warning: DecisionWarning) -> Self {
        Self {
            urgency_score: warning.risk_level.urgency_score(),
            actionable_steps: insights::actionable_steps(&warning),
            economic_consequences: insights::economic_consequences(&warning),
            alternative_benefits: insights::alternative_benefits(),
            warning,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    pub district: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaReport {
    pub area_intelligence: Option<AreaIntelligence>,
    pub community_alerts: Vec<CommunityAlert>,
    pub regional_insights: Option<RegionalInsights>,
    pub user_location: UserLocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub optimization: HarvestOptimization,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalReport {
    pub seasonal_comparisons: Vec<SeasonalComparison>,
    pub difference_analysis: Option<DifferenceAnalysis>,
    pub key_insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EconomicReport {
    pub economic_impacts: Vec<EconomicImpact>,
    pub economic_summary: EconomicSummary,
    pub roi_analysis: BTreeMap<String, RoiByType>,
}

/// Cost and benefit a farmer reports after acting on advice
#[derive(Debug, Clone, Deserialize)]
pub struct ImpactReport {
    pub advisory_id: Option<AdvisoryId>,
    pub risk_prediction_id: Option<Uuid>,
    pub estimated_cost: f64,
    pub estimated_loss_prevented: f64,
}

// ============================================================================
// Service
// ============================================================================

/// Service for the intelligence layer
pub struct IntelligenceService<IR, CR, WR, AR, FR>
where
    IR: IntelligenceRepository,
    CR: CropCycleRepository,
    WR: WeatherRepository,
    AR: AdvisoryRepository,
    FR: FpoRepository,
{
    intelligence: Arc<IR>,
    crops: Arc<CR>,
    weather: Arc<WR>,
    advisories: Arc<AR>,
    fpos: Arc<FR>,
}

impl<IR, CR, WR, AR, FR> IntelligenceService<IR, CR, WR, AR, FR>
where
    IR: IntelligenceRepository,
    CR: CropCycleRepository,
    WR: WeatherRepository,
    AR: AdvisoryRepository,
    FR: FpoRepository,
{
    pub fn new(
        intelligence: Arc<IR>,
        crops: Arc<CR>,
        weather: Arc<WR>,
        advisories: Arc<AR>,
        fpos: Arc<FR>,
    ) -> Self {
        Self {
            intelligence,
            crops,
            weather,
            advisories,
            fpos,
        }
    }

    async fn find_crop(&self, crop_id: &CropCycleId) -> Result<CropCycle, AppError> {
        self.crops
            .find_by_id(crop_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Crop cycle {}", crop_id)))
    }

    /// Crop the caller may read
    async fn visible_crop(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
    ) -> Result<CropCycle, AppError> {
        let crop = self.find_crop(crop_id).await?;
        let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
        if !scope.contains(&crop.farmer_id) {
            return Err(DomainError::Forbidden("Crop cycle is outside your scope".into()).into());
        }
        Ok(crop)
    }

    /// Crop the caller owns
    async fn owned_crop(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
    ) -> Result<CropCycle, AppError> {
        let crop = self.find_crop(crop_id).await?;
        require_owner(profile, &crop.farmer_id)?;
        Ok(crop)
    }

    /// Weather rows at the crop's location between two dates, oldest first
    async fn crop_weather(
        &self,
        crop: &CropCycle,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WeatherRecord>, AppError> {
        match crop.location() {
            Some(location) => Ok(self
                .weather
                .list_range(&location.rounded(), from, to)
                .await?),
            None => Ok(vec![]),
        }
    }

    // ------------------------------------------------------------------------
    // Risk predictions
    // ------------------------------------------------------------------------

    /// Unexpired predictions for visible crops, highest probability first
    pub async fn risk_predictions(
        &self,
        profile: &Profile,
        crop_id: Option<&CropCycleId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<EnrichedRisk>, AppError> {
        let predictions = match crop_id {
            Some(id) => {
                self.visible_crop(profile, id).await?;
                self.intelligence
                    .active_risk_predictions(Some(std::slice::from_ref(id)), now)
                    .await?
            }
            None => {
                let scope = FarmerScope::for_profile(profile, self.fpos.as_ref()).await?;
                match scope.farmer_ids() {
                    None => self.intelligence.active_risk_predictions(None, now).await?,
                    Some(farmer_ids) => {
                        let crop_ids: Vec<CropCycleId> = self
                            .crops
                            .list(&CropCycleFilter {
                                farmer_ids: Some(farmer_ids),
                                ..Default::default()
                            })
                            .await?
                            .into_iter()
                            .map(|c| c.id)
                            .collect();
                        if crop_ids.is_empty() {
                            return Ok(vec![]);
                        }
                        self.intelligence
                            .active_risk_predictions(Some(&crop_ids), now)
                            .await?
                    }
                }
            }
        };
        Ok(predictions.into_iter().map(EnrichedRisk::from).collect())
    }

    /// Run the risk rules for one of the caller's crops
    pub async fn generate_risk_predictions(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
        risk_types: Option<&[RiskType]>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<RiskPrediction>, AppError> {
        let crop = self.owned_crop(profile, crop_id).await?;
        self.predict_risks(&crop, risk_types.unwrap_or(&RiskType::ALL), today, now)
            .await
    }

    async fn predict_risks(
        &self,
        crop: &CropCycle,
        risk_types: &[RiskType],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<RiskPrediction>, AppError> {
        let weather = self
            .crop_weather(
                crop,
                today - Duration::days(WEATHER_WINDOW_DAYS),
                Some(today),
            )
            .await?;

        let mut stored = Vec::new();
        for assessment in risk_model::assess_all(risk_types, crop, &weather) {
            let prediction = self
                .intelligence
                .create_risk_prediction(&NewRiskPrediction {
                    crop_cycle_id: crop.id,
                    assessment,
                    model_version: RISK_MODEL_VERSION.to_string(),
                    expires_at: now + Duration::days(PREDICTION_TTL_DAYS),
                })
                .await?;
            stored.push(prediction);
        }

        tracing::debug!(
            crop_cycle_id = %crop.id,
            risks = stored.len(),
            weather_rows = weather.len(),
            "Risk rules evaluated"
        );
        Ok(stored)
    }

    /// Risk predictions for every active crop with a location.
    /// Returns how many predictions were stored.
    pub async fn generate_all_risks(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let mut count = 0;
        for crop in self.active_crops().await? {
            if crop.location().is_none() {
                continue;
            }
            count += self
                .predict_risks(&crop, &RiskType::ALL, today, now)
                .await?
                .len();
        }
        Ok(count)
    }

    async fn active_crops(&self) -> Result<Vec<CropCycle>, AppError> {
        Ok(self
            .crops
            .list(&CropCycleFilter {
                status: Some(CycleStatus::Active),
                ..Default::default()
            })
            .await?)
    }

    // ------------------------------------------------------------------------
    // Decision warnings
    // ------------------------------------------------------------------------

    pub async fn decision_warnings(
        &self,
        profile: &Profile,
    ) -> Result<Vec<EnrichedWarning>, AppError> {
        let warnings = self.intelligence.open_warnings(&profile.id).await?;
        Ok(warnings.into_iter().map(EnrichedWarning::from).collect())
    }

    pub async fn acknowledge_warning(&self, profile: &Profile, id: &Uuid) -> Result<(), AppError> {
        self.owned_warning(profile, id).await?;
        self.intelligence.acknowledge_warning(id).await?;
        Ok(())
    }

    pub async fn dismiss_warning(&self, profile: &Profile, id: &Uuid) -> Result<(), AppError> {
        self.owned_warning(profile, id).await?;
        self.intelligence.dismiss_warning(id).await?;
        Ok(())
    }

    async fn owned_warning(
        &self,
        profile: &Profile,
        id: &Uuid,
    ) -> Result<DecisionWarning, AppError> {
        let warning = self
            .intelligence
            .find_warning(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Warning {}", id)))?;
        require_owner(profile, &warning.farmer_id)?;
        Ok(warning)
    }

    // ------------------------------------------------------------------------
    // Area intelligence
    // ------------------------------------------------------------------------

    /// Nearest area summary, covering alerts and insights for the caller's location
    pub async fn area_report(
        &self,
        profile: &Profile,
        now: DateTime<Utc>,
    ) -> Result<AreaReport, AppError> {
        let location = profile
            .location()
            .ok_or_else(|| AppError::NotFound("User location not found".to_string()))?;

        let area = self
            .intelligence
            .active_areas(now)
            .await?
            .into_iter()
            .min_by(|a, b| {
                a.center()
                    .distance_km(&location)
                    .total_cmp(&b.center().distance_km(&location))
            });

        let community_alerts: Vec<CommunityAlert> = self
            .intelligence
            .active_alerts(now)
            .await?
            .into_iter()
            .filter(|a| a.covers(&location))
            .collect();

        let regional_insights = area
            .as_ref()
            .map(|a| insights::regional_insights(a, &community_alerts));

        Ok(AreaReport {
            area_intelligence: area,
            community_alerts,
            regional_insights,
            user_location: UserLocation {
                lat: location.lat,
                lng: location.lng,
                district: profile.district.clone(),
                state: profile.state.clone(),
            },
        })
    }

    /// Aggregate active crops and their unexpired risks around a point,
    /// raising a community alert for each pressure above the threshold.
    pub async fn update_area(
        &self,
        center: GeoPoint,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> Result<AreaIntelligence, AppError> {
        if !center.is_valid() {
            return Err(AppError::BadRequest("Invalid coordinates".to_string()));
        }
        if radius_km <= 0.0 {
            return Err(AppError::BadRequest("radius_km must be positive".to_string()));
        }

        let nearby: Vec<CropCycle> = self
            .active_crops()
            .await?
            .into_iter()
            .filter(|c| {
                c.location()
                    .map(|l| l.distance_km(&center) <= radius_km)
                    .unwrap_or(false)
            })
            .collect();

        let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
        for crop in &nearby {
            *distribution.entry(crop.crop_type.to_string()).or_default() += 1;
        }
        let total_area: f64 = nearby.iter().map(|c| c.acres()).sum();

        let crop_ids: Vec<CropCycleId> = nearby.iter().map(|c| c.id).collect();
        let risks = if crop_ids.is_empty() {
            vec![]
        } else {
            self.intelligence
                .active_risk_predictions(Some(&crop_ids), now)
                .await?
        };

        let mut regional = RegionalRisks::default();
        for risk in &risks {
            let slot = match risk.risk_type {
                RiskType::Disease => &mut regional.disease_pressure,
                RiskType::Pest => &mut regional.pest_activity,
                RiskType::WaterStress | RiskType::HeatStress => &mut regional.weather_stress,
                RiskType::NutrientDeficiency => continue,
            };
            *slot = slot.max(risk.probability);
        }

        let expires_at = now + Duration::days(AREA_TTL_DAYS);
        let area = self
            .intelligence
            .upsert_area(&NewAreaIntelligence {
                center,
                radius_km,
                active_crops: nearby.len() as u64,
                total_area_acres: round2(total_area),
                crop_distribution: serde_json::to_value(&distribution)
                    .map_err(|e| AppError::Internal(e.to_string()))?,
                regional_risks: regional,
                expires_at,
            })
            .await?;

        self.raise_alerts(&center, radius_km, &regional, now, expires_at)
            .await?;

        tracing::info!(
            lat = center.lat,
            lng = center.lng,
            active_crops = area.active_crops,
            "Area intelligence updated"
        );
        Ok(area)
    }

    async fn raise_alerts(
        &self,
        center: &GeoPoint,
        radius_km: f64,
        risks: &RegionalRisks,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let existing = self.intelligence.active_alerts(now).await?;
        let pressures = [
            ("disease_outbreak", "disease pressure", risks.disease_pressure),
            ("pest_outbreak", "pest activity", risks.pest_activity),
            ("weather_stress", "weather stress", risks.weather_stress),
        ];

        for (alert_type, label, score) in pressures {
            if score <= PRESSURE_THRESHOLD {
                continue;
            }
            if existing
                .iter()
                .any(|a| a.alert_type == alert_type && a.covers(center))
            {
                continue;
            }
            self.intelligence
                .create_alert(&NewCommunityAlert {
                    alert_type: alert_type.to_string(),
                    severity: if score > 0.9 {
                        RiskLevel::Critical
                    } else {
                        RiskLevel::High
                    },
                    description: format!("High {} detected within {} km", label, radius_km),
                    center: *center,
                    affected_radius_km: radius_km,
                    expires_at,
                })
                .await?;
        }
        Ok(())
    }

    /// Refresh the area summary around every distinct active crop location
    pub async fn update_all_areas(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let mut centers: BTreeMap<String, GeoPoint> = BTreeMap::new();
        for crop in self.active_crops().await? {
            if let Some(location) = crop.location() {
                let location = location.rounded();
                centers.entry(location.key()).or_insert(location);
            }
        }

        for center in centers.values() {
            self.update_area(*center, DEFAULT_AREA_RADIUS_KM, now).await?;
        }
        Ok(centers.len())
    }

    // ------------------------------------------------------------------------
    // Harvest timing
    // ------------------------------------------------------------------------

    pub async fn harvest_timing(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
        today: NaiveDate,
    ) -> Result<HarvestReport, AppError> {
        let crop = self.visible_crop(profile, crop_id).await?;
        let mut forecast = self.crop_weather(&crop, today, None).await?;
        forecast.truncate(FORECAST_DAYS);

        let optimization = harvest_timing::optimize(&crop, forecast, today);
        let recommendations = harvest_timing::recommendations(&optimization);
        Ok(HarvestReport {
            optimization,
            recommendations,
        })
    }

    // ------------------------------------------------------------------------
    // Seasonal comparison
    // ------------------------------------------------------------------------

    pub async fn seasonal_comparison(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
    ) -> Result<SeasonalReport, AppError> {
        self.visible_crop(profile, crop_id).await?;
        let comparisons = self.intelligence.seasonal_comparisons(crop_id).await?;
        Ok(Self::seasonal_report(comparisons))
    }

    /// Recompute the current season and every earlier cycle of the same crop
    pub async fn generate_seasonal_comparison(
        &self,
        profile: &Profile,
        crop_id: &CropCycleId,
        today: NaiveDate,
    ) -> Result<SeasonalReport, AppError> {
        let crop = self.owned_crop(profile, crop_id).await?;

        let weather = self.crop_weather(&crop, crop.sowing_date, Some(today)).await?;
        let mut rows = vec![insights::seasonal_row(
            &crop,
            &crop,
            CURRENT_SEASON.to_string(),
            &weather,
        )];

        let mut previous: Vec<CropCycle> = self
            .crops
            .list(&CropCycleFilter {
                farmer_ids: Some(vec![crop.farmer_id]),
                ..Default::default()
            })
            .await?
            .into_iter()
            .filter(|c| {
                c.id != crop.id && c.crop_type == crop.crop_type && c.sowing_date < crop.sowing_date
            })
            .collect();
        previous.sort_by(|a, b| b.sowing_date.cmp(&a.sowing_date));

        for (i, earlier) in previous.iter().enumerate() {
            let end = earlier
                .actual_harvest_date
                .or(earlier.expected_harvest_date)
                .unwrap_or(today);
            let weather = self
                .crop_weather(earlier, earlier.sowing_date, Some(end))
                .await?;
            rows.push(insights::seasonal_row(
                &crop,
                earlier,
                insights::previous_label(i + 1),
                &weather,
            ));
        }

        let stored = self
            .intelligence
            .replace_seasonal_comparisons(crop_id, &rows)
            .await?;
        Ok(Self::seasonal_report(stored))
    }

    fn seasonal_report(comparisons: Vec<SeasonalComparison>) -> SeasonalReport {
        let difference_analysis = insights::difference_analysis(&comparisons);
        let key_insights = insights::seasonal_insights(difference_analysis.as_ref());
        SeasonalReport {
            seasonal_comparisons: comparisons,
            difference_analysis,
            key_insights,
        }
    }

    // ------------------------------------------------------------------------
    // Economic impact
    // ------------------------------------------------------------------------

    pub async fn economic_impacts(&self, profile: &Profile) -> Result<EconomicReport, AppError> {
        let impacts = self.intelligence.economic_impacts(&profile.id).await?;
        Ok(EconomicReport {
            economic_summary: insights::economic_summary(&impacts),
            roi_analysis: insights::roi_by_advisory_type(&impacts),
            economic_impacts: impacts,
        })
    }

    pub async fn record_economic_impact(
        &self,
        profile: &Profile,
        report: &ImpactReport,
    ) -> Result<EconomicImpact, AppError> {
        if report.estimated_cost < 0.0 || report.estimated_loss_prevented < 0.0 {
            return Err(AppError::BadRequest(
                "Cost and prevented loss must not be negative".to_string(),
            ));
        }

        let advisory_type = match report.advisory_id {
            Some(id) => {
                let advisory = self
                    .advisories
                    .find_by_id(&id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Advisory {}", id)))?;
                require_owner(profile, &advisory.farmer_id)?;
                Some(advisory.advisory_type)
            }
            None => None,
        };

        let roi = risk_model::prevention_roi_percent(
            report.estimated_loss_prevented,
            report.estimated_cost,
        );

        Ok(self
            .intelligence
            .create_economic_impact(&NewEconomicImpact {
                farmer_id: profile.id,
                advisory_id: report.advisory_id,
                advisory_type,
                risk_prediction_id: report.risk_prediction_id,
                estimated_cost: report.estimated_cost,
                estimated_loss_prevented: report.estimated_loss_prevented,
                roi_percentage: round2(roi),
            })
            .await?)
    }
}
