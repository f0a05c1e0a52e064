//! Intelligence domain entities
//!
//! Risk predictions, decision warnings, area summaries, community alerts,
//! seasonal comparisons and economic impact records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AdvisoryId, AdvisoryType, CropCycleId, GeoPoint, ProfileId};

/// Category of a predicted risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    Disease,
    Pest,
    WaterStress,
    HeatStress,
    NutrientDeficiency,
}

impl RiskType {
    pub const ALL: [RiskType; 5] = [
        RiskType::Disease,
        RiskType::Pest,
        RiskType::WaterStress,
        RiskType::HeatStress,
        RiskType::NutrientDeficiency,
    ];
}

impl std::fmt::Display for RiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskType::Disease => "disease",
            RiskType::Pest => "pest",
            RiskType::WaterStress => "water_stress",
            RiskType::HeatStress => "heat_stress",
            RiskType::NutrientDeficiency => "nutrient_deficiency",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for RiskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskType::ALL
            .iter()
            .find(|r| r.to_string() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown risk type: {}", s))
    }
}

/// Four-level severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Urgency score used to rank decision warnings
    pub fn urgency_score(&self) -> u32 {
        match self {
            RiskLevel::Low => 25,
            RiskLevel::Medium => 50,
            RiskLevel::High => 75,
            RiskLevel::Critical => 100,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// A stored risk prediction for a crop cycle
#[derive(Debug, Clone, Serialize)]
pub struct RiskPrediction {
    pub id: Uuid,
    pub crop_cycle_id: CropCycleId,
    pub risk_type: RiskType,
    pub risk_level: RiskLevel,
    pub probability: f64,
    pub time_to_impact_days: i32,
    pub confidence_score: f64,
    pub affected_area_percentage: f64,
    pub economic_impact_estimate: f64,
    pub prevention_cost_estimate: f64,
    pub predicted_loss_if_ignored: f64,
    pub mitigation_strategies: Vec<String>,
    pub contributing_factors: serde_json::Value,
    pub model_version: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Output of a risk rule, before it is stored
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub risk_type: RiskType,
    pub risk_level: RiskLevel,
    pub probability: f64,
    pub time_to_impact_days: i32,
    pub confidence_score: f64,
    pub affected_area_percentage: f64,
    pub economic_impact_estimate: f64,
    pub prevention_cost_estimate: f64,
    pub predicted_loss_if_ignored: f64,
    pub mitigation_strategies: Vec<String>,
    pub contributing_factors: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct NewRiskPrediction {
    pub crop_cycle_id: CropCycleId,
    pub assessment: RiskAssessment,
    pub model_version: String,
    pub expires_at: DateTime<Utc>,
}

/// A warning about a farming decision, e.g. planting the same crop twice
#[derive(Debug, Clone, Serialize)]
pub struct DecisionWarning {
    pub id: Uuid,
    pub farmer_id: ProfileId,
    pub crop_cycle_id: Option<CropCycleId>,
    pub warning_type: String,
    pub risk_level: RiskLevel,
    pub title: String,
    pub description: String,
    pub potential_loss_estimate: f64,
    pub is_acknowledged: bool,
    pub is_dismissed: bool,
    pub created_at: DateTime<Utc>,
}

impl DecisionWarning {
    pub fn is_open(&self) -> bool {
        !self.is_acknowledged && !self.is_dismissed
    }
}

#[derive(Debug, Clone)]
pub struct NewDecisionWarning {
    pub farmer_id: ProfileId,
    pub crop_cycle_id: Option<CropCycleId>,
    pub warning_type: String,
    pub risk_level: RiskLevel,
    pub title: String,
    pub description: String,
    pub potential_loss_estimate: f64,
}

/// Aggregate risk scores in [0, 1] for an area
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionalRisks {
    pub disease_pressure: f64,
    pub pest_activity: f64,
    pub weather_stress: f64,
}

/// Summary of farming activity and risk around a point
#[derive(Debug, Clone, Serialize)]
pub struct AreaIntelligence {
    pub id: Uuid,
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
    pub active_crops: u64,
    pub total_area_acres: f64,
    pub crop_distribution: serde_json::Value,
    pub regional_risks: RegionalRisks,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AreaIntelligence {
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_lat, self.center_lng)
    }
}

#[derive(Debug, Clone)]
pub struct NewAreaIntelligence {
    pub center: GeoPoint,
    pub radius_km: f64,
    pub active_crops: u64,
    pub total_area_acres: f64,
    pub crop_distribution: serde_json::Value,
    pub regional_risks: RegionalRisks,
    pub expires_at: DateTime<Utc>,
}

/// A regional alert shared with every farmer in range
#[derive(Debug, Clone, Serialize)]
pub struct CommunityAlert {
    pub id: Uuid,
    pub alert_type: String,
    pub severity: RiskLevel,
    pub description: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub affected_radius_km: f64,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CommunityAlert {
    /// Whether `point` lies inside the alert's radius
    pub fn covers(&self, point: &GeoPoint) -> bool {
        GeoPoint::new(self.center_lat, self.center_lng).distance_km(point)
            <= self.affected_radius_km
    }
}

#[derive(Debug, Clone)]
pub struct NewCommunityAlert {
    pub alert_type: String,
    pub severity: RiskLevel,
    pub description: String,
    pub center: GeoPoint,
    pub affected_radius_km: f64,
    pub expires_at: DateTime<Utc>,
}

/// Weather of one season measured against the crop's optimum
#[derive(Debug, Clone, Serialize)]
pub struct SeasonalComparison {
    pub id: Uuid,
    pub crop_cycle_id: CropCycleId,
    /// "current" or "previous_N"
    pub comparison_season: String,
    pub compared_cycle_id: CropCycleId,
    pub total_rainfall_mm: f64,
    pub avg_temperature: f64,
    pub rainfall_deviation_percent: f64,
    pub temperature_deviation_percent: f64,
    pub yield_tons: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSeasonalComparison {
    pub crop_cycle_id: CropCycleId,
    pub comparison_season: String,
    pub compared_cycle_id: CropCycleId,
    pub total_rainfall_mm: f64,
    pub avg_temperature: f64,
    pub rainfall_deviation_percent: f64,
    pub temperature_deviation_percent: f64,
    pub yield_tons: Option<f64>,
}

/// Recorded cost and benefit of acting on advice
#[derive(Debug, Clone, Serialize)]
pub struct EconomicImpact {
    pub id: Uuid,
    pub farmer_id: ProfileId,
    pub advisory_id: Option<AdvisoryId>,
    pub advisory_type: Option<AdvisoryType>,
    pub risk_prediction_id: Option<Uuid>,
    pub estimated_cost: f64,
    pub estimated_loss_prevented: f64,
    pub roi_percentage: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEconomicImpact {
    pub farmer_id: ProfileId,
    pub advisory_id: Option<AdvisoryId>,
    pub advisory_type: Option<AdvisoryType>,
    pub risk_prediction_id: Option<Uuid>,
    pub estimated_cost: f64,
    pub estimated_loss_prevented: f64,
    pub roi_percentage: f64,
}
