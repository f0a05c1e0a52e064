//! Crop cycle domain entity
//!
//! One sowing-to-harvest period on a farmer's field, plus the per-crop
//! agronomy constants the rule engines are built on.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeoPoint, ProfileId};

/// Unique identifier for a crop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropCycleId(pub Uuid);

impl CropCycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CropCycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CropCycleId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CropCycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported crop types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Rice,
    Wheat,
    Cotton,
    Sugarcane,
    Maize,
    Pulses,
    Vegetables,
    Fruits,
    Spices,
    Oilseeds,
    Other,
}

impl CropType {
    pub const ALL: [CropType; 11] = [
        CropType::Rice,
        CropType::Wheat,
        CropType::Cotton,
        CropType::Sugarcane,
        CropType::Maize,
        CropType::Pulses,
        CropType::Vegetables,
        CropType::Fruits,
        CropType::Spices,
        CropType::Oilseeds,
        CropType::Other,
    ];

    /// Days from sowing to harvest
    pub fn harvest_days(&self) -> i64 {
        match self {
            CropType::Rice => 120,
            CropType::Wheat => 110,
            CropType::Cotton => 160,
            CropType::Sugarcane => 365,
            CropType::Maize => 90,
            CropType::Pulses => 75,
            CropType::Vegetables => 60,
            CropType::Fruits => 180,
            CropType::Spices => 90,
            CropType::Oilseeds => 100,
            CropType::Other => 100,
        }
    }

    /// Baseline yield in tons per acre
    pub fn base_yield_tons(&self) -> f64 {
        match self {
            CropType::Rice => 2.8,
            CropType::Wheat => 3.0,
            CropType::Cotton => 1.2,
            CropType::Sugarcane => 25.0,
            CropType::Maize => 2.5,
            CropType::Pulses => 1.8,
            CropType::Vegetables => 15.0,
            CropType::Fruits => 8.0,
            CropType::Spices => 0.8,
            CropType::Oilseeds => 1.5,
            CropType::Other => 2.0,
        }
    }

    /// Optimal average daily maximum temperature (°C)
    pub fn optimal_temperature(&self) -> f64 {
        match self {
            CropType::Rice => 28.0,
            CropType::Wheat => 22.0,
            CropType::Cotton => 30.0,
            CropType::Sugarcane => 25.0,
            CropType::Maize => 26.0,
            CropType::Pulses => 24.0,
            CropType::Vegetables => 22.0,
            CropType::Fruits => 24.0,
            CropType::Spices => 26.0,
            CropType::Oilseeds => 25.0,
            CropType::Other => 24.0,
        }
    }

    /// Optimal rainfall over a season (mm)
    pub fn optimal_rainfall(&self) -> f64 {
        match self {
            CropType::Rice => 1200.0,
            CropType::Wheat => 500.0,
            CropType::Cotton => 700.0,
            CropType::Sugarcane => 1500.0,
            CropType::Maize => 600.0,
            CropType::Pulses => 400.0,
            CropType::Vegetables => 800.0,
            CropType::Fruits => 1000.0,
            CropType::Spices => 900.0,
            CropType::Oilseeds => 600.0,
            CropType::Other => 700.0,
        }
    }

    /// Harvest date implied by a sowing date
    pub fn expected_harvest_date(&self, sowing_date: NaiveDate) -> NaiveDate {
        sowing_date + Duration::days(self.harvest_days())
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CropType::Rice => "rice",
            CropType::Wheat => "wheat",
            CropType::Cotton => "cotton",
            CropType::Sugarcane => "sugarcane",
            CropType::Maize => "maize",
            CropType::Pulses => "pulses",
            CropType::Vegetables => "vegetables",
            CropType::Fruits => "fruits",
            CropType::Spices => "spices",
            CropType::Oilseeds => "oilseeds",
            CropType::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for CropType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CropType::ALL
            .iter()
            .find(|c| c.to_string() == s.to_lowercase())
            .copied()
            .ok_or_else(|| format!("Unknown crop type: {}", s))
    }
}

/// Growth stage of a crop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Sowing,
    Germination,
    Vegetative,
    Flowering,
    Fruiting,
    Harvesting,
}

impl GrowthStage {
    /// Stage a crop of the given age is expected to be in
    pub fn for_age(days_since_sowing: i64) -> Self {
        match days_since_sowing {
            ..=9 => GrowthStage::Sowing,
            10..=24 => GrowthStage::Germination,
            25..=59 => GrowthStage::Vegetative,
            60..=89 => GrowthStage::Flowering,
            90..=119 => GrowthStage::Fruiting,
            _ => GrowthStage::Harvesting,
        }
    }

    /// The stage to move to, if the crop's age puts it past its current stage.
    /// Stages never move backwards.
    pub fn advance(&self, days_since_sowing: i64) -> Option<GrowthStage> {
        let expected = GrowthStage::for_age(days_since_sowing);
        (expected > *self).then_some(expected)
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GrowthStage::Sowing => "sowing",
            GrowthStage::Germination => "germination",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::Fruiting => "fruiting",
            GrowthStage::Harvesting => "harvesting",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for GrowthStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sowing" => Ok(GrowthStage::Sowing),
            "germination" => Ok(GrowthStage::Germination),
            "vegetative" => Ok(GrowthStage::Vegetative),
            "flowering" => Ok(GrowthStage::Flowering),
            "fruiting" => Ok(GrowthStage::Fruiting),
            "harvesting" => Ok(GrowthStage::Harvesting),
            _ => Err(format!("Unknown growth stage: {}", s)),
        }
    }
}

/// Lifecycle status of a crop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Active,
    Completed,
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleStatus::Active => write!(f, "active"),
            CycleStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for CycleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(CycleStatus::Active),
            "completed" => Ok(CycleStatus::Completed),
            _ => Err(format!("Unknown crop cycle status: {}", s)),
        }
    }
}

/// A crop cycle
#[derive(Debug, Clone, Serialize)]
pub struct CropCycle {
    pub id: CropCycleId,
    pub farmer_id: ProfileId,
    pub crop_type: CropType,
    pub crop_variety: Option<String>,
    pub sowing_date: NaiveDate,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub actual_yield_tons: Option<f64>,
    pub field_size_acres: Option<f64>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub soil_type: Option<String>,
    pub irrigation_method: Option<String>,
    pub current_stage: GrowthStage,
    pub status: CycleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CropCycle {
    /// Whole days elapsed since sowing (negative for future sowing dates)
    pub fn days_since_sowing(&self, today: NaiveDate) -> i64 {
        (today - self.sowing_date).num_days()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        match (self.location_lat, self.location_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }

    /// Field size, treating unknown as zero acres
    pub fn acres(&self) -> f64 {
        self.field_size_acres.unwrap_or(0.0)
    }

    pub fn is_active(&self) -> bool {
        self.status == CycleStatus::Active
    }
}

/// Data needed to create a crop cycle
#[derive(Debug, Clone)]
pub struct NewCropCycle {
    pub farmer_id: ProfileId,
    pub crop_type: CropType,
    pub crop_variety: Option<String>,
    pub sowing_date: NaiveDate,
    pub expected_harvest_date: NaiveDate,
    pub field_size_acres: Option<f64>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub soil_type: Option<String>,
    pub irrigation_method: Option<String>,
}

/// Fields an owner may change on a crop cycle
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CropCycleUpdate {
    pub crop_variety: Option<String>,
    pub expected_harvest_date: Option<NaiveDate>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub actual_yield_tons: Option<f64>,
    pub field_size_acres: Option<f64>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub soil_type: Option<String>,
    pub irrigation_method: Option<String>,
    pub current_stage: Option<GrowthStage>,
    pub status: Option<CycleStatus>,
}

/// Filter for listing crop cycles
#[derive(Debug, Clone, Default)]
pub struct CropCycleFilter {
    /// None means every farmer
    pub farmer_ids: Option<Vec<ProfileId>>,
    pub status: Option<CycleStatus>,
    pub created_since: Option<DateTime<Utc>>,
}
