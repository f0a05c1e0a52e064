//! Advisory domain entity
//!
//! A timestamped recommendation shown to a farmer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CropCycleId, ProfileId};

/// Unique identifier for an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdvisoryId(pub Uuid);

impl AdvisoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AdvisoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AdvisoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryType {
    WeatherWarning,
    Irrigation,
    Fertilizer,
    PestControl,
    HarvestTiming,
    MarketPrice,
    General,
}

impl std::fmt::Display for AdvisoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdvisoryType::WeatherWarning => "weather_warning",
            AdvisoryType::Irrigation => "irrigation",
            AdvisoryType::Fertilizer => "fertilizer",
            AdvisoryType::PestControl => "pest_control",
            AdvisoryType::HarvestTiming => "harvest_timing",
            AdvisoryType::MarketPrice => "market_price",
            AdvisoryType::General => "general",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AdvisoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weather_warning" => Ok(AdvisoryType::WeatherWarning),
            "irrigation" => Ok(AdvisoryType::Irrigation),
            "fertilizer" => Ok(AdvisoryType::Fertilizer),
            "pest_control" => Ok(AdvisoryType::PestControl),
            "harvest_timing" => Ok(AdvisoryType::HarvestTiming),
            "market_price" => Ok(AdvisoryType::MarketPrice),
            "general" => Ok(AdvisoryType::General),
            _ => Err(format!("Unknown advisory type: {}", s)),
        }
    }
}

/// Advisory priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// An advisory
#[derive(Debug, Clone, Serialize)]
pub struct Advisory {
    pub id: AdvisoryId,
    pub farmer_id: ProfileId,
    pub crop_cycle_id: Option<CropCycleId>,
    #[serde(rename = "type")]
    pub advisory_type: AdvisoryType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub action_required: bool,
    pub is_read: bool,
    pub valid_until: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Rule output before it is bound to a farmer and crop
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryDraft {
    pub advisory_type: AdvisoryType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub action_required: bool,
}

impl AdvisoryDraft {
    pub fn new(
        advisory_type: AdvisoryType,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        action_required: bool,
    ) -> Self {
        Self {
            advisory_type,
            title: title.into(),
            description: description.into(),
            priority,
            action_required,
        }
    }

    pub fn for_crop(self, farmer_id: ProfileId, crop_cycle_id: CropCycleId) -> NewAdvisory {
        NewAdvisory {
            farmer_id,
            crop_cycle_id: Some(crop_cycle_id),
            advisory_type: self.advisory_type,
            title: self.title,
            description: self.description,
            priority: self.priority,
            action_required: self.action_required,
            valid_until: None,
            metadata: serde_json::json!({}),
        }
    }
}

/// Data needed to create an advisory
#[derive(Debug, Clone)]
pub struct NewAdvisory {
    pub farmer_id: ProfileId,
    pub crop_cycle_id: Option<CropCycleId>,
    pub advisory_type: AdvisoryType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub action_required: bool,
    pub valid_until: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
}

/// Fields an owner may change on an advisory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvisoryUpdate {
    pub is_read: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub action_required: Option<bool>,
    pub valid_until: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

/// Filter for listing advisories
#[derive(Debug, Clone, Default)]
pub struct AdvisoryFilter {
    /// None means every farmer
    pub farmer_ids: Option<Vec<ProfileId>>,
    pub unread_only: bool,
    pub advisory_type: Option<AdvisoryType>,
    pub created_since: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
}
