//! Seasonal crop recommendation entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CropType, ProfileId};

/// Indian cropping season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Kharif => write!(f, "kharif"),
            Season::Rabi => write!(f, "rabi"),
            Season::Zaid => write!(f, "zaid"),
        }
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kharif" => Ok(Season::Kharif),
            "rabi" => Ok(Season::Rabi),
            "zaid" => Ok(Season::Zaid),
            _ => Err(format!("Unknown season: {}", s)),
        }
    }
}

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// A crop suggested for a farmer this season
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRecommendation {
    pub id: Uuid,
    pub farmer_id: ProfileId,
    pub season: Season,
    pub recommended_crop: CropType,
    pub suitability_score: f64,
    pub expected_yield_range: Range,
    pub investment_required: f64,
    pub expected_profit_range: Range,
    pub risk_factors: serde_json::Value,
    pub market_outlook: String,
    pub created_at: DateTime<Utc>,
}
