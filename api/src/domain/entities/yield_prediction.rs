//! Yield prediction domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CropCycleId;

/// Unique identifier for a yield prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YieldPredictionId(pub Uuid);

impl YieldPredictionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for YieldPredictionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for YieldPredictionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A predicted yield for a crop cycle on a given day
#[derive(Debug, Clone, Serialize)]
pub struct YieldPrediction {
    pub id: YieldPredictionId,
    pub crop_cycle_id: CropCycleId,
    pub predicted_yield_tons: f64,
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    pub model_version: String,
    pub factors: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewYieldPrediction {
    pub crop_cycle_id: CropCycleId,
    pub predicted_yield_tons: f64,
    pub confidence_score: f64,
    pub prediction_date: NaiveDate,
    pub model_version: String,
    pub factors: serde_json::Value,
}

/// Admin corrections to a stored prediction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YieldPredictionUpdate {
    pub predicted_yield_tons: Option<f64>,
    pub confidence_score: Option<f64>,
    pub factors: Option<serde_json::Value>,
}
