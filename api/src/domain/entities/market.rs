//! Market price domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CropType;

/// A daily mandi price for one crop at one market
#[derive(Debug, Clone, Serialize)]
pub struct MarketPrice {
    pub id: Uuid,
    pub crop_type: CropType,
    pub market_name: String,
    pub district: String,
    pub state: String,
    pub price_per_quintal: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A price row to upsert; (crop_type, market_name, district, state, date) is the key
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMarketPrice {
    pub crop_type: CropType,
    pub market_name: String,
    pub district: String,
    pub state: String,
    pub price_per_quintal: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct MarketPriceFilter {
    pub crop_type: Option<CropType>,
    pub state: Option<String>,
    pub limit: Option<u64>,
}
