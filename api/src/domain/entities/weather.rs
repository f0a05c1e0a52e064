//! Weather domain entities
//!
//! A `WeatherRecord` is one cached observation per location and day. The
//! provider port returns `WeatherObservation`s which the service stores.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GeoPoint;

/// Where a weather observation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    Api,
    Synthetic,
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherSource::Api => write!(f, "api"),
            WeatherSource::Synthetic => write!(f, "synthetic"),
        }
    }
}

impl std::str::FromStr for WeatherSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" => Ok(WeatherSource::Api),
            "synthetic" => Ok(WeatherSource::Synthetic),
            _ => Err(format!("Unknown weather source: {}", s)),
        }
    }
}

/// One day of forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity: f64,
    pub rainfall_mm: f64,
    pub weather_condition: String,
}

/// Weather as reported by a provider for one location and day
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity: f64,
    pub rainfall_mm: f64,
    pub wind_speed: f64,
    pub weather_condition: String,
    pub forecast: Vec<ForecastDay>,
    pub source: WeatherSource,
}

/// A stored weather row
#[derive(Debug, Clone, Serialize)]
pub struct WeatherRecord {
    pub id: Uuid,
    pub location_lat: f64,
    pub location_lng: f64,
    pub date: NaiveDate,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity: f64,
    pub rainfall_mm: f64,
    pub wind_speed: f64,
    pub weather_condition: String,
    pub forecast_data: Vec<ForecastDay>,
    pub source: WeatherSource,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl WeatherRecord {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.location_lat, self.location_lng)
    }
}

/// Data needed to upsert a weather row
#[derive(Debug, Clone)]
pub struct NewWeatherRecord {
    pub location: GeoPoint,
    pub date: NaiveDate,
    pub observation: WeatherObservation,
    pub expires_at: DateTime<Utc>,
}
