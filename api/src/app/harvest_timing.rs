//! Harvest timing
//!
//! Maturity of a crop cycle, its harvest window and the quality risk of
//! harvesting too early or too late.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::entities::{CropCycle, WeatherRecord};

/// Days of forecast considered when planning the harvest
pub const FORECAST_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityStage {
    EarlyVegetative,
    MidGrowth,
    LateGrowth,
    Mature,
}

impl MaturityStage {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage < 60.0 {
            MaturityStage::EarlyVegetative
        } else if percentage < 80.0 {
            MaturityStage::MidGrowth
        } else if percentage < 95.0 {
            MaturityStage::LateGrowth
        } else {
            MaturityStage::Mature
        }
    }
}

/// Window relative to today, in days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarvestWindow {
    pub start_days: i32,
    pub end_days: i32,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityRisk {
    pub risk_level: &'static str,
    pub yield_loss_percent: f64,
    pub quality_impact: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityRisks {
    pub early_harvest: QualityRisk,
    pub late_harvest: QualityRisk,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestOptimization {
    pub current_maturity_percentage: i64,
    pub optimal_harvest_date: NaiveDate,
    pub days_to_optimal: i64,
    pub maturity_stage: MaturityStage,
    pub weather_forecast: Vec<WeatherRecord>,
    pub harvest_window: HarvestWindow,
    pub quality_risks: QualityRisks,
}

/// Maturity as a percentage of the crop's sowing-to-harvest duration, capped at 100
pub fn maturity_percentage(crop: &CropCycle, today: NaiveDate) -> f64 {
    let days = crop.days_since_sowing(today).max(0) as f64;
    (days / crop.crop_type.harvest_days() as f64 * 100.0).min(100.0)
}

/// `forecast` holds upcoming weather rows for the crop's location, soonest first
pub fn optimize(
    crop: &CropCycle,
    forecast: Vec<WeatherRecord>,
    today: NaiveDate,
) -> HarvestOptimization {
    let harvest_days = crop.crop_type.harvest_days();
    let maturity = maturity_percentage(crop, today);

    HarvestOptimization {
        current_maturity_percentage: maturity.round() as i64,
        optimal_harvest_date: crop.sowing_date + Duration::days(harvest_days),
        days_to_optimal: (harvest_days - crop.days_since_sowing(today)).max(0),
        maturity_stage: MaturityStage::for_percentage(maturity),
        harvest_window: harvest_window(maturity, &forecast),
        quality_risks: quality_risks(maturity),
        weather_forecast: forecast,
    }
}

fn rain_expected(forecast: &[WeatherRecord]) -> bool {
    forecast.iter().any(|w| w.rainfall_mm > 10.0)
}

fn heat_expected(forecast: &[WeatherRecord]) -> bool {
    forecast.iter().any(|w| w.temperature_max > 35.0)
}

pub fn harvest_window(maturity: f64, forecast: &[WeatherRecord]) -> HarvestWindow {
    let (start_days, end_days) = if (90.0..=105.0).contains(&maturity) {
        (0, 7)
    } else if (85.0..=110.0).contains(&maturity) {
        (-3, 10)
    } else {
        (0, 0)
    };

    let mut risk_factors = Vec::new();
    if rain_expected(forecast) {
        risk_factors.push("Rain may delay harvesting".to_string());
    }
    if heat_expected(forecast) {
        risk_factors.push("High heat may affect crop quality".to_string());
    }

    HarvestWindow {
        start_days,
        end_days,
        risk_factors,
    }
}

pub fn quality_risks(maturity: f64) -> QualityRisks {
    let early = maturity < 85.0;
    let late = maturity > 105.0;
    QualityRisks {
        early_harvest: QualityRisk {
            risk_level: if early { "high" } else { "low" },
            yield_loss_percent: if early { 15.0 + (85.0 - maturity) } else { 5.0 },
            quality_impact: "Reduced grain size and market value",
        },
        late_harvest: QualityRisk {
            risk_level: if late { "high" } else { "low" },
            yield_loss_percent: if late { 10.0 + (maturity - 105.0) } else { 3.0 },
            quality_impact: "Lodging risk, grain shattering, reduced market value",
        },
    }
}

pub fn recommendations(optimization: &HarvestOptimization) -> Vec<String> {
    let maturity = optimization.current_maturity_percentage;
    let mut recommendations = Vec::new();

    if maturity < 85 {
        recommendations.push("Crop is not yet mature. Wait for optimal harvest time.".to_string());
    } else if maturity >= 90 {
        recommendations
            .push("Optimal harvest window. Plan harvesting within the next 7 days.".to_string());
    }

    if rain_expected(&optimization.weather_forecast) {
        recommendations.push(
            "Rain expected. Consider harvesting before rainfall to prevent damage.".to_string(),
        );
    }

    recommendations
}
