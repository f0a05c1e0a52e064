//! Yield estimation
//!
//! `yield = base × weather × stage × field`, with a confidence that grows as
//! the season produces more data.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::entities::{CropCycle, CropType, GrowthStage, WeatherRecord};

pub const MODEL_VERSION: &str = "v1.0";

const BASE_CONFIDENCE: f64 = 0.7;
const MAX_CONFIDENCE: f64 = 0.95;
const INITIAL_CONFIDENCE: f64 = 0.6;

/// Output of the yield model
#[derive(Debug, Clone, PartialEq)]
pub struct YieldEstimate {
    pub yield_tons: f64,
    pub confidence: f64,
    pub factors: serde_json::Value,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Estimate recorded when a crop cycle is first registered
pub fn initial_estimate(crop_type: CropType) -> YieldEstimate {
    let base = crop_type.base_yield_tons();
    YieldEstimate {
        yield_tons: base,
        confidence: INITIAL_CONFIDENCE,
        factors: json!({
            "base_yield": base,
            "stage": "initial",
            "data_availability": "limited",
        }),
    }
}

/// (temperature score, rainfall score) from the season's weather rows
fn weather_scores(crop_type: CropType, weather: &[WeatherRecord]) -> (f64, f64) {
    if weather.is_empty() {
        return (1.0, 1.0);
    }

    let avg_temp =
        weather.iter().map(|w| w.temperature_max).sum::<f64>() / weather.len() as f64;
    let total_rain: f64 = weather.iter().map(|w| w.rainfall_mm).sum();

    let optimal_temp = crop_type.optimal_temperature();
    let temperature = if avg_temp > optimal_temp + 5.0 {
        0.85
    } else if avg_temp < optimal_temp - 5.0 {
        0.9
    } else {
        1.0
    };

    let optimal_rain = crop_type.optimal_rainfall();
    let rainfall = if total_rain < optimal_rain * 0.5 {
        0.8
    } else if total_rain > optimal_rain * 1.5 {
        0.85
    } else {
        1.0
    };

    (temperature, rainfall)
}

fn stage_factor(stage: GrowthStage) -> f64 {
    match stage {
        GrowthStage::Vegetative => 0.7,
        GrowthStage::Flowering => 0.85,
        GrowthStage::Fruiting => 0.95,
        _ => 1.0,
    }
}

fn field_size_factor(acres: Option<f64>) -> f64 {
    match acres {
        Some(a) if a < 2.0 => 1.1,
        Some(a) if a > 10.0 => 0.95,
        _ => 1.0,
    }
}

/// Estimate yield (tons per acre) for a crop from its season's weather
pub fn estimate(crop: &CropCycle, weather: &[WeatherRecord], today: NaiveDate) -> YieldEstimate {
    let base = crop.crop_type.base_yield_tons();
    let (temperature_score, rainfall_score) = weather_scores(crop.crop_type, weather);
    let weather_factor = if weather.is_empty() {
        1.0
    } else {
        (temperature_score + rainfall_score) / 2.0
    };
    let stage = stage_factor(crop.current_stage);
    let field = field_size_factor(crop.field_size_acres);
    let days = crop.days_since_sowing(today);

    let mut confidence = BASE_CONFIDENCE;
    if weather.len() > 10 {
        confidence += 0.1;
    }
    if days > 60 {
        confidence += 0.1;
    }
    if matches!(
        crop.current_stage,
        GrowthStage::Fruiting | GrowthStage::Harvesting
    ) {
        confidence += 0.1;
    }
    let confidence = confidence.min(MAX_CONFIDENCE);

    YieldEstimate {
        yield_tons: round2(base * weather_factor * stage * field),
        confidence: round2(confidence),
        factors: json!({
            "base_yield": base,
            "weather_factor": round2(weather_factor),
            "stage_factor": round2(stage),
            "field_size_factor": round2(field),
            "temperature_score": round2(temperature_score),
            "rainfall_score": round2(rainfall_score),
            "days_since_sowing": days,
            "current_stage": crop.current_stage.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ProfileId;
    use crate::test_utils::{test_crop_cycle_sown, test_weather_with, TEST_LOCATION};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn crop(stage: GrowthStage, days: i64, acres: Option<f64>) -> CropCycle {
        let mut crop = test_crop_cycle_sown(
            ProfileId::new(),
            CropType::Rice,
            today() - Duration::days(days),
        );
        crop.current_stage = stage;
        crop.field_size_acres = acres;
        crop
    }

    fn rows(n: usize, temp: f64, rain: f64) -> Vec<WeatherRecord> {
        (0..n)
            .map(|i| {
                test_weather_with(
                    TEST_LOCATION,
                    today() - Duration::days(i as i64),
                    temp,
                    70.0,
                    rain,
                )
            })
            .collect()
    }

    #[test]
    fn initial_estimate_uses_base_yield() {
        let est = initial_estimate(CropType::Wheat);
        assert_eq!(est.yield_tons, 3.0);
        assert_eq!(est.confidence, 0.6);
        assert_eq!(est.factors["stage"], "initial");
        assert_eq!(est.factors["data_availability"], "limited");
    }

    #[test]
    fn no_weather_means_neutral_weather_factor() {
        let est = estimate(&crop(GrowthStage::Sowing, 5, Some(5.0)), &[], today());
        assert_eq!(est.yield_tons, 2.8);
        assert_eq!(est.confidence, 0.7);
        assert_eq!(est.factors["weather_factor"], 1.0);
    }

    #[test]
    fn vegetative_small_field() {
        // 2.8 × 1 × 0.7 × 1.1 = 2.156
        let est = estimate(&crop(GrowthStage::Vegetative, 40, Some(1.5)), &[], today());
        assert_eq!(est.yield_tons, 2.16);
        assert_eq!(est.factors["field_size_factor"], 1.1);
    }

    #[test]
    fn hot_dry_season_penalised() {
        // rice optimum 28°C / 1200 mm: avg 35 is too hot, 12 × 5 = 60 mm too dry
        let weather = rows(12, 35.0, 5.0);
        let est = estimate(&crop(GrowthStage::Flowering, 70, Some(5.0)), &weather, today());

        assert_eq!(est.factors["temperature_score"], 0.85);
        assert_eq!(est.factors["rainfall_score"], 0.8);
        // 2.8 × 0.825 × 0.85 = 1.9635
        assert_eq!(est.yield_tons, 1.96);
        assert_eq!(est.confidence, 0.9);
    }

    #[test]
    fn confidence_capped() {
        let weather = rows(15, 28.0, 100.0);
        let est = estimate(&crop(GrowthStage::Fruiting, 100, Some(20.0)), &weather, today());
        assert_eq!(est.confidence, 0.95);
        assert_eq!(est.factors["field_size_factor"], 0.95);
    }
}
