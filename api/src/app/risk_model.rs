//! Crop risk rules
//!
//! Threshold rules that turn a week of weather and the crop's stage into
//! risk assessments, plus the figures shown next to a stored prediction.

use serde::Serialize;
use serde_json::json;

use crate::domain::entities::{
    CropCycle, GrowthStage, RiskAssessment, RiskLevel, RiskPrediction, RiskType, WeatherRecord,
};

pub const RISK_MODEL_VERSION: &str = "v1.0";

/// Days of weather history the rules look at
pub const WEATHER_WINDOW_DAYS: i64 = 7;

/// How long a stored prediction stays active
pub const PREDICTION_TTL_DAYS: i64 = 7;

const BASE_CONFIDENCE: f64 = 0.75;

/// Evaluate one risk type; `None` when nothing significant is detected.
///
/// `weather` is expected oldest first.
pub fn assess(
    risk_type: RiskType,
    crop: &CropCycle,
    weather: &[WeatherRecord],
) -> Option<RiskAssessment> {
    let acres = crop.acres();
    match risk_type {
        RiskType::Disease => disease_risk(acres, weather),
        RiskType::WaterStress => water_stress_risk(acres, weather),
        RiskType::HeatStress => heat_stress_risk(acres, weather),
        RiskType::NutrientDeficiency => nutrient_risk(acres, crop.current_stage),
        RiskType::Pest => None,
    }
}

/// Evaluate every requested type, keeping the ones that fire
pub fn assess_all(
    risk_types: &[RiskType],
    crop: &CropCycle,
    weather: &[WeatherRecord],
) -> Vec<RiskAssessment> {
    risk_types
        .iter()
        .filter_map(|t| assess(*t, crop, weather))
        .collect()
}

struct Rule {
    level: RiskLevel,
    probability: f64,
    days: i32,
    loss_per_acre: f64,
    prevention_per_acre: f64,
}

fn build(
    risk_type: RiskType,
    acres: f64,
    rule: Rule,
    strategies: &[&str],
    factors: serde_json::Value,
) -> RiskAssessment {
    let loss = acres * rule.loss_per_acre;
    RiskAssessment {
        risk_type,
        risk_level: rule.level,
        probability: rule.probability,
        time_to_impact_days: rule.days,
        confidence_score: BASE_CONFIDENCE,
        affected_area_percentage: 100.0,
        economic_impact_estimate: loss,
        prevention_cost_estimate: acres * rule.prevention_per_acre,
        predicted_loss_if_ignored: loss,
        mitigation_strategies: strategies.iter().map(|s| s.to_string()).collect(),
        contributing_factors: factors,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn max_temperature(weather: &[WeatherRecord]) -> Option<f64> {
    weather
        .iter()
        .map(|w| w.temperature_max)
        .max_by(|a, b| a.total_cmp(b))
}

fn disease_risk(acres: f64, weather: &[WeatherRecord]) -> Option<RiskAssessment> {
    if weather.is_empty() {
        return None;
    }
    let humidity = mean(weather.iter().map(|w| w.humidity));
    let temp = mean(weather.iter().map(|w| w.temperature_max));
    let rainfall: f64 = weather.iter().map(|w| w.rainfall_mm).sum();

    if humidity > 80.0 && (25.0..=30.0).contains(&temp) && rainfall > 20.0 {
        return Some(build(
            RiskType::Disease,
            acres,
            Rule {
                level: RiskLevel::Critical,
                probability: 0.9,
                days: 3,
                loss_per_acre: 8000.0,
                prevention_per_acre: 1500.0,
            },
            &[
                "Apply preventive fungicide immediately",
                "Improve field drainage",
                "Reduce irrigation frequency",
                "Monitor for early symptoms",
            ],
            json!({
                "high_humidity": humidity,
                "optimal_temperature": temp,
                "excess_rainfall": rainfall,
            }),
        ));
    }

    if humidity > 70.0 && (20.0..=35.0).contains(&temp) {
        return Some(build(
            RiskType::Disease,
            acres,
            Rule {
                level: RiskLevel::High,
                probability: 0.7,
                days: 5,
                loss_per_acre: 5000.0,
                prevention_per_acre: 1000.0,
            },
            &[
                "Monitor weather conditions closely",
                "Prepare fungicide application",
                "Ensure proper field ventilation",
            ],
            json!({
                "moderate_humidity": humidity,
                "temperature_range": temp,
            }),
        ));
    }

    None
}

fn water_stress_risk(acres: f64, weather: &[WeatherRecord]) -> Option<RiskAssessment> {
    let max_temp = max_temperature(weather)?;
    // latest three days
    let recent_rain: f64 = weather.iter().rev().take(3).map(|w| w.rainfall_mm).sum();

    (recent_rain < 2.0 && max_temp > 35.0).then(|| {
        build(
            RiskType::WaterStress,
            acres,
            Rule {
                level: RiskLevel::Critical,
                probability: 0.95,
                days: 2,
                loss_per_acre: 10000.0,
                prevention_per_acre: 2000.0,
            },
            &[
                "Immediate irrigation required",
                "Apply mulch to reduce evaporation",
                "Consider drought-resistant varieties next season",
            ],
            json!({
                "no_rainfall": recent_rain,
                "extreme_heat": max_temp,
            }),
        )
    })
}

fn heat_stress_risk(acres: f64, weather: &[WeatherRecord]) -> Option<RiskAssessment> {
    let max_temp = max_temperature(weather)?;

    if max_temp > 40.0 {
        Some(build(
            RiskType::HeatStress,
            acres,
            Rule {
                level: RiskLevel::Critical,
                probability: 0.95,
                days: 1,
                loss_per_acre: 7000.0,
                prevention_per_acre: 1000.0,
            },
            &[
                "Provide shade if possible",
                "Increase irrigation frequency",
                "Apply anti-transpirants",
                "Monitor for heat damage symptoms",
            ],
            json!({ "extreme_temperature": max_temp }),
        ))
    } else if max_temp > 37.0 {
        Some(build(
            RiskType::HeatStress,
            acres,
            Rule {
                level: RiskLevel::High,
                probability: 0.75,
                days: 3,
                loss_per_acre: 4000.0,
                prevention_per_acre: 800.0,
            },
            &[
                "Increase irrigation",
                "Monitor crop stress indicators",
                "Consider protective measures",
            ],
            json!({ "high_temperature": max_temp }),
        ))
    } else {
        None
    }
}

fn nutrient_risk(acres: f64, stage: GrowthStage) -> Option<RiskAssessment> {
    matches!(stage, GrowthStage::Flowering | GrowthStage::Fruiting).then(|| {
        build(
            RiskType::NutrientDeficiency,
            acres,
            Rule {
                level: RiskLevel::Medium,
                probability: 0.6,
                days: 10,
                loss_per_acre: 3000.0,
                prevention_per_acre: 1200.0,
            },
            &[
                "Apply balanced fertilizer",
                "Conduct soil test",
                "Monitor leaf color and growth",
            ],
            json!({
                "critical_growth_stage": stage.to_string(),
                "high_nutrient_demand": true,
            }),
        )
    })
}

// ============================================================================
// Presentation figures
// ============================================================================

/// How soon a farmer should act on a prediction
pub fn urgency_level(probability: f64, time_to_impact_days: i32) -> RiskLevel {
    if probability >= 0.8 && time_to_impact_days <= 3 {
        RiskLevel::Critical
    } else if probability >= 0.6 && time_to_impact_days <= 5 {
        RiskLevel::High
    } else if probability >= 0.4 && time_to_impact_days <= 7 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Return on prevention spend in percent; zero when prevention is free
pub fn prevention_roi_percent(loss_if_ignored: f64, prevention_cost: f64) -> f64 {
    if prevention_cost <= 0.0 {
        return 0.0;
    }
    (loss_if_ignored - prevention_cost) / prevention_cost * 100.0
}

pub fn loss_prevention_insight(prediction: &RiskPrediction) -> String {
    let prevented = prediction.predicted_loss_if_ignored - prediction.prevention_cost_estimate;
    let roi = prevention_roi_percent(
        prediction.predicted_loss_if_ignored,
        prediction.prevention_cost_estimate,
    );
    format!(
        "Act now to prevent {} loss. Investing {} in prevention gives you {:.0}% return on investment by avoiding damage.",
        format_rupees(prevented),
        format_rupees(prediction.prevention_cost_estimate),
        roi
    )
}

/// 0-100 score mixing probability, money at stake and time to impact
pub fn action_priority(prediction: &RiskPrediction) -> u32 {
    let probability = prediction.probability * 100.0;
    let economic = (prediction.economic_impact_estimate / 100.0).min(100.0);
    let urgency = match prediction.time_to_impact_days {
        ..=3 => 100.0,
        4..=7 => 70.0,
        _ => 40.0,
    };
    ((probability + economic + urgency) / 3.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub potential_loss: String,
    pub prevention_cost: String,
    pub net_savings: String,
    pub roi_percentage: String,
    pub cost_benefit_ratio: String,
}

pub fn financial_summary(prediction: &RiskPrediction) -> FinancialSummary {
    let loss = prediction.predicted_loss_if_ignored;
    let cost = prediction.prevention_cost_estimate;
    let ratio = if cost > 0.0 { loss / cost } else { 0.0 };
    FinancialSummary {
        potential_loss: format_rupees(loss),
        prevention_cost: format_rupees(cost),
        net_savings: format_rupees(loss - cost),
        roi_percentage: format!("{:.0}%", prevention_roi_percent(loss, cost)),
        cost_benefit_ratio: format!("{:.1}", ratio),
    }
}

/// Whole rupees with thousands separators, e.g. `₹40,000`
pub fn format_rupees(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{}₹{}", sign, grouped)
}
