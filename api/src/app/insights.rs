//! Derived figures for intelligence reports
//!
//! Regional insights, warning guidance, seasonal deviation analysis and
//! economic summaries. Everything here is a pure function of stored rows.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::app::yield_model::round2;
use crate::domain::entities::{
    AreaIntelligence, CommunityAlert, CropCycle, DecisionWarning, EconomicImpact,
    NewSeasonalComparison, RiskLevel, SeasonalComparison, WeatherRecord,
};

/// Regional score above which an area counts as under pressure
pub const PRESSURE_THRESHOLD: f64 = 0.7;

// ============================================================================
// Regional insights
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CommunityTrend {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: RiskLevel,
    pub description: String,
    pub affected_radius: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalInsights {
    pub overall_risk_level: RiskLevel,
    pub dominant_concerns: Vec<String>,
    pub community_trends: Vec<CommunityTrend>,
    pub preventive_recommendations: Vec<String>,
}

pub fn regional_insights(area: &AreaIntelligence, alerts: &[CommunityAlert]) -> RegionalInsights {
    let risks = &area.regional_risks;
    let mut dominant_concerns = Vec::new();
    let mut preventive_recommendations = Vec::new();

    let checks = [
        (
            risks.disease_pressure,
            "High disease pressure in the area",
            "Consider preventive fungicide application",
        ),
        (
            risks.pest_activity,
            "Increased pest activity detected",
            "Monitor for pest infestations",
        ),
        (
            risks.weather_stress,
            "Weather stress conditions present",
            "Adjust irrigation and protection measures",
        ),
    ];
    for (score, concern, recommendation) in checks {
        if score > PRESSURE_THRESHOLD {
            dominant_concerns.push(concern.to_string());
            preventive_recommendations.push(recommendation.to_string());
        }
    }

    let peak = risks
        .disease_pressure
        .max(risks.pest_activity)
        .max(risks.weather_stress);
    let overall_risk_level = if peak > PRESSURE_THRESHOLD {
        RiskLevel::High
    } else if peak > 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RegionalInsights {
        overall_risk_level,
        dominant_concerns,
        community_trends: alerts
            .iter()
            .map(|a| CommunityTrend {
                alert_type: a.alert_type.clone(),
                severity: a.severity,
                description: a.description.clone(),
                affected_radius: format!("{} km", a.affected_radius_km),
            })
            .collect(),
        preventive_recommendations,
    }
}

// ============================================================================
// Decision warnings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicConsequences {
    pub short_term_loss: f64,
    pub long_term_loss: f64,
    pub cumulative_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeBenefits {
    pub yield_improvement: &'static str,
    pub cost_reduction: &'static str,
    pub soil_health: &'static str,
    pub market_advantage: &'static str,
}

pub fn actionable_steps(warning: &DecisionWarning) -> Vec<String> {
    let steps: &[&str] = match warning.warning_type.as_str() {
        "crop_rotation_risk" => &[
            "Consider planting legumes or oilseeds next season",
            "Test soil for nutrient deficiencies",
            "Plan crop rotation schedule for next 3 years",
        ],
        _ => &["Review current practices", "Consult agricultural expert"],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

pub fn economic_consequences(warning: &DecisionWarning) -> EconomicConsequences {
    let loss = warning.potential_loss_estimate;
    EconomicConsequences {
        short_term_loss: round2(loss * 0.3),
        long_term_loss: round2(loss * 0.7),
        cumulative_impact: round2(loss * 1.2),
    }
}

pub fn alternative_benefits() -> AlternativeBenefits {
    AlternativeBenefits {
        yield_improvement: "15-20%",
        cost_reduction: "10-15%",
        soil_health: "Significant improvement",
        market_advantage: "Better prices for diversified crops",
    }
}

// ============================================================================
// Seasonal comparison
// ============================================================================

/// Label of the season being analysed
pub const CURRENT_SEASON: &str = "current";

/// Weather totals of one crop cycle compared with the optimum for `crop`
pub fn seasonal_row(
    crop: &CropCycle,
    compared: &CropCycle,
    label: String,
    weather: &[WeatherRecord],
) -> NewSeasonalComparison {
    let total_rainfall: f64 = weather.iter().map(|w| w.rainfall_mm).sum();
    let avg_temperature = if weather.is_empty() {
        0.0
    } else {
        weather.iter().map(|w| w.temperature_max).sum::<f64>() / weather.len() as f64
    };
    let optimal_rain = crop.crop_type.optimal_rainfall();
    let optimal_temp = crop.crop_type.optimal_temperature();

    NewSeasonalComparison {
        crop_cycle_id: crop.id,
        comparison_season: label,
        compared_cycle_id: compared.id,
        total_rainfall_mm: round2(total_rainfall),
        avg_temperature: round2(avg_temperature),
        rainfall_deviation_percent: round2((total_rainfall - optimal_rain) / optimal_rain * 100.0),
        temperature_deviation_percent: if weather.is_empty() {
            0.0
        } else {
            round2((avg_temperature - optimal_temp) / optimal_temp * 100.0)
        },
        yield_tons: compared.actual_yield_tons,
    }
}

pub fn previous_label(n: usize) -> String {
    format!("previous_{}", n)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceAnalysis {
    pub rainfall_difference: f64,
    pub temperature_difference: f64,
    pub key_changes: Vec<String>,
}

/// Current season against the one before it; `None` when either is missing
pub fn difference_analysis(comparisons: &[SeasonalComparison]) -> Option<DifferenceAnalysis> {
    let current = comparisons
        .iter()
        .find(|c| c.comparison_season == CURRENT_SEASON)?;
    let previous = comparisons
        .iter()
        .find(|c| c.comparison_season == previous_label(1))?;

    let rainfall_difference =
        round2(current.rainfall_deviation_percent - previous.rainfall_deviation_percent);
    let temperature_difference =
        round2(current.temperature_deviation_percent - previous.temperature_deviation_percent);
    let direction = |d: f64| if d > 0.0 { "higher" } else { "lower" };

    Some(DifferenceAnalysis {
        rainfall_difference,
        temperature_difference,
        key_changes: vec![
            format!(
                "Rainfall is {} by {}%",
                direction(rainfall_difference),
                rainfall_difference.abs()
            ),
            format!(
                "Temperature is {} by {}%",
                direction(temperature_difference),
                temperature_difference.abs()
            ),
        ],
    })
}

pub fn seasonal_insights(analysis: Option<&DifferenceAnalysis>) -> Vec<String> {
    let Some(analysis) = analysis else {
        return Vec::new();
    };
    let mut insights = Vec::new();
    if analysis.rainfall_difference.abs() > 20.0 {
        insights.push(format!(
            "Significant rainfall variation detected: {} conditions",
            if analysis.rainfall_difference > 0.0 {
                "excess"
            } else {
                "deficit"
            }
        ));
    }
    if analysis.temperature_difference.abs() > 15.0 {
        insights.push(format!(
            "Temperature patterns changed significantly: {} season",
            if analysis.temperature_difference > 0.0 {
                "warmer"
            } else {
                "cooler"
            }
        ));
    }
    insights
}

// ============================================================================
// Economic impact
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicSummary {
    pub total_invested: f64,
    pub total_saved: f64,
    pub net_benefit: f64,
    pub average_roi: f64,
    pub total_actions: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RoiByType {
    pub count: u64,
    pub total_roi: f64,
    pub avg_roi: f64,
}

pub fn economic_summary(impacts: &[EconomicImpact]) -> EconomicSummary {
    let total_invested: f64 = impacts.iter().map(|i| i.estimated_cost).sum();
    let total_saved: f64 = impacts.iter().map(|i| i.estimated_loss_prevented).sum();
    let average_roi = if impacts.is_empty() {
        0.0
    } else {
        impacts.iter().map(|i| i.roi_percentage).sum::<f64>() / impacts.len() as f64
    };
    EconomicSummary {
        total_invested: round2(total_invested),
        total_saved: round2(total_saved),
        net_benefit: round2(total_saved - total_invested),
        average_roi: round2(average_roi),
        total_actions: impacts.len(),
    }
}

/// ROI grouped by the advisory type behind each impact ("unknown" without one)
pub fn roi_by_advisory_type(impacts: &[EconomicImpact]) -> BTreeMap<String, RoiByType> {
    let mut by_type: BTreeMap<String, RoiByType> = BTreeMap::new();
    for impact in impacts {
        let key = impact
            .advisory_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let entry = by_type.entry(key).or_default();
        entry.count += 1;
        entry.total_roi += impact.roi_percentage;
        entry.avg_roi = round2(entry.total_roi / entry.count as f64);
    }
    by_type
}
