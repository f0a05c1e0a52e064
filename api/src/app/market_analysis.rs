//! Price series analysis
//!
//! Trend summaries, volatility, a least-squares forecast and the synthetic
//! mandi feed used to seed empty deployments.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::app::yield_model::round2;
use crate::domain::entities::{CropType, MarketPrice, NewMarketPrice};

/// Most points the forecast is fitted over
pub const MAX_HISTORY_POINTS: usize = 30;
/// Fewest points the forecast will accept
pub const MIN_HISTORY_POINTS: usize = 7;
/// Longest forecast horizon in days
pub const MAX_FORECAST_DAYS: u32 = 30;

const JITTER: f64 = 0.05;
const VOLATILITY_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Price movement summary for one crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTrend {
    pub current_price: f64,
    pub previous_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub seven_day_average: Option<f64>,
    pub thirty_day_average: Option<f64>,
    pub trend_direction: TrendDirection,
    pub volatility: f64,
}

/// Per-crop trends over a newest-first price list. Crops with fewer than
/// two points are left out.
pub fn price_trends(prices: &[MarketPrice]) -> BTreeMap<CropType, PriceTrend> {
    let mut by_crop: BTreeMap<CropType, Vec<f64>> = BTreeMap::new();
    for p in prices {
        by_crop.entry(p.crop_type).or_default().push(p.price_per_quintal);
    }

    by_crop
        .into_iter()
        .filter(|(_, series)| series.len() >= 2)
        .map(|(crop, series)| (crop, trend_for(&series)))
        .collect()
}

fn average_of_first(series: &[f64], n: usize) -> Option<f64> {
    (series.len() >= n).then(|| round2(series[..n].iter().sum::<f64>() / n as f64))
}

fn trend_for(series: &[f64]) -> PriceTrend {
    let latest = series[0];
    let previous = series[1];
    let change = latest - previous;
    let change_percent = change / previous * 100.0;

    let direction = if change_percent > 2.0 {
        TrendDirection::Up
    } else if change_percent < -2.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    PriceTrend {
        current_price: latest,
        previous_price: previous,
        price_change: round2(change),
        price_change_percent: round2(change_percent),
        seven_day_average: average_of_first(series, 7),
        thirty_day_average: average_of_first(series, 30),
        trend_direction: direction,
        volatility: volatility(&series[..series.len().min(VOLATILITY_WINDOW)]),
    }
}

/// Population standard deviation of successive returns, in percent
pub fn volatility(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = series.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    (variance.sqrt() * 10_000.0).round() / 100.0
}

/// Ordinary least-squares line over `y` at x = 0, 1, 2, ...
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn fit(y: &[f64]) -> Self {
        let n = y.len() as f64;
        if y.is_empty() {
            return Self {
                slope: 0.0,
                intercept: 0.0,
            };
        }
        let sum_x: f64 = (0..y.len()).map(|i| i as f64).sum();
        let sum_y: f64 = y.iter().sum();
        let sum_xy: f64 = y.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
        let sum_xx: f64 = (0..y.len()).map(|i| (i * i) as f64).sum();

        let denominator = n * sum_xx - sum_x * sum_x;
        let slope = if denominator == 0.0 {
            0.0
        } else {
            (n * sum_xy - sum_x * sum_y) / denominator
        };
        Self {
            slope,
            intercept: (sum_y - slope * sum_x) / n,
        }
    }

    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    pub fn direction(&self) -> TrendDirection {
        if self.slope > 0.0 {
            TrendDirection::Up
        } else if self.slope < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePrediction {
    pub date: NaiveDate,
    pub predicted_price: f64,
    pub confidence: f64,
    pub trend_direction: TrendDirection,
}

/// Project `days` prices past the end of a chronological series.
/// Day `i` reads the fitted line at x = n + i.
pub fn predict_prices<R: Rng>(
    history: &[f64],
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<PricePrediction> {
    let trend = LinearTrend::fit(history);
    let n = history.len() as f64;

    (1..=days)
        .map(|i| {
            let jitter = 1.0 + rng.gen_range(-JITTER / 2.0..=JITTER / 2.0);
            PricePrediction {
                date: today + Duration::days(i64::from(i)),
                predicted_price: round2(trend.at(n + f64::from(i)) * jitter),
                confidence: round2((0.9 - 0.05 * f64::from(i)).max(0.5)),
                trend_direction: trend.direction(),
            }
        })
        .collect()
}

const SYNTHETIC_CROPS: [(CropType, f64); 6] = [
    (CropType::Rice, 2200.0),
    (CropType::Wheat, 2100.0),
    (CropType::Cotton, 6500.0),
    (CropType::Sugarcane, 320.0),
    (CropType::Maize, 1800.0),
    (CropType::Pulses, 4500.0),
];

const SYNTHETIC_MARKETS: [(&str, &str, &str); 5] = [
    ("Mandi Market", "Ludhiana", "Punjab"),
    ("Grain Market", "Karnal", "Haryana"),
    ("Cotton Market", "Ahmedabad", "Gujarat"),
    ("Sugar Market", "Lucknow", "Uttar Pradesh"),
    ("Pulse Market", "Indore", "Madhya Pradesh"),
];

pub const SYNTHETIC_DAYS: i64 = 30;

/// 30 days × 6 crops × 5 markets of noisy prices around fixed bases
pub fn synthetic_market_data<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<NewMarketPrice> {
    let mut rows = Vec::with_capacity(
        SYNTHETIC_DAYS as usize * SYNTHETIC_CROPS.len() * SYNTHETIC_MARKETS.len(),
    );

    for day in 0..SYNTHETIC_DAYS {
        let date = today - Duration::days(day);
        let seasonal =
            1.0 + (day as f64 / SYNTHETIC_DAYS as f64 * std::f64::consts::TAU).sin() * 0.05;

        for (crop_type, base) in SYNTHETIC_CROPS {
            for (market, district, state) in SYNTHETIC_MARKETS {
                let noise = 1.0 + rng.gen_range(-0.05..=0.05);
                rows.push(NewMarketPrice {
                    crop_type,
                    market_name: market.to_string(),
                    district: district.to_string(),
                    state: state.to_string(),
                    price_per_quintal: round2(base * noise * seasonal),
                    date,
                });
            }
        }
    }

    rows
}
