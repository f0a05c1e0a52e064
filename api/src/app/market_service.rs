//! Market intelligence service

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::access::require_role;
use crate::app::market_analysis::{
    predict_prices, price_trends, synthetic_market_data, PricePrediction, PriceTrend,
    MAX_FORECAST_DAYS, MAX_HISTORY_POINTS, MIN_HISTORY_POINTS,
};
use crate::domain::entities::{
    CropType, MarketPrice, MarketPriceFilter, NewMarketPrice, Profile, Role,
};
use crate::domain::ports::MarketPriceRepository;
use crate::error::AppError;

/// Rows fetched per requested day
const ROWS_PER_DAY: u64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PriceListing {
    pub prices: Vec<MarketPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<BTreeMap<CropType, PriceTrend>>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MarketPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceForecast {
    pub crop_type: CropType,
    pub predictions: Vec<PricePrediction>,
    pub model: &'static str,
    pub data_points: usize,
}

/// Service for mandi prices
pub struct MarketService<MR>
where
    MR: MarketPriceRepository,
{
    prices: Arc<MR>,
}

impl<MR> MarketService<MR>
where
    MR: MarketPriceRepository,
{
    pub fn new(prices: Arc<MR>) -> Self {
        Self { prices }
    }

    /// Latest prices, newest first, optionally with per-crop trends
    pub async fn list(
        &self,
        crop_type: Option<CropType>,
        state: Option<String>,
        days: u32,
        with_trends: bool,
    ) -> Result<PriceListing, AppError> {
        let prices = self
            .prices
            .list(&MarketPriceFilter {
                crop_type,
                state,
                limit: Some(u64::from(days.max(1)) * ROWS_PER_DAY),
            })
            .await?;

        let trends = (with_trends && !prices.is_empty()).then(|| price_trends(&prices));
        Ok(PriceListing {
            count: prices.len(),
            prices,
            trends,
        })
    }

    /// Admin bulk upsert; each row succeeds or fails on its own
    pub async fn upsert_many(
        &self,
        profile: &Profile,
        rows: &[NewMarketPrice],
    ) -> Result<Vec<UpsertResult>, AppError> {
        require_role(profile, Role::Admin)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            if row.price_per_quintal <= 0.0 || row.market_name.trim().is_empty() {
                results.push(UpsertResult {
                    success: false,
                    data: None,
                    error: Some("Price must be positive and market name set".to_string()),
                });
                continue;
            }
            match self.prices.upsert(row).await {
                Ok(stored) => results.push(UpsertResult {
                    success: true,
                    data: Some(stored),
                    error: None,
                }),
                Err(e) => results.push(UpsertResult {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }),
            }
        }
        Ok(results)
    }

    /// Forecast the next `days` prices for a crop from its latest 30 points
    pub async fn predict(
        &self,
        crop_type: CropType,
        days: u32,
        today: NaiveDate,
    ) -> Result<PriceForecast, AppError> {
        if days > MAX_FORECAST_DAYS {
            return Err(AppError::BadRequest(format!(
                "days must be at most {}",
                MAX_FORECAST_DAYS
            )));
        }

        let latest = self
            .prices
            .list(&MarketPriceFilter {
                crop_type: Some(crop_type),
                state: None,
                limit: Some(MAX_HISTORY_POINTS as u64),
            })
            .await?;

        if latest.len() < MIN_HISTORY_POINTS {
            return Err(AppError::BadRequest("Insufficient historical data".to_string()));
        }

        let history: Vec<f64> = latest.iter().rev().map(|p| p.price_per_quintal).collect();
        let predictions = predict_prices(&history, days, today, &mut rand::thread_rng());

        Ok(PriceForecast {
            crop_type,
            predictions,
            model: "linear_regression",
            data_points: history.len(),
        })
    }

    /// Seed the last 30 days with synthetic prices. Returns rows written.
    pub async fn generate_synthetic(&self, today: NaiveDate) -> Result<usize, AppError> {
        let rows = synthetic_market_data(today, &mut rand::thread_rng());
        for row in &rows {
            self.prices.upsert(row).await?;
        }
        tracing::info!(count = rows.len(), "Synthetic market data generated");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        test_admin, test_farmer, test_market_price, InMemoryMarketPriceRepository,
    };
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 10).unwrap()
    }

    fn repo_with_series(crop: CropType, n: i64) -> InMemoryMarketPriceRepository {
        (0..n).fold(InMemoryMarketPriceRepository::new(), |repo, i| {
            repo.with_price(test_market_price(
                crop,
                2000.0 + 10.0 * (n - i) as f64,
                today() - Duration::days(i),
            ))
        })
    }

    #[tokio::test]
    async fn list_limits_and_trends() {
        let service = MarketService::new(Arc::new(repo_with_series(CropType::Wheat, 40)));

        let listing = service.list(None, None, 3, true).await.unwrap();
        assert_eq!(listing.count, 30);
        assert_eq!(listing.prices[0].date, today());
        let trends = listing.trends.unwrap();
        assert_eq!(trends[&CropType::Wheat].price_change, 10.0);

        let plain = service.list(None, None, 30, false).await.unwrap();
        assert_eq!(plain.count, 40);
        assert!(plain.trends.is_none());
    }

    #[tokio::test]
    async fn prediction_needs_seven_points() {
        let service = MarketService::new(Arc::new(repo_with_series(CropType::Rice, 6)));
        assert!(matches!(
            service.predict(CropType::Rice, 7, today()).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn prediction_horizon_is_capped() {
        let service = MarketService::new(Arc::new(repo_with_series(CropType::Rice, 10)));

        let too_far = service.predict(CropType::Rice, 100_000_000, today()).await;
        assert!(matches!(too_far, Err(AppError::BadRequest(_))));

        let longest = service.predict(CropType::Rice, 30, today()).await.unwrap();
        assert_eq!(longest.predictions.len(), 30);
    }

    #[tokio::test]
    async fn prediction_uses_at_most_thirty_points() {
        let service = MarketService::new(Arc::new(repo_with_series(CropType::Rice, 45)));
        let forecast = service.predict(CropType::Rice, 5, today()).await.unwrap();
        assert_eq!(forecast.data_points, 30);
        assert_eq!(forecast.predictions.len(), 5);
        assert_eq!(forecast.model, "linear_regression");
    }

    #[tokio::test]
    async fn upsert_requires_admin_and_validates_rows() {
        let repo = Arc::new(InMemoryMarketPriceRepository::new());
        let service = MarketService::new(repo.clone());
        let good = NewMarketPrice {
            crop_type: CropType::Cotton,
            market_name: "Cotton Market".to_string(),
            district: "Ahmedabad".to_string(),
            state: "Gujarat".to_string(),
            price_per_quintal: 6500.0,
            date: today(),
        };
        let bad = NewMarketPrice {
            price_per_quintal: -1.0,
            ..good.clone()
        };

        assert!(service
            .upsert_many(&test_farmer(), &[good.clone()])
            .await
            .is_err());

        let results = service
            .upsert_many(&test_admin(), &[good.clone(), bad, good])
            .await
            .unwrap();
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[2].success);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn synthetic_generation_is_idempotent_per_day() {
        let repo = Arc::new(InMemoryMarketPriceRepository::new());
        let service = MarketService::new(repo.clone());

        assert_eq!(service.generate_synthetic(today()).await.unwrap(), 900);
        service.generate_synthetic(today()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 900);
    }
}
