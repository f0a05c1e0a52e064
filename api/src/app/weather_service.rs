//! Weather service
//!
//! Read-through cache over the weather provider. Rows are keyed by the
//! location rounded to four decimals and the calendar date. When the
//! provider is down or unconfigured a synthetic observation is stored instead.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

use crate::domain::entities::{
    ForecastDay, GeoPoint, NewWeatherRecord, WeatherObservation, WeatherRecord, WeatherSource,
};
use crate::domain::ports::{WeatherProvider, WeatherRepository};
use crate::error::AppError;

const CONDITIONS: [&str; 3] = ["Clear", "Partly Cloudy", "Cloudy"];

/// Where a lookup was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Cache,
    Api,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherLookup {
    pub data: WeatherRecord,
    pub source: LookupSource,
}

/// Outcome of refreshing one location
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResult {
    pub location: GeoPoint,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<WeatherRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Random but plausible weather for when the provider is unavailable
pub fn synthetic_observation<R: Rng>(rng: &mut R, today: NaiveDate) -> WeatherObservation {
    let forecast = (0..5)
        .map(|i| ForecastDay {
            date: today + Duration::days(i),
            temperature_min: rng.gen_range(22.0..30.0),
            temperature_max: rng.gen_range(30.0..40.0),
            humidity: rng.gen_range(60.0..90.0),
            rainfall_mm: rng.gen_range(0.0..5.0),
            weather_condition: CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string(),
        })
        .collect();

    WeatherObservation {
        temperature_min: rng.gen_range(22.0..30.0),
        temperature_max: rng.gen_range(30.0..40.0),
        humidity: rng.gen_range(60.0..90.0),
        rainfall_mm: rng.gen_range(0.0..5.0),
        wind_speed: rng.gen_range(5.0..20.0),
        weather_condition: CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string(),
        forecast,
        source: WeatherSource::Synthetic,
    }
}

/// Service for cached weather
pub struct WeatherService<WR, P>
where
    WR: WeatherRepository,
    P: WeatherProvider,
{
    records: Arc<WR>,
    provider: Arc<P>,
    cache_ttl: Duration,
}

impl<WR, P> WeatherService<WR, P>
where
    WR: WeatherRepository,
    P: WeatherProvider,
{
    pub fn new(records: Arc<WR>, provider: Arc<P>, cache_ttl_hours: i64) -> Self {
        Self {
            records,
            provider,
            cache_ttl: Duration::hours(cache_ttl_hours),
        }
    }

    /// Weather for a location and day, from cache when fresh
    pub async fn get(
        &self,
        location: GeoPoint,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<WeatherLookup, AppError> {
        if !location.is_valid() {
            return Err(AppError::BadRequest(
                "Latitude and longitude out of range".to_string(),
            ));
        }
        let location = location.rounded();

        if let Some(cached) = self.records.find(&location, date).await? {
            if cached.is_fresh(now) {
                return Ok(WeatherLookup {
                    data: cached,
                    source: LookupSource::Cache,
                });
            }
        }

        Ok(WeatherLookup {
            data: self.refresh(location, date, now).await?,
            source: LookupSource::Api,
        })
    }

    /// Fetch and store the row for (location, date), falling back to synthetic data
    pub async fn refresh(
        &self,
        location: GeoPoint,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<WeatherRecord, AppError> {
        let location = location.rounded();
        let observation = match self.provider.fetch(&location, date).await {
            Ok(observation) => observation,
            Err(e) => {
                tracing::warn!(
                    lat = location.lat,
                    lng = location.lng,
                    "Weather provider failed, using synthetic data: {}",
                    e
                );
                synthetic_observation(&mut rand::thread_rng(), date)
            }
        };

        Ok(self
            .records
            .upsert(&NewWeatherRecord {
                location,
                date,
                observation,
                expires_at: now + self.cache_ttl,
            })
            .await?)
    }

    /// Refresh today's row for each location, reporting per-location outcome
    pub async fn refresh_many(
        &self,
        locations: &[GeoPoint],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Vec<RefreshResult> {
        let mut results = Vec::with_capacity(locations.len());
        for location in locations {
            if !location.is_valid() {
                results.push(RefreshResult {
                    location: *location,
                    success: false,
                    data: None,
                    error: Some("Latitude and longitude out of range".to_string()),
                });
                continue;
            }
            match self.refresh(*location, today, now).await {
                Ok(record) => results.push(RefreshResult {
                    location: *location,
                    success: true,
                    data: Some(record),
                    error: None,
                }),
                Err(e) => results.push(RefreshResult {
                    location: *location,
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }),
            }
        }
        results
    }

    /// Refresh today's row for every distinct location that is missing or stale.
    /// Returns how many rows were written.
    pub async fn refresh_stale(
        &self,
        locations: &[GeoPoint],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let mut seen = HashSet::new();
        let mut updated = 0;

        for location in locations.iter().map(GeoPoint::rounded) {
            if !seen.insert(location.key()) {
                continue;
            }
            let fresh = self
                .records
                .find(&location, today)
                .await?
                .map(|r| r.is_fresh(now))
                .unwrap_or(false);
            if !fresh {
                self.refresh(location, today, now).await?;
                updated += 1;
            }
        }

        tracing::info!(locations = seen.len(), updated, "Weather refresh completed");
        Ok(updated)
    }

    /// Stored rows for a location between two dates, oldest first
    pub async fn history(
        &self,
        location: GeoPoint,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeatherRecord>, AppError> {
        Ok(self
            .records
            .list_range(&location.rounded(), from, Some(to))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        test_observation, test_weather, InMemoryWeatherRepository, MockWeatherProvider,
        TEST_LOCATION,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_service(
        records: InMemoryWeatherRepository,
        provider: MockWeatherProvider,
    ) -> (
        WeatherService<InMemoryWeatherRepository, MockWeatherProvider>,
        Arc<InMemoryWeatherRepository>,
        Arc<MockWeatherProvider>,
    ) {
        let records = Arc::new(records);
        let provider = Arc::new(provider);
        (
            WeatherService::new(records.clone(), provider.clone(), 6),
            records,
            provider,
        )
    }

    #[test]
    fn synthetic_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        for _ in 0..50 {
            let obs = synthetic_observation(&mut rng, today);
            assert!((22.0..30.0).contains(&obs.temperature_min));
            assert!((30.0..40.0).contains(&obs.temperature_max));
            assert!((60.0..90.0).contains(&obs.humidity));
            assert!((0.0..5.0).contains(&obs.rainfall_mm));
            assert!((5.0..20.0).contains(&obs.wind_speed));
            assert!(CONDITIONS.contains(&obs.weather_condition.as_str()));
            assert_eq!(obs.forecast.len(), 5);
            assert_eq!(obs.forecast[4].date, today + Duration::days(4));
            assert_eq!(obs.source, WeatherSource::Synthetic);
        }
    }

    #[tokio::test]
    async fn fresh_row_served_from_cache() {
        let now = Utc::now();
        let today = now.date_naive();
        let (service, _, provider) = create_service(
            InMemoryWeatherRepository::new().with_record(test_weather(TEST_LOCATION, today)),
            MockWeatherProvider::new().with_observation(test_observation()),
        );

        let lookup = service.get(TEST_LOCATION, today, now).await.unwrap();
        assert_eq!(lookup.source, LookupSource::Cache);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn stale_row_is_refetched() {
        let now = Utc::now();
        let today = now.date_naive();
        let mut stale = test_weather(TEST_LOCATION, today);
        stale.expires_at = now - Duration::minutes(1);
        let (service, records, provider) = create_service(
            InMemoryWeatherRepository::new().with_record(stale),
            MockWeatherProvider::new().with_observation(test_observation()),
        );

        let lookup = service.get(TEST_LOCATION, today, now).await.unwrap();
        assert_eq!(lookup.source, LookupSource::Api);
        assert_eq!(lookup.data.temperature_max, 31.0);
        assert_eq!(lookup.data.expires_at, now + Duration::hours(6));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(records.all().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_stores_synthetic_row() {
        let now = Utc::now();
        let today = now.date_naive();
        let (service, records, _) =
            create_service(InMemoryWeatherRepository::new(), MockWeatherProvider::new());

        let lookup = service.get(TEST_LOCATION, today, now).await.unwrap();
        assert_eq!(lookup.data.source, WeatherSource::Synthetic);
        assert_eq!(records.all().len(), 1);
    }

    #[tokio::test]
    async fn invalid_coordinates_rejected() {
        let (service, _, _) =
            create_service(InMemoryWeatherRepository::new(), MockWeatherProvider::new());
        let result = service
            .get(GeoPoint::new(120.0, 10.0), Utc::now().date_naive(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn refresh_many_reports_each_location() {
        let now = Utc::now();
        let (service, _, _) = create_service(
            InMemoryWeatherRepository::new(),
            MockWeatherProvider::new().with_observation(test_observation()),
        );

        let results = service
            .refresh_many(
                &[TEST_LOCATION, GeoPoint::new(-95.0, 0.0)],
                now.date_naive(),
                now,
            )
            .await;
        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].error.is_some());
    }

    #[tokio::test]
    async fn refresh_stale_collapses_duplicates_and_skips_fresh() {
        let now = Utc::now();
        let today = now.date_naive();
        let other = GeoPoint::new(29.69, 76.99);
        let (service, _, provider) = create_service(
            InMemoryWeatherRepository::new().with_record(test_weather(other, today)),
            MockWeatherProvider::new().with_observation(test_observation()),
        );

        let updated = service
            .refresh_stale(
                &[
                    TEST_LOCATION,
                    GeoPoint::new(30.900_01, 75.850_02),
                    other,
                ],
                today,
                now,
            )
            .await
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(provider.call_count(), 1);
    }
}
