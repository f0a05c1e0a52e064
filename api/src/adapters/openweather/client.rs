//! OpenWeather API client implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use crate::domain::entities::{ForecastDay, GeoPoint, WeatherObservation, WeatherSource};
use crate::domain::ports::WeatherProvider;
use crate::error::WeatherError;

const FORECAST_DAYS: usize = 5;

/// Implementation of the weather provider backed by OpenWeather
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/data/2.5{}", self.base_url, path)
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        location: &GeoPoint,
        api_key: &str,
    ) -> Result<T, WeatherError> {
        let response = self
            .http
            .get(self.api_url(path))
            .query(&[
                ("lat", location.lat.to_string()),
                ("lon", location.lng.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| WeatherError::Deserialization(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Response types for the OpenWeather API
#[derive(Debug, Deserialize)]
struct MainBlock {
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
}

#[derive(Debug, Default, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    rain: Option<RainBlock>,
    wind: WindBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt: i64,
    main: MainBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    rain: Option<RainBlock>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastItem>,
}

fn condition_of(blocks: &[ConditionBlock]) -> String {
    blocks
        .first()
        .map(|c| c.main.clone())
        .unwrap_or_else(|| "Clear".to_string())
}

fn to_forecast(response: ForecastResponse) -> Vec<ForecastDay> {
    response
        .list
        .into_iter()
        .take(FORECAST_DAYS)
        .filter_map(|item| {
            let date = DateTime::from_timestamp(item.dt, 0)?.date_naive();
            Some(ForecastDay {
                date,
                temperature_min: item.main.temp_min,
                temperature_max: item.main.temp_max,
                humidity: item.main.humidity,
                rainfall_mm: item.rain.and_then(|r| r.three_hours).unwrap_or(0.0),
                weather_condition: condition_of(&item.weather),
            })
        })
        .collect()
}

fn to_observation(current: CurrentResponse, forecast: Vec<ForecastDay>) -> WeatherObservation {
    WeatherObservation {
        temperature_min: current.main.temp_min,
        temperature_max: current.main.temp_max,
        humidity: current.main.humidity,
        rainfall_mm: current.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
        wind_speed: current.wind.speed,
        weather_condition: condition_of(&current.weather),
        forecast,
        source: WeatherSource::Api,
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(
        &self,
        location: &GeoPoint,
        _date: NaiveDate,
    ) -> Result<WeatherObservation, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::NotConfigured)?;

        let current: CurrentResponse = self.get("/weather", location, api_key).await?;

        // Current conditions are enough to serve the request
        let forecast = match self
            .get::<ForecastResponse>("/forecast", location, api_key)
            .await
        {
            Ok(response) => to_forecast(response),
            Err(e) => {
                tracing::warn!(error = %e, location = %location.key(), "Forecast fetch failed");
                Vec::new()
            }
        };

        Ok(to_observation(current, forecast))
    }
}
