//! PostgreSQL adapter for WeatherRepository

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::entities::{GeoPoint, NewWeatherRecord, WeatherRecord, WeatherSource};
use crate::domain::ports::WeatherRepository;
use crate::entity::weather_data;
use crate::error::DomainError;

/// PostgreSQL implementation of WeatherRepository
pub struct PostgresWeatherRepository {
    db: DatabaseConnection,
}

impl PostgresWeatherRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WeatherRepository for PostgresWeatherRepository {
    async fn find(
        &self,
        location: &GeoPoint,
        date: NaiveDate,
    ) -> Result<Option<WeatherRecord>, DomainError> {
        let result = weather_data::Entity::find()
            .filter(weather_data::Column::LocationLat.eq(location.lat))
            .filter(weather_data::Column::LocationLng.eq(location.lng))
            .filter(weather_data::Column::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn upsert(&self, record: &NewWeatherRecord) -> Result<WeatherRecord, DomainError> {
        let obs = &record.observation;
        let forecast = serde_json::to_value(&obs.forecast)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let model = weather_data::ActiveModel {
            id: Set(Uuid::new_v4()),
            location_lat: Set(record.location.lat),
            location_lng: Set(record.location.lng),
            date: Set(record.date),
            temperature_min: Set(obs.temperature_min),
            temperature_max: Set(obs.temperature_max),
            humidity: Set(obs.humidity),
            rainfall_mm: Set(obs.rainfall_mm),
            wind_speed: Set(obs.wind_speed),
            weather_condition: Set(obs.weather_condition.clone()),
            forecast_data: Set(forecast),
            source: Set(obs.source.to_string()),
            expires_at: Set(record.expires_at.fixed_offset()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        weather_data::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    weather_data::Column::LocationLat,
                    weather_data::Column::LocationLng,
                    weather_data::Column::Date,
                ])
                .update_columns([
                    weather_data::Column::TemperatureMin,
                    weather_data::Column::TemperatureMax,
                    weather_data::Column::Humidity,
                    weather_data::Column::RainfallMm,
                    weather_data::Column::WindSpeed,
                    weather_data::Column::WeatherCondition,
                    weather_data::Column::ForecastData,
                    weather_data::Column::Source,
                    weather_data::Column::ExpiresAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.find(&record.location, record.date)
            .await?
            .ok_or_else(|| DomainError::Internal("Weather row vanished after upsert".to_string()))
    }

    async fn list_range(
        &self,
        location: &GeoPoint,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WeatherRecord>, DomainError> {
        let mut query = weather_data::Entity::find()
            .filter(weather_data::Column::LocationLat.eq(location.lat))
            .filter(weather_data::Column::LocationLng.eq(location.lng))
            .filter(weather_data::Column::Date.gte(from));
        if let Some(to) = to {
            query = query.filter(weather_data::Column::Date.lte(to));
        }

        let results = query
            .order_by_asc(weather_data::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count_for_date(&self, date: NaiveDate) -> Result<u64, DomainError> {
        weather_data::Entity::find()
            .filter(weather_data::Column::Date.eq(date))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        weather_data::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

impl From<weather_data::Model> for WeatherRecord {
    fn from(model: weather_data::Model) -> Self {
        WeatherRecord {
            id: model.id,
            location_lat: model.location_lat,
            location_lng: model.location_lng,
            date: model.date,
            temperature_min: model.temperature_min,
            temperature_max: model.temperature_max,
            humidity: model.humidity,
            rainfall_mm: model.rainfall_mm,
            wind_speed: model.wind_speed,
            weather_condition: model.weather_condition,
            forecast_data: serde_json::from_value(model.forecast_data).unwrap_or_default(),
            source: model.source.parse().unwrap_or(WeatherSource::Api),
            expires_at: model.expires_at.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
