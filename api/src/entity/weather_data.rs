//! Cached weather, one row per location and day

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "weather_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub location_lat: f64,
    pub location_lng: f64,
    pub date: Date,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity: f64,
    pub rainfall_mm: f64,
    pub wind_speed: f64,
    pub weather_condition: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub forecast_data: Json,
    pub source: String,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
