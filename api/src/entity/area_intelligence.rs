//! Area intelligence, one row per center point

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "area_intelligence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
    pub active_crops: i64,
    pub total_area_acres: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub crop_distribution: Json,
    pub disease_pressure: f64,
    pub pest_activity: f64,
    pub weather_stress: f64,
    pub expires_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
