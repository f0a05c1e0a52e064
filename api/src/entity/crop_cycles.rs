//! Crop cycles

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crop_cycles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub crop_type: String,
    pub crop_variety: Option<String>,
    pub sowing_date: Date,
    pub expected_harvest_date: Option<Date>,
    pub actual_harvest_date: Option<Date>,
    pub actual_yield_tons: Option<f64>,
    pub field_size_acres: Option<f64>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub soil_type: Option<String>,
    pub irrigation_method: Option<String>,
    pub current_stage: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
