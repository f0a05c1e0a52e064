//! Seasonal comparisons

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seasonal_comparisons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub crop_cycle_id: Uuid,
    pub comparison_season: String,
    pub compared_cycle_id: Uuid,
    pub total_rainfall_mm: f64,
    pub avg_temperature: f64,
    pub rainfall_deviation_percent: f64,
    pub temperature_deviation_percent: f64,
    pub yield_tons: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
