//! Yield predictions

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "yield_predictions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub crop_cycle_id: Uuid,
    pub predicted_yield_tons: f64,
    pub confidence_score: f64,
    pub prediction_date: Date,
    pub model_version: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub factors: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
