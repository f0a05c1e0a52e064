//! Risk predictions

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "risk_predictions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub crop_cycle_id: Uuid,
    pub risk_type: String,
    pub risk_level: String,
    pub probability: f64,
    pub time_to_impact_days: i32,
    pub confidence_score: f64,
    pub affected_area_percentage: f64,
    pub economic_impact_estimate: f64,
    pub prevention_cost_estimate: f64,
    pub predicted_loss_if_ignored: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub mitigation_strategies: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub contributing_factors: Json,
    pub model_version: String,
    pub expires_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
