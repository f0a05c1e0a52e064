//! Seasonal crop recommendations

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crop_recommendations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub season: String,
    pub recommended_crop: String,
    pub suitability_score: f64,
    pub expected_yield_min: f64,
    pub expected_yield_max: f64,
    pub investment_required: f64,
    pub expected_profit_min: f64,
    pub expected_profit_max: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub risk_factors: Json,
    pub market_outlook: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
