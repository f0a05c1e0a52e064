//! Economic impacts

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "economic_impacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub advisory_id: Option<Uuid>,
    pub advisory_type: Option<String>,
    pub risk_prediction_id: Option<Uuid>,
    pub estimated_cost: f64,
    pub estimated_loss_prevented: f64,
    pub roi_percentage: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
