//! Decision warnings

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "decision_warnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub crop_cycle_id: Option<Uuid>,
    pub warning_type: String,
    pub risk_level: String,
    pub title: String,
    pub description: String,
    pub potential_loss_estimate: f64,
    pub is_acknowledged: bool,
    pub is_dismissed: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
