//! FPO membership

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "fpo_farmers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub fpo_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub farmer_id: Uuid,
    pub is_active: bool,
    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
