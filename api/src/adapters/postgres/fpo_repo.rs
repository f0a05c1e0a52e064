//! PostgreSQL adapter for FpoRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

use crate::domain::entities::{Fpo, FpoMembership, NewFpo, ProfileId};
use crate::domain::ports::FpoRepository;
use crate::entity::{fpo_farmers, fpos};
use crate::error::DomainError;

/// PostgreSQL implementation of FpoRepository
pub struct PostgresFpoRepository {
    db: DatabaseConnection,
}

impl PostgresFpoRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FpoRepository for PostgresFpoRepository {
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Fpo>, DomainError> {
        let result = fpos::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn upsert(&self, id: &ProfileId, fpo: &NewFpo) -> Result<Fpo, DomainError> {
        let model = fpos::ActiveModel {
            id: Set(id.0),
            name: Set(fpo.name.clone()),
            registration_number: Set(fpo.registration_number.clone()),
            district: Set(fpo.district.clone()),
            state: Set(fpo.state.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        fpos::Entity::insert(model)
            .on_conflict(
                OnConflict::column(fpos::Column::Id)
                    .update_columns([
                        fpos::Column::Name,
                        fpos::Column::RegistrationNumber,
                        fpos::Column::District,
                        fpos::Column::State,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::Internal(format!("FPO {} vanished after upsert", id)))
    }

    async fn add_member(
        &self,
        fpo_id: &ProfileId,
        farmer_id: &ProfileId,
    ) -> Result<FpoMembership, DomainError> {
        let now = Utc::now().fixed_offset();

        let existing = fpo_farmers::Entity::find_by_id((fpo_id.0, farmer_id.0))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let result = match existing {
            Some(member) => {
                let mut model: fpo_farmers::ActiveModel = member.into();
                model.is_active = Set(true);
                model.update(&self.db).await
            }
            None => {
                fpo_farmers::ActiveModel {
                    fpo_id: Set(fpo_id.0),
                    farmer_id: Set(farmer_id.0),
                    is_active: Set(true),
                    joined_at: Set(now),
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(FpoMembership {
            fpo_id: ProfileId(result.fpo_id),
            farmer_id: ProfileId(result.farmer_id),
            is_active: result.is_active,
            joined_at: result.joined_at.with_timezone(&Utc),
        })
    }

    async fn active_member_ids(&self, fpo_id: &ProfileId) -> Result<Vec<ProfileId>, DomainError> {
        let results = fpo_farmers::Entity::find()
            .filter(fpo_farmers::Column::FpoId.eq(fpo_id.0))
            .filter(fpo_farmers::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| ProfileId(m.farmer_id)).collect())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        fpos::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

impl From<fpos::Model> for Fpo {
    fn from(model: fpos::Model) -> Self {
        Fpo {
            id: ProfileId(model.id),
            name: model.name,
            registration_number: model.registration_number,
            district: model.district,
            state: model.state,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
