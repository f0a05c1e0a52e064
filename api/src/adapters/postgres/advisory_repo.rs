//! PostgreSQL adapter for AdvisoryRepository

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    Advisory, AdvisoryFilter, AdvisoryId, AdvisoryType, AdvisoryUpdate, CropCycleId, NewAdvisory,
    Priority, ProfileId,
};
use crate::domain::ports::AdvisoryRepository;
use crate::entity::advisories;
use crate::error::DomainError;

/// PostgreSQL implementation of AdvisoryRepository
pub struct PostgresAdvisoryRepository {
    db: DatabaseConnection,
}

impl PostgresAdvisoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdvisoryRepository for PostgresAdvisoryRepository {
    async fn find_by_id(&self, id: &AdvisoryId) -> Result<Option<Advisory>, DomainError> {
        let result = advisories::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self, filter: &AdvisoryFilter) -> Result<Vec<Advisory>, DomainError> {
        let mut query = advisories::Entity::find();

        if let Some(ids) = &filter.farmer_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(advisories::Column::FarmerId.is_in(ids.iter().map(|id| id.0)));
        }
        if filter.unread_only {
            query = query.filter(advisories::Column::IsRead.eq(false));
        }
        if let Some(advisory_type) = filter.advisory_type {
            query = query.filter(advisories::Column::AdvisoryType.eq(advisory_type.to_string()));
        }
        if let Some(since) = filter.created_since {
            query = query.filter(advisories::Column::CreatedAt.gte(since.fixed_offset()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let results = query
            .order_by_desc(advisories::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, advisory: &NewAdvisory) -> Result<Advisory, DomainError> {
        let model = advisories::ActiveModel {
            id: Set(Uuid::new_v4()),
            farmer_id: Set(advisory.farmer_id.0),
            crop_cycle_id: Set(advisory.crop_cycle_id.map(|id| id.0)),
            advisory_type: Set(advisory.advisory_type.to_string()),
            title: Set(advisory.title.clone()),
            description: Set(advisory.description.clone()),
            priority: Set(advisory.priority.to_string()),
            action_required: Set(advisory.action_required),
            is_read: Set(false),
            valid_until: Set(advisory.valid_until.map(|dt| dt.fixed_offset())),
            metadata: Set(advisory.metadata.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &AdvisoryId,
        update: &AdvisoryUpdate,
    ) -> Result<Advisory, DomainError> {
        let existing = advisories::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Advisory {}", id)))?;

        let mut model = existing.into_active_model();
        if let Some(is_read) = update.is_read {
            model.is_read = Set(is_read);
        }
        if let Some(title) = &update.title {
            model.title = Set(title.clone());
        }
        if let Some(description) = &update.description {
            model.description = Set(description.clone());
        }
        if let Some(priority) = update.priority {
            model.priority = Set(priority.to_string());
        }
        if let Some(action_required) = update.action_required {
            model.action_required = Set(action_required);
        }
        if let Some(valid_until) = update.valid_until {
            model.valid_until = Set(Some(valid_until.fixed_offset()));
        }
        if let Some(metadata) = &update.metadata {
            model.metadata = Set(metadata.clone());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn delete(&self, id: &AdvisoryId) -> Result<(), DomainError> {
        let result = advisories::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            Err(DomainError::NotFound(format!("Advisory {}", id)))
        } else {
            Ok(())
        }
    }

    async fn exists_since(
        &self,
        crop_cycle_id: &CropCycleId,
        advisory_type: AdvisoryType,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let count = advisories::Entity::find()
            .filter(advisories::Column::CropCycleId.eq(crop_cycle_id.0))
            .filter(advisories::Column::AdvisoryType.eq(advisory_type.to_string()))
            .filter(advisories::Column::CreatedAt.gte(since.fixed_offset()))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn count_by_crop(
        &self,
        crop_ids: &[CropCycleId],
    ) -> Result<HashMap<CropCycleId, u64>, DomainError> {
        if crop_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<Option<Uuid>> = advisories::Entity::find()
            .select_only()
            .column(advisories::Column::CropCycleId)
            .filter(advisories::Column::CropCycleId.is_in(crop_ids.iter().map(|id| id.0)))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut counts = HashMap::new();
        for crop_id in rows.into_iter().flatten() {
            *counts.entry(CropCycleId(crop_id)).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Convert SeaORM model to domain entity
impl From<advisories::Model> for Advisory {
    fn from(model: advisories::Model) -> Self {
        Advisory {
            id: AdvisoryId(model.id),
            farmer_id: ProfileId(model.farmer_id),
            crop_cycle_id: model.crop_cycle_id.map(CropCycleId),
            advisory_type: model.advisory_type.parse().unwrap_or(AdvisoryType::General),
            title: model.title,
            description: model.description,
            priority: model.priority.parse().unwrap_or(Priority::Medium),
            action_required: model.action_required,
            is_read: model.is_read,
            valid_until: model.valid_until.map(|dt| dt.with_timezone(&Utc)),
            metadata: model.metadata,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
