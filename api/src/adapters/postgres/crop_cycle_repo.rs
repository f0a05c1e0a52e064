//! PostgreSQL adapter for CropCycleRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    CropCycle, CropCycleFilter, CropCycleId, CropCycleUpdate, CropType, CycleStatus, GrowthStage,
    NewCropCycle, ProfileId,
};
use crate::domain::ports::CropCycleRepository;
use crate::entity::crop_cycles;
use crate::error::DomainError;

/// PostgreSQL implementation of CropCycleRepository
pub struct PostgresCropCycleRepository {
    db: DatabaseConnection,
}

impl PostgresCropCycleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(filter: &CropCycleFilter) -> Select<crop_cycles::Entity> {
        let mut condition = Condition::all();
        if let Some(ids) = &filter.farmer_ids {
            condition =
                condition.add(crop_cycles::Column::FarmerId.is_in(ids.iter().map(|id| id.0)));
        }
        if let Some(status) = filter.status {
            condition = condition.add(crop_cycles::Column::Status.eq(status.to_string()));
        }
        if let Some(since) = filter.created_since {
            condition = condition.add(crop_cycles::Column::CreatedAt.gte(since.fixed_offset()));
        }
        crop_cycles::Entity::find().filter(condition)
    }
}

#[async_trait]
impl CropCycleRepository for PostgresCropCycleRepository {
    async fn find_by_id(&self, id: &CropCycleId) -> Result<Option<CropCycle>, DomainError> {
        let result = crop_cycles::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(&self, filter: &CropCycleFilter) -> Result<Vec<CropCycle>, DomainError> {
        // An empty farmer scope matches nothing; skip the round trip
        if matches!(&filter.farmer_ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }

        let results = Self::filtered(filter)
            .order_by_desc(crop_cycles::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count(&self, filter: &CropCycleFilter) -> Result<u64, DomainError> {
        if matches!(&filter.farmer_ids, Some(ids) if ids.is_empty()) {
            return Ok(0);
        }

        Self::filtered(filter)
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    async fn create(&self, crop: &NewCropCycle) -> Result<CropCycle, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = crop_cycles::ActiveModel {
            id: Set(Uuid::new_v4()),
            farmer_id: Set(crop.farmer_id.0),
            crop_type: Set(crop.crop_type.to_string()),
            crop_variety: Set(crop.crop_variety.clone()),
            sowing_date: Set(crop.sowing_date),
            expected_harvest_date: Set(Some(crop.expected_harvest_date)),
            actual_harvest_date: Set(None),
            actual_yield_tons: Set(None),
            field_size_acres: Set(crop.field_size_acres),
            location_lat: Set(crop.location_lat),
            location_lng: Set(crop.location_lng),
            soil_type: Set(crop.soil_type.clone()),
            irrigation_method: Set(crop.irrigation_method.clone()),
            current_stage: Set(GrowthStage::Sowing.to_string()),
            status: Set(CycleStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &CropCycleId,
        update: &CropCycleUpdate,
    ) -> Result<CropCycle, DomainError> {
        let existing = crop_cycles::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Crop cycle {}", id)))?;

        let mut model = existing.into_active_model();
        if let Some(variety) = &update.crop_variety {
            model.crop_variety = Set(Some(variety.clone()));
        }
        if let Some(date) = update.expected_harvest_date {
            model.expected_harvest_date = Set(Some(date));
        }
        if let Some(date) = update.actual_harvest_date {
            model.actual_harvest_date = Set(Some(date));
        }
        if let Some(tons) = update.actual_yield_tons {
            model.actual_yield_tons = Set(Some(tons));
        }
        if let Some(acres) = update.field_size_acres {
            model.field_size_acres = Set(Some(acres));
        }
        if let Some(lat) = update.location_lat {
            model.location_lat = Set(Some(lat));
        }
        if let Some(lng) = update.location_lng {
            model.location_lng = Set(Some(lng));
        }
        if let Some(soil) = &update.soil_type {
            model.soil_type = Set(Some(soil.clone()));
        }
        if let Some(method) = &update.irrigation_method {
            model.irrigation_method = Set(Some(method.clone()));
        }
        if let Some(stage) = update.current_stage {
            model.current_stage = Set(stage.to_string());
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn set_stage(&self, id: &CropCycleId, stage: GrowthStage) -> Result<(), DomainError> {
        crop_cycles::ActiveModel {
            id: Set(id.0),
            current_stage: Set(stage.to_string()),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: &CropCycleId) -> Result<(), DomainError> {
        let result = crop_cycles::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            Err(DomainError::NotFound(format!("Crop cycle {}", id)))
        } else {
            Ok(())
        }
    }
}

/// Convert SeaORM model to domain entity
impl From<crop_cycles::Model> for CropCycle {
    fn from(model: crop_cycles::Model) -> Self {
        CropCycle {
            id: CropCycleId(model.id),
            farmer_id: ProfileId(model.farmer_id),
            crop_type: model.crop_type.parse().unwrap_or(CropType::Other),
            crop_variety: model.crop_variety,
            sowing_date: model.sowing_date,
            expected_harvest_date: model.expected_harvest_date,
            actual_harvest_date: model.actual_harvest_date,
            actual_yield_tons: model.actual_yield_tons,
            field_size_acres: model.field_size_acres,
            location_lat: model.location_lat,
            location_lng: model.location_lng,
            soil_type: model.soil_type,
            irrigation_method: model.irrigation_method,
            current_stage: model.current_stage.parse().unwrap_or(GrowthStage::Sowing),
            status: model.status.parse().unwrap_or(CycleStatus::Active),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
