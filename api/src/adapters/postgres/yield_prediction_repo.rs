//! PostgreSQL adapter for YieldPredictionRepository

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    CropCycleId, NewYieldPrediction, YieldPrediction, YieldPredictionId, YieldPredictionUpdate,
};
use crate::domain::ports::YieldPredictionRepository;
use crate::entity::yield_predictions;
use crate::error::DomainError;

/// PostgreSQL implementation of YieldPredictionRepository
pub struct PostgresYieldPredictionRepository {
    db: DatabaseConnection,
}

impl PostgresYieldPredictionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl YieldPredictionRepository for PostgresYieldPredictionRepository {
    async fn find_by_id(
        &self,
        id: &YieldPredictionId,
    ) -> Result<Option<YieldPrediction>, DomainError> {
        let result = yield_predictions::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list(
        &self,
        crop_ids: Option<&[CropCycleId]>,
        limit: Option<u64>,
    ) -> Result<Vec<YieldPrediction>, DomainError> {
        let mut query = yield_predictions::Entity::find();

        if let Some(ids) = crop_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query
                .filter(yield_predictions::Column::CropCycleId.is_in(ids.iter().map(|id| id.0)));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let results = query
            .order_by_desc(yield_predictions::Column::PredictionDate)
            .order_by_desc(yield_predictions::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn latest_for_crop(
        &self,
        crop_id: &CropCycleId,
    ) -> Result<Option<YieldPrediction>, DomainError> {
        let result = yield_predictions::Entity::find()
            .filter(yield_predictions::Column::CropCycleId.eq(crop_id.0))
            .order_by_desc(yield_predictions::Column::PredictionDate)
            .order_by_desc(yield_predictions::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn exists_for_date(
        &self,
        crop_id: &CropCycleId,
        date: NaiveDate,
    ) -> Result<bool, DomainError> {
        let count = yield_predictions::Entity::find()
            .filter(yield_predictions::Column::CropCycleId.eq(crop_id.0))
            .filter(yield_predictions::Column::PredictionDate.eq(date))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    async fn create(
        &self,
        prediction: &NewYieldPrediction,
    ) -> Result<YieldPrediction, DomainError> {
        let model = yield_predictions::ActiveModel {
            id: Set(Uuid::new_v4()),
            crop_cycle_id: Set(prediction.crop_cycle_id.0),
            predicted_yield_tons: Set(prediction.predicted_yield_tons),
            confidence_score: Set(prediction.confidence_score),
            prediction_date: Set(prediction.prediction_date),
            model_version: Set(prediction.model_version.clone()),
            factors: Set(prediction.factors.clone()),
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
        id: &YieldPredictionId,
        update: &YieldPredictionUpdate,
    ) -> Result<YieldPrediction, DomainError> {
        let existing = yield_predictions::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Yield prediction {}", id)))?;

        let mut model = existing.into_active_model();
        if let Some(tons) = update.predicted_yield_tons {
            model.predicted_yield_tons = Set(tons);
        }
        if let Some(confidence) = update.confidence_score {
            model.confidence_score = Set(confidence);
        }
        if let Some(factors) = &update.factors {
            model.factors = Set(factors.clone());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }
}

impl From<yield_predictions::Model> for YieldPrediction {
    fn from(model: yield_predictions::Model) -> Self {
        YieldPrediction {
            id: YieldPredictionId(model.id),
            crop_cycle_id: CropCycleId(model.crop_cycle_id),
            predicted_yield_tons: model.predicted_yield_tons,
            confidence_score: model.confidence_score,
            prediction_date: model.prediction_date,
            model_version: model.model_version,
            factors: model.factors,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
