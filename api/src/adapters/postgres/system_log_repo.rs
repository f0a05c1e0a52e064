//! PostgreSQL adapters for SystemLogRepository and RecommendationRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{CropRecommendation, LogLevel, SystemLog};
use crate::domain::ports::{RecommendationRepository, SystemLogRepository};
use crate::entity::{crop_recommendations, system_logs};
use crate::error::DomainError;

/// PostgreSQL implementation of SystemLogRepository
pub struct PostgresSystemLogRepository {
    db: DatabaseConnection,
}

impl PostgresSystemLogRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SystemLogRepository for PostgresSystemLogRepository {
    async fn log(&self, level: LogLevel, message: &str) -> Result<(), DomainError> {
        system_logs::Entity::insert(system_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            level: Set(level.to_string()),
            message: Set(message.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
        })
        .exec(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn recent(
        &self,
        level: Option<LogLevel>,
        message_prefix: Option<&str>,
        limit: u64,
    ) -> Result<Vec<SystemLog>, DomainError> {
        let mut query = system_logs::Entity::find();
        if let Some(level) = level {
            query = query.filter(system_logs::Column::Level.eq(level.to_string()));
        }
        if let Some(prefix) = message_prefix {
            query = query.filter(system_logs::Column::Message.starts_with(prefix));
        }

        let results = query
            .order_by_desc(system_logs::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|m| SystemLog {
                id: m.id,
                level: m.level.parse().unwrap_or(LogLevel::Info),
                message: m.message,
                created_at: m.created_at.with_timezone(&Utc),
            })
            .collect())
    }
}

/// PostgreSQL implementation of RecommendationRepository
pub struct PostgresRecommendationRepository {
    db: DatabaseConnection,
}

impl PostgresRecommendationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecommendationRepository for PostgresRecommendationRepository {
    async fn save(&self, recommendations: &[CropRecommendation]) -> Result<(), DomainError> {
        if recommendations.is_empty() {
            return Ok(());
        }

        let models = recommendations.iter().map(|r| crop_recommendations::ActiveModel {
            id: Set(r.id),
            farmer_id: Set(r.farmer_id.0),
            season: Set(r.season.to_string()),
            recommended_crop: Set(r.recommended_crop.to_string()),
            suitability_score: Set(r.suitability_score),
            expected_yield_min: Set(r.expected_yield_range.min),
            expected_yield_max: Set(r.expected_yield_range.max),
            investment_required: Set(r.investment_required),
            expected_profit_min: Set(r.expected_profit_range.min),
            expected_profit_max: Set(r.expected_profit_range.max),
            risk_factors: Set(r.risk_factors.clone()),
            market_outlook: Set(r.market_outlook.clone()),
            created_at: Set(r.created_at.fixed_offset()),
        });

        crop_recommendations::Entity::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}
