//! PostgreSQL adapter for MarketPriceRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::entities::{CropType, MarketPrice, MarketPriceFilter, NewMarketPrice};
use crate::domain::ports::MarketPriceRepository;
use crate::entity::market_prices;
use crate::error::DomainError;

/// PostgreSQL implementation of MarketPriceRepository
pub struct PostgresMarketPriceRepository {
    db: DatabaseConnection,
}

impl PostgresMarketPriceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MarketPriceRepository for PostgresMarketPriceRepository {
    async fn list(&self, filter: &MarketPriceFilter) -> Result<Vec<MarketPrice>, DomainError> {
        let mut query = market_prices::Entity::find();
        if let Some(crop_type) = filter.crop_type {
            query = query.filter(market_prices::Column::CropType.eq(crop_type.to_string()));
        }
        if let Some(state) = &filter.state {
            query = query.filter(market_prices::Column::State.eq(state.as_str()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let results = query
            .order_by_desc(market_prices::Column::Date)
            .order_by_asc(market_prices::Column::MarketName)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn upsert(&self, price: &NewMarketPrice) -> Result<MarketPrice, DomainError> {
        let model = market_prices::ActiveModel {
            id: Set(Uuid::new_v4()),
            crop_type: Set(price.crop_type.to_string()),
            market_name: Set(price.market_name.clone()),
            district: Set(price.district.clone()),
            state: Set(price.state.clone()),
            price_per_quintal: Set(price.price_per_quintal),
            date: Set(price.date),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let result = market_prices::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    market_prices::Column::CropType,
                    market_prices::Column::MarketName,
                    market_prices::Column::District,
                    market_prices::Column::State,
                    market_prices::Column::Date,
                ])
                .update_column(market_prices::Column::PricePerQuintal)
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        market_prices::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

impl From<market_prices::Model> for MarketPrice {
    fn from(model: market_prices::Model) -> Self {
        MarketPrice {
            id: model.id,
            crop_type: model.crop_type.parse().unwrap_or(CropType::Other),
            market_name: model.market_name,
            district: model.district,
            state: model.state,
            price_per_quintal: model.price_per_quintal,
            date: model.date,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
