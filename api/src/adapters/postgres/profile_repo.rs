//! PostgreSQL adapter for ProfileRepository and SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::domain::entities::{
    NewProfile, Profile, ProfileId, ProfileUpdate, Role, RoleCounts, Session,
};
use crate::domain::ports::{ProfileRepository, SessionRepository};
use crate::entity::{profiles, sessions};
use crate::error::DomainError;

/// PostgreSQL implementation of ProfileRepository
pub struct PostgresProfileRepository {
    db: DatabaseConnection,
}

impl PostgresProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn count_role(&self, role: Role) -> Result<u64, DomainError> {
        profiles::Entity::find()
            .filter(profiles::Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, DomainError> {
        let result = profiles::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let result = profiles::Entity::find()
            .filter(profiles::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>, DomainError> {
        let result = profiles::Entity::find()
            .filter(profiles::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_ids(&self, ids: &[ProfileId]) -> Result<Vec<Profile>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = profiles::Entity::find()
            .filter(profiles::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, profile: &NewProfile) -> Result<Profile, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = profiles::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(profile.email.clone()),
            phone: Set(profile.phone.clone()),
            password_hash: Set(profile.password_hash.clone()),
            full_name: Set(profile.full_name.clone()),
            role: Set(profile.role.to_string()),
            language: Set(profile.language.clone()),
            location_lat: Set(None),
            location_lng: Set(None),
            district: Set(None),
            state: Set(None),
            farm_size_acres: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") {
                DomainError::AlreadyExists("An account with these credentials exists".to_string())
            } else {
                DomainError::Database(msg)
            }
        })?;

        Ok(result.into())
    }

    async fn update(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
    ) -> Result<Profile, DomainError> {
        let existing = profiles::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?
            .ok_or_else(|| DomainError::NotFound(format!("Profile {}", id)))?;

        let mut model = existing.into_active_model();
        if let Some(full_name) = &update.full_name {
            model.full_name = Set(Some(full_name.clone()));
        }
        if let Some(language) = &update.language {
            model.language = Set(language.clone());
        }
        if let Some(lat) = update.location_lat {
            model.location_lat = Set(Some(lat));
        }
        if let Some(lng) = update.location_lng {
            model.location_lng = Set(Some(lng));
        }
        if let Some(district) = &update.district {
            model.district = Set(Some(district.clone()));
        }
        if let Some(state) = &update.state {
            model.state = Set(Some(state.clone()));
        }
        if let Some(acres) = update.farm_size_acres {
            model.farm_size_acres = Set(Some(acres));
        }
        model.updated_at = Set(Utc::now().fixed_offset());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn count_by_role(&self) -> Result<RoleCounts, DomainError> {
        let farmers = self.count_role(Role::Farmer).await?;
        let fpos = self.count_role(Role::Fpo).await?;
        let admins = self.count_role(Role::Admin).await?;

        Ok(RoleCounts {
            total_users: farmers + fpos + admins,
            farmers,
            fpos,
            admins,
        })
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64, DomainError> {
        profiles::Entity::find()
            .filter(profiles::Column::CreatedAt.gte(since.fixed_offset()))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Convert SeaORM model to domain entity
impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Profile {
            id: ProfileId(model.id),
            email: model.email,
            phone: model.phone,
            password_hash: model.password_hash,
            full_name: model.full_name,
            role: model.role.parse().unwrap_or(Role::Farmer),
            language: model.language,
            location_lat: model.location_lat,
            location_lng: model.location_lng,
            district: model.district,
            state: model.state,
            farm_size_acres: model.farm_size_acres,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// PostgreSQL implementation of SessionRepository
pub struct PostgresSessionRepository {
    db: DatabaseConnection,
}

impl PostgresSessionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        sessions::ActiveModel {
            token_hash: Set(session.token_hash.clone()),
            profile_id: Set(session.profile_id.0),
            expires_at: Set(session.expires_at.fixed_offset()),
            created_at: Set(session.created_at.fixed_offset()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_token_hash(&self, hash: &str) -> Result<Option<Session>, DomainError> {
        let result = sessions::Entity::find_by_id(hash.to_string())
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| Session {
            token_hash: m.token_hash,
            profile_id: ProfileId(m.profile_id),
            expires_at: m.expires_at.with_timezone(&Utc),
            created_at: m.created_at.with_timezone(&Utc),
        }))
    }

    async fn delete(&self, hash: &str) -> Result<(), DomainError> {
        sessions::Entity::delete_by_id(hash.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(now.fixed_offset()))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
