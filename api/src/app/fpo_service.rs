//! FPO organisation and membership service

use std::sync::Arc;

use crate::app::access::require_role;
use crate::domain::entities::{Fpo, FpoMembership, NewFpo, Profile, ProfileId, Role};
use crate::domain::ports::{FpoRepository, ProfileRepository};
use crate::error::{AppError, DomainError};

pub struct FpoService<FR, PR>
where
    FR: FpoRepository,
    PR: ProfileRepository,
{
    fpos: Arc<FR>,
    profiles: Arc<PR>,
}

impl<FR, PR> FpoService<FR, PR>
where
    FR: FpoRepository,
    PR: ProfileRepository,
{
    pub fn new(fpos: Arc<FR>, profiles: Arc<PR>) -> Self {
        Self { fpos, profiles }
    }

    /// Create or replace the caller's organisation details
    pub async fn register(&self, profile: &Profile, fpo: &NewFpo) -> Result<Fpo, AppError> {
        require_role(profile, Role::Fpo)?;
        if fpo.name.trim().is_empty() {
            return Err(DomainError::Validation("Organisation name is required".into()).into());
        }

        let registered = self.fpos.upsert(&profile.id, fpo).await?;
        tracing::info!(fpo_id = %profile.id, name = %registered.name, "FPO registered");
        Ok(registered)
    }

    pub async fn add_member(
        &self,
        profile: &Profile,
        farmer_id: &ProfileId,
    ) -> Result<FpoMembership, AppError> {
        require_role(profile, Role::Fpo)?;

        let farmer = self
            .profiles
            .find_by_id(farmer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", farmer_id)))?;
        if farmer.role != Role::Farmer {
            return Err(AppError::BadRequest(
                "Only farmers can join an FPO".to_string(),
            ));
        }

        let membership = self.fpos.add_member(&profile.id, farmer_id).await?;
        tracing::info!(fpo_id = %profile.id, farmer_id = %farmer_id, "FPO member added");
        Ok(membership)
    }

    /// Active member farmers of the caller's FPO
    pub async fn members(&self, profile: &Profile) -> Result<Vec<Profile>, AppError> {
        require_role(profile, Role::Fpo)?;
        let ids = self.fpos.active_member_ids(&profile.id).await?;
        if ids.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.profiles.find_by_ids(&ids).await?)
    }
}
