//! Role-based visibility
//!
//! Farmers see their own records, FPOs see their active members' records,
//! admins see everything.

use crate::domain::entities::{Profile, ProfileId, Role};
use crate::domain::ports::FpoRepository;
use crate::error::{AppError, DomainError};

/// Which farmers' records a caller may read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmerScope {
    All,
    Farmers(Vec<ProfileId>),
}

impl FarmerScope {
    /// Resolve the scope for a caller
    pub async fn for_profile<F: FpoRepository + ?Sized>(
        profile: &Profile,
        fpos: &F,
    ) -> Result<Self, DomainError> {
        match profile.role {
            Role::Admin => Ok(FarmerScope::All),
            Role::Farmer => Ok(FarmerScope::Farmers(vec![profile.id])),
            Role::Fpo => Ok(FarmerScope::Farmers(
                fpos.active_member_ids(&profile.id).await?,
            )),
        }
    }

    pub fn contains(&self, farmer_id: &ProfileId) -> bool {
        match self {
            FarmerScope::All => true,
            FarmerScope::Farmers(ids) => ids.contains(farmer_id),
        }
    }

    /// Farmer ids to filter on; `None` means unrestricted
    pub fn farmer_ids(&self) -> Option<Vec<ProfileId>> {
        match self {
            FarmerScope::All => None,
            FarmerScope::Farmers(ids) => Some(ids.clone()),
        }
    }
}

/// Fail unless the caller has the given role
pub fn require_role(profile: &Profile, role: Role) -> Result<(), AppError> {
    if profile.role == role {
        Ok(())
    } else {
        Err(AppError::Domain(DomainError::Forbidden(format!(
            "Requires the {} role",
            role
        ))))
    }
}

/// Fail unless the caller owns the record
pub fn require_owner(profile: &Profile, owner: &ProfileId) -> Result<(), AppError> {
    if &profile.id == owner {
        Ok(())
    } else {
        Err(AppError::Domain(DomainError::Forbidden(
            "You do not own this record".to_string(),
        )))
    }
}
