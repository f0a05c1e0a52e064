//! Farmer Producer Organization entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProfileId;

/// Organisation details owned by an FPO profile (same id as the profile)
#[derive(Debug, Clone, Serialize)]
pub struct Fpo {
    pub id: ProfileId,
    pub name: String,
    pub registration_number: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register an FPO
#[derive(Debug, Clone, Deserialize)]
pub struct NewFpo {
    pub name: String,
    pub registration_number: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
}

/// A farmer's membership in an FPO
#[derive(Debug, Clone, Serialize)]
pub struct FpoMembership {
    pub fpo_id: ProfileId,
    pub farmer_id: ProfileId,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}
