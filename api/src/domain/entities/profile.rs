//! Profile domain entity
//!
//! A registered CropIQ user. The role decides which records the user can see.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GeoPoint;

/// Unique identifier for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ProfileId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Fpo,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "farmer"),
            Role::Fpo => write!(f, "fpo"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "farmer" => Ok(Role::Farmer),
            "fpo" => Ok(Role::Fpo),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A CropIQ user
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub language: String,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub farm_size_acres: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.location_lat, self.location_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// "District, State" with gaps filled in
    pub fn location_label(&self) -> String {
        format!(
            "{}, {}",
            self.district.as_deref().unwrap_or("Unknown"),
            self.state.as_deref().unwrap_or("Unknown")
        )
    }
}

/// Data needed to create a new profile
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub language: String,
}

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub language: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub farm_size_acres: Option<f64>,
}

/// Profile counts per role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub total_users: u64,
    pub farmers: u64,
    pub fpos: u64,
    pub admins: u64,
}

/// A bearer session for a profile
#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: String,
    pub profile_id: ProfileId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
