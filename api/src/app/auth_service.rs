//! Auth service
//!
//! Handles signup, signin, bearer sessions and profile updates.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::entities::{NewProfile, Profile, ProfileId, ProfileUpdate, Role, Session};
use crate::domain::ports::{ProfileRepository, SessionRepository};
use crate::error::{AppError, DomainError};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Signup request
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub language: Option<String>,
}

/// Signin request
#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
}

/// Either an email or a phone number, never both
#[derive(Debug, Clone, PartialEq, Eq)]
enum Login {
    Email(String),
    Phone(String),
}

impl Login {
    fn from_parts(email: Option<&str>, phone: Option<&str>) -> Result<Self, AppError> {
        let email = email.map(str::trim).filter(|s| !s.is_empty());
        let phone = phone.map(str::trim).filter(|s| !s.is_empty());
        match (email, phone) {
            (Some(email), None) => {
                if !email.contains('@') {
                    return Err(AppError::Domain(DomainError::Validation(
                        "Invalid email address".to_string(),
                    )));
                }
                Ok(Login::Email(email.to_lowercase()))
            }
            (None, Some(phone)) => Ok(Login::Phone(phone.to_string())),
            _ => Err(AppError::Domain(DomainError::Validation(
                "Provide exactly one of email or phone".to_string(),
            ))),
        }
    }
}

/// Service for authentication and profiles
pub struct AuthService<PR, SR>
where
    PR: ProfileRepository,
    SR: SessionRepository,
{
    profiles: Arc<PR>,
    sessions: Arc<SR>,
    session_ttl: Duration,
}

impl<PR, SR> AuthService<PR, SR>
where
    PR: ProfileRepository,
    SR: SessionRepository,
{
    pub fn new(profiles: Arc<PR>, sessions: Arc<SR>, session_ttl_hours: i64) -> Self {
        Self {
            profiles,
            sessions,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// Register a new profile and open a session.
    ///
    /// Returns the profile and the bearer token (only shown once).
    pub async fn signup(&self, req: &SignupRequest) -> Result<(Profile, String), AppError> {
        let login = Login::from_parts(req.email.as_deref(), req.phone.as_deref())?;

        if req.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Domain(DomainError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))));
        }

        if self.find_by_login(&login).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(
                "An account with this email or phone already exists".to_string(),
            )));
        }

        let (email, phone) = match login {
            Login::Email(email) => (Some(email), None),
            Login::Phone(phone) => (None, Some(phone)),
        };

        let profile = self
            .profiles
            .create(&NewProfile {
                email,
                phone,
                password_hash: hash_password(&req.password)?,
                full_name: req.full_name.clone(),
                role: req.role.unwrap_or(Role::Farmer),
                language: req.language.clone().unwrap_or_else(|| "en".to_string()),
            })
            .await?;

        tracing::info!(profile_id = %profile.id, role = %profile.role, "Profile created");

        let token = self.open_session(&profile.id).await?;
        Ok((profile, token))
    }

    /// Verify credentials and open a session
    pub async fn signin(&self, req: &SigninRequest) -> Result<(Profile, String), AppError> {
        let login = Login::from_parts(req.email.as_deref(), req.phone.as_deref())?;

        let profile = self
            .find_by_login(&login)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&req.password, &profile.password_hash) {
            return Err(AppError::Unauthorized);
        }

        let token = self.open_session(&profile.id).await?;
        Ok((profile, token))
    }

    /// End the session identified by this raw token
    pub async fn signout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.delete(&hash_token(token)).await?;
        Ok(())
    }

    /// Resolve a raw bearer token to its profile, if the session is live
    pub async fn authenticate(&self, token: &str) -> Result<Option<Profile>, AppError> {
        let Some(session) = self.sessions.find_by_token_hash(&hash_token(token)).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.sessions.delete(&session.token_hash).await?;
            return Ok(None);
        }

        Ok(self.profiles.find_by_id(&session.profile_id).await?)
    }

    pub async fn update_profile(
        &self,
        id: &ProfileId,
        update: &ProfileUpdate,
    ) -> Result<Profile, AppError> {
        if let Some(acres) = update.farm_size_acres {
            if acres < 0.0 {
                return Err(AppError::Domain(DomainError::Validation(
                    "farm_size_acres must not be negative".to_string(),
                )));
            }
        }
        Ok(self.profiles.update(id, update).await?)
    }

    /// Drop expired sessions
    pub async fn purge_expired_sessions(&self) -> Result<u64, AppError> {
        Ok(self.sessions.delete_expired(Utc::now()).await?)
    }

    async fn find_by_login(&self, login: &Login) -> Result<Option<Profile>, DomainError> {
        match login {
            Login::Email(email) => self.profiles.find_by_email(email).await,
            Login::Phone(phone) => self.profiles.find_by_phone(phone).await,
        }
    }

    async fn open_session(&self, profile_id: &ProfileId) -> Result<String, AppError> {
        let token = generate_session_token();
        let now = Utc::now();

        self.sessions
            .create(&Session {
                token_hash: hash_token(&token),
                profile_id: *profile_id,
                expires_at: now + self.session_ttl,
                created_at: now,
            })
            .await?;

        Ok(token)
    }
}

/// Generate a random session token
fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("ciq-{}", hex::encode(bytes))
}

/// Hash a session token for storage
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
