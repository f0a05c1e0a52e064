//! Auth handlers
//!
//! Signup, signin, signout and the caller's own profile.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;

use crate::app::auth_service::{SigninRequest, SignupRequest};
use crate::auth::BearerToken;
use crate::domain::entities::{Profile, ProfileUpdate};
use crate::error::AppError;
use crate::AppState;

/// Response carrying a fresh session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub profile: Profile,
    /// Bearer token - only shown once
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub profile: Profile,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let (profile, token) = state.auth_service.signup(&req).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "Signup successful",
            profile,
            token,
        }),
    ))
}

/// POST /auth/signin
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let (profile, token) = state.auth_service.signin(&req).await?;

    Ok(Json(SessionResponse {
        message: "Signin successful",
        profile,
        token,
    }))
}

/// POST /auth/signout
pub async fn signout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AppError> {
    state.auth_service.signout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/profile
pub async fn get_profile(Extension(profile): Extension<Profile>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: None,
        profile,
    })
}

/// PUT /auth/profile
///
/// Role is not part of `ProfileUpdate`, so a `role` field in the body is ignored.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.auth_service.update_profile(&profile.id, &update).await?;

    Ok(Json(ProfileResponse {
        message: Some("Profile updated successfully"),
        profile,
    }))
}
