//! Bearer token authentication middleware

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::AppState;

/// Extract the session token from the Authorization header
pub fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware
///
/// Resolves the bearer token to a live session and injects the caller's
/// `Profile` into request extensions. Missing, unknown and expired tokens
/// are rejected with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let profile = state
        .auth_service
        .authenticate(token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    tracing::debug!(profile_id = %profile.id, role = %profile.role, "Authenticated request");
    request.extensions_mut().insert(profile);

    Ok(next.run(request).await)
}

/// The raw token of an authenticated request, for signout
pub struct BearerToken(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_bearer_token(&parts.headers)
            .map(|t| BearerToken(t.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}
