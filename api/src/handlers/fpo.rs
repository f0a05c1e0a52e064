//! FPO handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::{Fpo, FpoMembership, NewFpo, Profile, ProfileId};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub farmer_id: Uuid,
}

/// POST /fpo
pub async fn register_fpo(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<NewFpo>,
) -> Result<(StatusCode, Json<Fpo>), AppError> {
    let fpo = state.fpo_service.register(&profile, &req).await?;
    Ok((StatusCode::CREATED, Json(fpo)))
}

/// POST /fpo/members
pub async fn add_member(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<FpoMembership>), AppError> {
    let membership = state
        .fpo_service
        .add_member(&profile, &ProfileId(req.farmer_id))
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// GET /fpo/members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<serde_json::Value>, AppError> {
    let members = state.fpo_service.members(&profile).await?;
    Ok(Json(serde_json::json!({
        "count": members.len(),
        "members": members,
    })))
}
