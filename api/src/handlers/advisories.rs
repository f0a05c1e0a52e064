//! Advisory handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{
    Advisory, AdvisoryFilter, AdvisoryId, AdvisoryType, AdvisoryUpdate, CropCycleId, NewAdvisory,
    Priority, Profile,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing advisories
#[derive(Debug, Deserialize)]
pub struct ListAdvisoriesQuery {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(rename = "type")]
    pub advisory_type: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    50
}

/// Request to create an advisory
#[derive(Debug, Deserialize)]
pub struct CreateAdvisoryRequest {
    pub crop_cycle_id: Option<Uuid>,
    #[serde(alias = "type")]
    pub advisory_type: Option<AdvisoryType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub action_required: Option<bool>,
    pub valid_until: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

impl CreateAdvisoryRequest {
    fn into_new_advisory(self, profile: &Profile) -> Result<NewAdvisory, AppError> {
        let (Some(advisory_type), Some(title), Some(description)) =
            (self.advisory_type, self.title, self.description)
        else {
            return Err(AppError::BadRequest(
                "Type, title, and description are required".to_string(),
            ));
        };

        Ok(NewAdvisory {
            farmer_id: profile.id,
            crop_cycle_id: self.crop_cycle_id.map(CropCycleId),
            advisory_type,
            title,
            description,
            priority: self.priority.unwrap_or(Priority::Medium),
            action_required: self.action_required.unwrap_or(false),
            valid_until: self.valid_until,
            metadata: self.metadata.unwrap_or_else(|| serde_json::json!({})),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AdvisoryListResponse {
    pub advisories: Vec<Advisory>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct AdvisoryResponse {
    pub message: &'static str,
    pub advisory: Advisory,
}

/// GET /advisories
pub async fn list_advisories(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<ListAdvisoriesQuery>,
) -> Result<Json<AdvisoryListResponse>, AppError> {
    let advisory_type = query
        .advisory_type
        .as_deref()
        .map(str::parse::<AdvisoryType>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = AdvisoryFilter {
        unread_only: query.unread_only,
        advisory_type,
        limit: Some(query.limit),
        ..Default::default()
    };

    let advisories = state.advisory_service.list(&profile, filter).await?;
    Ok(Json(AdvisoryListResponse {
        count: advisories.len(),
        advisories,
    }))
}

/// POST /advisories
pub async fn create_advisory(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<CreateAdvisoryRequest>,
) -> Result<(StatusCode, Json<AdvisoryResponse>), AppError> {
    let new_advisory = req.into_new_advisory(&profile)?;
    let advisory = state.advisory_service.create(&profile, new_advisory).await?;

    Ok((
        StatusCode::CREATED,
        Json(AdvisoryResponse {
            message: "Advisory created successfully",
            advisory,
        }),
    ))
}

/// PUT /advisories/:id
pub async fn update_advisory(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
    Json(update): Json<AdvisoryUpdate>,
) -> Result<Json<AdvisoryResponse>, AppError> {
    let advisory = state
        .advisory_service
        .update(&profile, &AdvisoryId(id), &update)
        .await?;

    Ok(Json(AdvisoryResponse {
        message: "Advisory updated successfully",
        advisory,
    }))
}

/// DELETE /advisories/:id
pub async fn delete_advisory(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .advisory_service
        .delete(&profile, &AdvisoryId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_farmer;

    #[test]
    fn create_request_fills_defaults() {
        let farmer = test_farmer();
        let req: CreateAdvisoryRequest = serde_json::from_str(
            r#"{"type": "irrigation", "title": "Water today", "description": "Soil is dry"}"#,
        )
        .unwrap();

        let advisory = req.into_new_advisory(&farmer).unwrap();
        assert_eq!(advisory.farmer_id, farmer.id);
        assert_eq!(advisory.advisory_type, AdvisoryType::Irrigation);
        assert_eq!(advisory.priority, Priority::Medium);
        assert!(!advisory.action_required);
        assert_eq!(advisory.metadata, serde_json::json!({}));
    }

    #[test]
    fn create_request_requires_type_title_and_description() {
        let req: CreateAdvisoryRequest =
            serde_json::from_str(r#"{"title": "Water today", "description": "Soil is dry"}"#)
                .unwrap();
        assert!(matches!(
            req.into_new_advisory(&test_farmer()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn list_query_defaults() {
        let query: ListAdvisoriesQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.unread_only);
        assert_eq!(query.limit, 50);
        assert!(query.advisory_type.is_none());
    }
}
