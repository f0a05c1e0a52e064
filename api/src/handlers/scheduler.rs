//! Scheduler handlers
//!
//! Manual task runs for admins, a signed webhook for external cron, and
//! the status report.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::app::access::require_role;
use crate::app::scheduler_service::{RunSummary, SchedulerStatus, TaskSelection};
use crate::domain::entities::{Profile, Role};
use crate::error::AppError;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "X-Signature";

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub task: String,
}

impl RunRequest {
    fn selection(&self) -> Result<TaskSelection, AppError> {
        self.task.parse().map_err(AppError::BadRequest)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub detailed: bool,
}

/// Verify an HMAC-SHA256 signature sent as `sha256=<hex>`
pub fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let Some(sig_header) = signature else {
        tracing::warn!("No signature provided in scheduler webhook");
        return false;
    };

    let Some(expected_hex) = sig_header.strip_prefix("sha256=") else {
        tracing::warn!("Signature is missing the sha256= prefix");
        return false;
    };

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => {
            tracing::error!("Invalid scheduler secret key");
            return false;
        }
    };

    mac.update(payload);

    let expected_bytes = match hex::decode(expected_hex) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid signature format");
            return false;
        }
    };

    mac.verify_slice(&expected_bytes).is_ok()
}

/// POST /scheduler
///
/// Admin-only. `{"task": "all"}` runs every task in order.
pub async fn run_tasks(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunSummary>, AppError> {
    require_role(&profile, Role::Admin)?;
    let selection = req.selection()?;

    tracing::info!(task = %req.task, profile_id = %profile.id, "Manual scheduler run");
    Ok(Json(state.scheduler_service.run(selection, Utc::now()).await))
}

/// POST /scheduler/webhook
///
/// Same as `POST /scheduler` but authenticated by an HMAC of the body.
/// Disabled unless `SCHEDULER_SECRET` is set.
pub async fn scheduler_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RunSummary>, AppError> {
    let Some(secret) = state.config.scheduler_secret.as_deref() else {
        return Err(AppError::NotFound("Scheduler webhook is disabled".to_string()));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok());

    if !verify_signature(&body, signature, secret) {
        tracing::warn!("Scheduler webhook signature verification failed");
        return Err(AppError::Unauthorized);
    }

    let req: RunRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse scheduler webhook payload");
        AppError::BadRequest(format!("Invalid JSON: {}", e))
    })?;
    let selection = req.selection()?;

    tracing::info!(task = %req.task, "Scheduler webhook run");
    Ok(Json(state.scheduler_service.run(selection, Utc::now()).await))
}

/// GET /scheduler/status
pub async fn scheduler_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<SchedulerStatus>, AppError> {
    let status = state
        .scheduler_service
        .status(query.detailed, Utc::now())
        .await?;
    Ok(Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"task":"all"}"#;
        let signature = sign("harvest-moon", body);
        assert!(verify_signature(body, Some(&signature), "harvest-moon"));
    }

    #[test]
    fn rejects_wrong_secret_missing_or_bare_signature() {
        let body = br#"{"task":"all"}"#;
        let signature = sign("other-secret", body);
        assert!(!verify_signature(body, Some(&signature), "harvest-moon"));
        assert!(!verify_signature(body, None, "harvest-moon"));

        let bare = sign("harvest-moon", body).trim_start_matches("sha256=").to_string();
        assert!(!verify_signature(body, Some(&bare), "harvest-moon"));
    }

    #[test]
    fn rejects_tampered_body() {
        let signature = sign("harvest-moon", br#"{"task":"weather_update"}"#);
        assert!(!verify_signature(
            br#"{"task":"all"}"#,
            Some(&signature),
            "harvest-moon"
        ));
    }

    #[test]
    fn run_request_parses_selection() {
        let req = RunRequest {
            task: "all".to_string(),
        };
        assert_eq!(req.selection().unwrap(), TaskSelection::All);

        let req = RunRequest {
            task: "reboot".to_string(),
        };
        assert!(matches!(req.selection(), Err(AppError::BadRequest(_))));
    }
}
