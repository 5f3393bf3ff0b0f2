//! Manual page revalidation: `POST /api/revalidate {path, type?}`.

use crate::cache::{revalidate_all, revalidation_targets};
use crate::error::AppError;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct RevalidateRequest {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub now: i64,
}

pub async fn revalidate(State(state): State<AppState>, body: Bytes) -> Result<Json<RevalidateResponse>, AppError> {
    let req: RevalidateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let path = req
        .path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Path is required".into()))?;

    let targets = revalidation_targets(path, req.kind.as_deref());
    revalidate_all(state.revalidator.as_ref(), &targets).await;
    tracing::info!(targets = ?targets, "revalidation requested");

    Ok(Json(RevalidateResponse {
        revalidated: true,
        message: format!("Revalidated {}", targets.join(", ")),
        now: Utc::now().timestamp_millis(),
    }))
}
