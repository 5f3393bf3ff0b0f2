//! Liveness, readiness and build info.

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached_pages: Option<u64>,
}

async fn health() -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        store: None,
        cached_pages: None,
    })
}

/// Ready once the content store answers.
async fn ready(State(state): State<AppState>) -> Response {
    let cached_pages = Some(state.pages.entry_count());
    match state.store.ping().await {
        Ok(()) => Json(HealthReport {
            status: "ok",
            store: Some("ok"),
            cached_pages,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "content store not reachable");
            let body = HealthReport {
                status: "degraded",
                store: Some("unavailable"),
                cached_pages,
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
