//! Sitemap index, per-kind sitemaps, and robots.txt.

use crate::error::{AppError, ContentResultExt};
use crate::response;
use crate::schema::ContentKind;
use crate::sitemap;
use crate::state::AppState;
use crate::store::Scope;
use axum::{extract::State, response::Response};
use chrono::Utc;

pub async fn index(State(state): State<AppState>) -> Response {
    response::xml(sitemap::index(&state.settings.site_url, Utc::now()))
}

pub async fn pages(State(state): State<AppState>) -> Response {
    response::xml(sitemap::urlset(&sitemap::static_entries(&state.settings.site_url, Utc::now())))
}

async fn for_kind(state: &AppState, kind: ContentKind) -> Result<Response, AppError> {
    let entities = state
        .catalog()
        .list(kind, Scope::Published)
        .await
        .or_failed_to(&format!("build {}", sitemap::file_for(kind)))?;
    let entries = sitemap::content_entries(&state.settings.site_url, kind, &entities);
    Ok(response::xml(sitemap::urlset(&entries)))
}

pub async fn blog(State(state): State<AppState>) -> Result<Response, AppError> {
    for_kind(&state, ContentKind::Post).await
}

pub async fn projects(State(state): State<AppState>) -> Result<Response, AppError> {
    for_kind(&state, ContentKind::Project).await
}

pub async fn services(State(state): State<AppState>) -> Result<Response, AppError> {
    for_kind(&state, ContentKind::Service).await
}

pub async fn robots(State(state): State<AppState>) -> Response {
    response::text(sitemap::robots_txt(&state.settings.site_url))
}
