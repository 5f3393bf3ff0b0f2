//! Public pages, dashboards, and sitemaps.

use crate::content::{Post, Project, Service};
use crate::handlers::{pages, sitemap};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn site_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/blog", get(pages::listing::<Post>))
        .route("/blog/:slug", get(pages::detail::<Post>))
        .route("/projects", get(pages::listing::<Project>))
        .route("/projects/:slug", get(pages::detail::<Project>))
        .route("/services", get(pages::listing::<Service>))
        .route("/services/:slug", get(pages::detail::<Service>))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/admin", get(pages::admin_dashboard))
        .route("/udyomx-admin", get(pages::admin_dashboard))
        .route("/unauthorized", get(pages::unauthorized))
        .route("/not-found", get(pages::not_found))
        .route("/sitemap.xml", get(sitemap::index))
        .route("/sitemap-pages.xml", get(sitemap::pages))
        .route("/sitemap-blog.xml", get(sitemap::blog))
        .route("/sitemap-projects.xml", get(sitemap::projects))
        .route("/sitemap-services.xml", get(sitemap::services))
        .route("/robots.txt", get(sitemap::robots))
        .with_state(state)
}
