//! Router assembly.

mod auth;
mod common;
mod content;
mod site;

pub use auth::auth_routes;
pub use common::common_routes;
pub use content::content_routes;
pub use site::site_routes;

use crate::auth::admin_gate;
use crate::handlers::pages;
use crate::state::AppState;
use axum::{middleware, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Largest accepted request body: content bodies are markdown text, not uploads.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The whole application: every route, the admin gate, body limit, and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(content_routes(state.clone()))
        .merge(auth_routes(state.clone()))
        .merge(site_routes(state.clone()))
        .fallback(pages::not_found)
        .layer(middleware::from_fn_with_state(state, admin_gate))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
