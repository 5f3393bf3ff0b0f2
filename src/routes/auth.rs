//! Sign-in and session routes.

use crate::handlers::auth::{google_callback, google_start, session, signout};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/auth/google", get(google_start))
        .route("/auth/google/callback", get(google_callback))
        .route("/api/auth/session", get(session))
        .route("/api/auth/signout", post(signout))
        .with_state(state)
}
