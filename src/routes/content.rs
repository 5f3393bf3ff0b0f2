//! Content API routes. Each kind shares the same generic handlers.

use crate::content::{Content, Post, Project, Service};
use crate::handlers::content::{create, delete, get as read, update};
use crate::handlers::revalidate::revalidate;
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

fn kind_routes<T: Content>() -> axum::routing::MethodRouter<AppState> {
    get(read::<T>).post(create::<T>).put(update::<T>).delete(delete::<T>)
}

/// `/api/blogs`, `/api/projects`, `/api/services`, `/api/revalidate`.
pub fn content_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/blogs", kind_routes::<Post>())
        .route("/api/projects", kind_routes::<Project>())
        .route("/api/services", kind_routes::<Service>())
        .route("/api/revalidate", post(revalidate))
        .with_state(state)
}
