//! Udyomx site server.
//!
//! Run from repo root: `cargo run -p udyomx-server`. Reads `.env` when present.

use std::sync::Arc;
use tokio::net::TcpListener;
use udyomx_site::{
    app, apply_migrations, ensure_database_exists, AppState, GoogleOAuth, PgContentStore, Settings,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("udyomx_site=info,udyomx_server=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool, &settings.db_schema).await?;

    let store = Arc::new(PgContentStore::new(pool, settings.db_schema.clone()));
    let identity = Arc::new(GoogleOAuth::new(settings.google.clone()));
    let bind_addr = settings.bind_addr.clone();
    let state = AppState::new(store, identity, settings);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
