//! Udyomx site: content API, server-rendered pages, page revalidation, and Google admin sign-in.

pub mod auth;
pub mod cache;
pub mod content;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod markdown;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod settings;
pub mod sitemap;
pub mod sql;
pub mod state;
pub mod store;

pub use auth::{GoogleOAuth, IdentityProvider};
pub use cache::{PageCache, Revalidate};
pub use content::{BlogApi, ContentApi, ProjectApi, ServiceApi};
pub use error::{AppError, ConfigError, ContentError};
pub use migration::apply_migrations;
pub use routes::app;
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_database_exists, ContentStore, MemoryContentStore, PgContentStore};
