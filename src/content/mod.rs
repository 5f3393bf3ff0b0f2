//! Content facades: typed entities, validation, and the per-kind APIs.

mod api;
pub mod model;
pub mod validation;

pub use api::{BlogApi, ContentApi, ContentCatalog, ProjectApi, ServiceApi};
pub use model::{Content, ContentCard, ContentEntity, EntitySummary, Post, Project, Seo, Service, Status};
