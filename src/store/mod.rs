//! Row storage for content tables.
//!
//! Stores speak JSON rows keyed by column name; the content facades decode them into typed
//! entities. Both implementations share filter, order and projection semantics.

mod memory;
mod postgres;

pub use memory::MemoryContentStore;
pub use postgres::{ensure_database_exists, PgContentStore};

use crate::error::ContentError;
use crate::schema::ContentKind;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Which rows a query may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Only rows whose status is `published`.
    Published,
    /// Every row, for the admin dashboard.
    All,
}

/// Which columns a list query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Full,
    /// id, slug, title, excerpt, thumbnail, category, date.
    Card,
}

pub type Row = Map<String, Value>;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Rows in `scope`, most recently updated first.
    async fn list(&self, kind: ContentKind, scope: Scope, projection: Projection) -> Result<Vec<Value>, ContentError>;

    async fn find_by_slug(&self, kind: ContentKind, slug: &str, scope: Scope) -> Result<Option<Value>, ContentError>;

    /// Row `id` whatever its status.
    async fn find_by_id(&self, kind: ContentKind, id: &str) -> Result<Option<Value>, ContentError>;

    /// Insert a fully prepared row (id and slug present). Fails with `DuplicateSlug` on a taken slug
    /// and `Invalid` on a taken id.
    async fn insert(&self, kind: ContentKind, row: &Row) -> Result<Value, ContentError>;

    /// Patch writable columns of row `id`. `None` when no such row exists.
    async fn update(&self, kind: ContentKind, id: &str, patch: &Row) -> Result<Option<Value>, ContentError>;

    /// Remove row `id`. Returns whether a row was removed.
    async fn delete(&self, kind: ContentKind, id: &str) -> Result<bool, ContentError>;

    /// Cheap connectivity check for readiness checks.
    async fn ping(&self) -> Result<(), ContentError>;
}
