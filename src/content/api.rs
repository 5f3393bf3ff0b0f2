//! Per-kind content facades over a `ContentStore`.

use super::model::{Content, ContentCard, ContentEntity, Post, Project, Service};
use super::validation::{normalize, slugify, validate_create, validate_patch};
use crate::error::ContentError;
use crate::schema::{ContentKind, ID, SLUG};
use crate::store::{ContentStore, Projection, Row, Scope};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Facade for one content kind. Holds no state besides the shared store handle.
pub struct ContentApi<T> {
    store: Arc<dyn ContentStore>,
    _kind: PhantomData<fn() -> T>,
}

pub type BlogApi = ContentApi<Post>;
pub type ProjectApi = ContentApi<Project>;
pub type ServiceApi = ContentApi<Service>;

impl<T> Clone for ContentApi<T> {
    fn clone(&self) -> Self {
        ContentApi {
            store: Arc::clone(&self.store),
            _kind: PhantomData,
        }
    }
}

impl<T: Content> ContentApi<T> {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        ContentApi {
            store,
            _kind: PhantomData,
        }
    }

    fn kind(&self) -> ContentKind {
        T::KIND
    }

    fn decode(row: Value) -> Result<T, ContentError> {
        Ok(serde_json::from_value(row)?)
    }

    fn decode_all(rows: Vec<Value>) -> Result<Vec<T>, ContentError> {
        rows.into_iter().map(Self::decode).collect()
    }

    /// Published rows, most recently updated first.
    pub async fn get_all(&self) -> Result<Vec<T>, ContentError> {
        let rows = self.store.list(self.kind(), Scope::Published, Projection::Full).await?;
        Self::decode_all(rows)
    }

    /// Same rows and order as `get_all`, reduced to card fields.
    pub async fn get_all_for_cards(&self) -> Result<Vec<ContentCard>, ContentError> {
        let rows = self.store.list(self.kind(), Scope::Published, Projection::Card).await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(ContentError::from))
            .collect()
    }

    /// Every row regardless of status.
    pub async fn get_all_admin(&self) -> Result<Vec<T>, ContentError> {
        let rows = self.store.list(self.kind(), Scope::All, Projection::Full).await?;
        Self::decode_all(rows)
    }

    /// Published entity with this slug, or `None`.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<T>, ContentError> {
        self.store
            .find_by_slug(self.kind(), slug, Scope::Published)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Entity with this slug whatever its status, for editing.
    pub async fn get_by_slug_admin(&self, slug: &str) -> Result<Option<T>, ContentError> {
        self.store
            .find_by_slug(self.kind(), slug, Scope::All)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Entity with this id whatever its status.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>, ContentError> {
        self.store.find_by_id(self.kind(), id).await?.map(Self::decode).transpose()
    }

    /// Insert a new entity. A missing id is generated; a missing slug is derived from the title.
    pub async fn create(&self, data: Row) -> Result<T, ContentError> {
        let table = self.kind().table();
        let mut row = normalize(table, data);
        if !row.get(ID).is_some_and(|v| v.as_str().is_some_and(|s| !s.trim().is_empty())) {
            row.insert(ID.to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        if row.get(SLUG).map_or(true, Value::is_null) {
            if let Some(title) = row.get(table.title_column).and_then(Value::as_str) {
                let slug = slugify(title);
                if !slug.is_empty() {
                    row.insert(SLUG.to_string(), Value::String(slug));
                }
            }
        }
        validate_create(table, &row)?;
        let created = self.store.insert(self.kind(), &row).await?;
        tracing::info!(kind = %self.kind(), id = ?created.get(ID), "content created");
        Self::decode(created)
    }

    /// Patch an existing entity. `None` when `id` does not exist.
    pub async fn update(&self, id: &str, data: Row) -> Result<Option<T>, ContentError> {
        let table = self.kind().table();
        let mut patch = normalize(table, data);
        patch.remove(ID);
        validate_patch(table, &patch)?;
        match self.store.update(self.kind(), id, &patch).await? {
            Some(row) => {
                tracing::info!(kind = %self.kind(), id = %id, "content updated");
                Self::decode(row).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Remove an entity. Removing an id that does not exist is not an error.
    pub async fn delete(&self, id: &str) -> Result<(), ContentError> {
        let removed = self.store.delete(self.kind(), id).await?;
        if removed {
            tracing::info!(kind = %self.kind(), id = %id, "content deleted");
        } else {
            tracing::debug!(kind = %self.kind(), id = %id, "delete of missing content");
        }
        Ok(())
    }
}

/// Kind-agnostic listing across every content table.
#[derive(Clone)]
pub struct ContentCatalog {
    store: Arc<dyn ContentStore>,
}

impl ContentCatalog {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        ContentCatalog { store }
    }

    pub async fn list(&self, kind: ContentKind, scope: Scope) -> Result<Vec<ContentEntity>, ContentError> {
        let rows = self.store.list(kind, scope, Projection::Full).await?;
        rows.into_iter()
            .map(|r| ContentEntity::from_row(kind, r).map_err(ContentError::from))
            .collect()
    }

    /// Every kind, in `ContentKind::ALL` order.
    pub async fn list_all(&self, scope: Scope) -> Result<Vec<(ContentKind, Vec<ContentEntity>)>, ContentError> {
        let mut out = Vec::with_capacity(ContentKind::ALL.len());
        for kind in ContentKind::ALL {
            out.push((kind, self.list(kind, scope).await?));
        }
        Ok(out)
    }
}
