//! In-process content store with the same semantics as the PostgreSQL one.

use super::{ContentStore, Projection, Row, Scope};
use crate::error::ContentError;
use crate::schema::{ColumnType, ContentKind, TableDef, CREATED_AT, ID, SLUG, STATUS, UPDATED_AT};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryContentStore {
    tables: RwLock<HashMap<ContentKind, Vec<Row>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn visible(row: &Row, scope: Scope) -> bool {
    match scope {
        Scope::All => true,
        Scope::Published => row.get(STATUS).and_then(Value::as_str) == Some("published"),
    }
}

fn timestamp(row: &Row, column: &str) -> Option<chrono::DateTime<Utc>> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// `updated_at DESC, id ASC`, matching the SQL ordering.
fn newest_first(a: &Row, b: &Row) -> Ordering {
    timestamp(b, UPDATED_AT)
        .cmp(&timestamp(a, UPDATED_AT))
        .then_with(|| a.get(ID).and_then(Value::as_str).cmp(&b.get(ID).and_then(Value::as_str)))
}

fn project(table: &TableDef, row: &Row, projection: Projection) -> Value {
    match projection {
        Projection::Full => Value::Object(row.clone()),
        Projection::Card => {
            let field = |name: &str| row.get(name).cloned().unwrap_or(Value::Null);
            let date = match row.get(table.date_column) {
                Some(v) if !v.is_null() => v.clone(),
                _ => field(CREATED_AT),
            };
            json!({
                "id": field(ID),
                "slug": field(SLUG),
                "title": field(table.title_column),
                "excerpt": field("excerpt"),
                "thumbnail": field("thumbnail"),
                "category": field("category"),
                "date": date,
            })
        }
    }
}

/// Column default as the database would produce it.
fn default_value(ty: ColumnType, default: Option<&str>) -> Value {
    match (ty, default) {
        (_, None) => Value::Null,
        (ColumnType::TextList, Some(_)) => json!([]),
        (ColumnType::Bool, Some(d)) => Value::Bool(d.eq_ignore_ascii_case("true")),
        (ColumnType::Timestamp, Some(_)) => now(),
        (ColumnType::Text, Some(d)) => Value::String(d.trim_matches('\'').to_string()),
    }
}

fn slug_taken(rows: &[Row], slug: Option<&Value>, except_id: Option<&str>) -> bool {
    let Some(slug) = slug else { return false };
    rows.iter()
        .any(|r| r.get(SLUG) == Some(slug) && r.get(ID).and_then(Value::as_str) != except_id)
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list(&self, kind: ContentKind, scope: Scope, projection: Projection) -> Result<Vec<Value>, ContentError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<&Row> = tables
            .get(&kind)
            .map(|rows| rows.iter().filter(|r| visible(r, scope)).collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| newest_first(a, b));
        Ok(rows.into_iter().map(|r| project(kind.table(), r, projection)).collect())
    }

    async fn find_by_slug(&self, kind: ContentKind, slug: &str, scope: Scope) -> Result<Option<Value>, ContentError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(&kind).and_then(|rows| {
            rows.iter()
                .find(|r| r.get(SLUG).and_then(Value::as_str) == Some(slug) && visible(r, scope))
                .map(|r| Value::Object(r.clone()))
        }))
    }

    async fn find_by_id(&self, kind: ContentKind, id: &str) -> Result<Option<Value>, ContentError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(&kind).and_then(|rows| {
            rows.iter()
                .find(|r| r.get(ID).and_then(Value::as_str) == Some(id))
                .map(|r| Value::Object(r.clone()))
        }))
    }

    async fn insert(&self, kind: ContentKind, row: &Row) -> Result<Value, ContentError> {
        let table = kind.table();
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let rows = tables.entry(kind).or_default();
        if slug_taken(rows, row.get(SLUG), None) {
            let slug = row.get(SLUG).and_then(Value::as_str).unwrap_or_default();
            return Err(ContentError::DuplicateSlug(slug.to_string()));
        }
        if let Some(id) = row.get(ID).and_then(Value::as_str) {
            if rows.iter().any(|r| r.get(ID).and_then(Value::as_str) == Some(id)) {
                return Err(ContentError::duplicate_id(id));
            }
        }
        let mut stored = Row::new();
        for c in table.columns {
            let value = match row.get(c.name) {
                Some(v) if c.name != CREATED_AT && c.name != UPDATED_AT => v.clone(),
                _ => default_value(c.ty, c.default),
            };
            if c.not_null && value.is_null() {
                return Err(ContentError::Invalid(format!("{} cannot be null", c.name)));
            }
            stored.insert(c.name.to_string(), value);
        }
        rows.push(stored.clone());
        Ok(Value::Object(stored))
    }

    async fn update(&self, kind: ContentKind, id: &str, patch: &Row) -> Result<Option<Value>, ContentError> {
        let table = kind.table();
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let rows = tables.entry(kind).or_default();
        let Some(pos) = rows.iter().position(|r| r.get(ID).and_then(Value::as_str) == Some(id)) else {
            return Ok(None);
        };
        if slug_taken(rows, patch.get(SLUG), Some(id)) {
            let slug = patch.get(SLUG).and_then(Value::as_str).unwrap_or_default();
            return Err(ContentError::DuplicateSlug(slug.to_string()));
        }
        if let Some(c) = table.columns.iter().find(|c| c.not_null && patch.get(c.name).is_some_and(Value::is_null)) {
            return Err(ContentError::Invalid(format!("{} cannot be null", c.name)));
        }
        let row = &mut rows[pos];
        for (k, v) in patch {
            if k != ID && table.is_writable(k) {
                row.insert(k.clone(), v.clone());
            }
        }
        row.insert(UPDATED_AT.to_string(), now());
        Ok(Some(Value::Object(row.clone())))
    }

    async fn delete(&self, kind: ContentKind, id: &str) -> Result<bool, ContentError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let Some(rows) = tables.get_mut(&kind) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| r.get(ID).and_then(Value::as_str) != Some(id));
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<(), ContentError> {
        Ok(())
    }
}
