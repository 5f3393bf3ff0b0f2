//! PostgreSQL content store.

use super::{ContentStore, Projection, Row, Scope};
use crate::error::ContentError;
use crate::schema::{ContentKind, ID, SLUG};
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
    schema: String,
}

impl PgContentStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgContentStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, ContentError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Value>, ContentError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn list(&self, kind: ContentKind, scope: Scope, projection: Projection) -> Result<Vec<Value>, ContentError> {
        let q = sql::select_list(kind.table(), &self.schema, scope, projection);
        self.fetch_all(&q).await
    }

    async fn find_by_slug(&self, kind: ContentKind, slug: &str, scope: Scope) -> Result<Option<Value>, ContentError> {
        let q = sql::select_by_slug(kind.table(), &self.schema, slug, scope);
        self.fetch_optional(&q).await
    }

    async fn find_by_id(&self, kind: ContentKind, id: &str) -> Result<Option<Value>, ContentError> {
        let q = sql::select_by_id(kind.table(), &self.schema, id);
        self.fetch_optional(&q).await
    }

    async fn insert(&self, kind: ContentKind, row: &Row) -> Result<Value, ContentError> {
        let q = sql::insert(kind.table(), &self.schema, row);
        self.fetch_optional(&q)
            .await
            .map_err(|e| unique_conflict(e, row))?
            .ok_or(ContentError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, kind: ContentKind, id: &str, patch: &Row) -> Result<Option<Value>, ContentError> {
        let q = sql::update(kind.table(), &self.schema, id, patch);
        self.fetch_optional(&q).await.map_err(|e| unique_conflict(e, patch))
    }

    async fn delete(&self, kind: ContentKind, id: &str) -> Result<bool, ContentError> {
        let q = sql::delete(kind.table(), &self.schema, id);
        Ok(self.fetch_optional(&q).await?.is_some())
    }

    async fn ping(&self) -> Result<(), ContentError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum UniqueKey {
    Slug,
    Id,
}

/// Which content key a unique constraint guards. An unnamed violation is taken as the slug.
fn unique_key(constraint: Option<&str>) -> Option<UniqueKey> {
    match constraint {
        None => Some(UniqueKey::Slug),
        Some(c) if c.ends_with("_slug_key") => Some(UniqueKey::Slug),
        Some(c) if c.ends_with("_pkey") => Some(UniqueKey::Id),
        Some(_) => None,
    }
}

/// Map unique violations on the slug or primary key to the errors the memory store returns.
fn unique_conflict(e: ContentError, row: &Row) -> ContentError {
    let ContentError::Db(sqlx::Error::Database(ref db)) = e else {
        return e;
    };
    if !db.is_unique_violation() {
        return e;
    }
    let text = |col: &str| row.get(col).and_then(Value::as_str).unwrap_or_default().to_string();
    match unique_key(db.constraint()) {
        Some(UniqueKey::Slug) => ContentError::DuplicateSlug(text(SLUG)),
        Some(UniqueKey::Id) => ContentError::duplicate_id(&text(ID)),
        None => e,
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), ContentError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\"")))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), ContentError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ContentError::Invalid("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}
