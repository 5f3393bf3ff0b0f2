//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for a content table.

use crate::schema::{TableDef, CREATED_AT, ID, SLUG, STATUS, UPDATED_AT};
use crate::store::{Projection, Scope};
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (safe: only from table definitions).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its cast placeholder, e.g. `$2::jsonb`.
    fn push_param(&mut self, v: Value, pg_type: &str) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), pg_type)
    }
}

fn full_column_list(table: &TableDef) -> String {
    table.column_names().map(quoted).collect::<Vec<_>>().join(", ")
}

/// Card projection: id, slug, title, excerpt, thumbnail, category, date.
fn card_column_list(table: &TableDef) -> String {
    let date = if table.date_column == CREATED_AT {
        quoted(CREATED_AT)
    } else {
        format!("COALESCE({}, {})", quoted(table.date_column), quoted(CREATED_AT))
    };
    [
        quoted(ID),
        quoted(SLUG),
        format!("{} AS {}", quoted(table.title_column), quoted("title")),
        quoted("excerpt"),
        quoted("thumbnail"),
        quoted("category"),
        format!("{} AS {}", date, quoted("date")),
    ]
    .join(", ")
}

fn projection_list(table: &TableDef, projection: Projection) -> String {
    match projection {
        Projection::Full => full_column_list(table),
        Projection::Card => card_column_list(table),
    }
}

fn scope_clause(q: &mut QueryBuf, scope: Scope) -> Option<String> {
    match scope {
        Scope::Published => {
            let ph = q.push_param(Value::String("published".into()), "text");
            Some(format!("{} = {}", quoted(STATUS), ph))
        }
        Scope::All => None,
    }
}

/// Newest first; id breaks ties so list and card queries agree on order.
fn order_clause() -> String {
    format!(" ORDER BY {} DESC, {} ASC", quoted(UPDATED_AT), quoted(ID))
}

/// SELECT every row visible in `scope`, most recently updated first.
pub fn select_list(table: &TableDef, schema: &str, scope: Scope, projection: Projection) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_clause = scope_clause(&mut q, scope)
        .map(|c| format!(" WHERE {}", c))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}",
        projection_list(table, projection),
        qualified_table(schema, table.table),
        where_clause,
        order_clause()
    );
    q
}

/// SELECT one row by slug within `scope`.
pub fn select_by_slug(table: &TableDef, schema: &str, slug: &str, scope: Scope) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut conditions = vec![format!(
        "{} = {}",
        quoted(SLUG),
        q.push_param(Value::String(slug.to_string()), "text")
    )];
    conditions.extend(scope_clause(&mut q, scope));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} LIMIT 1",
        full_column_list(table),
        qualified_table(schema, table.table),
        conditions.join(" AND ")
    );
    q
}

/// SELECT one row by primary key, whatever its status.
pub fn select_by_id(table: &TableDef, schema: &str, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id = q.push_param(Value::String(id.to_string()), "text");
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} LIMIT 1",
        full_column_list(table),
        qualified_table(schema, table.table),
        quoted(ID),
        id
    );
    q
}

/// INSERT one row. Columns missing from `row` that have a default are omitted so the DB fills them.
pub fn insert(table: &TableDef, schema: &str, row: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns {
        if c.name == CREATED_AT || c.name == UPDATED_AT {
            continue;
        }
        let val = match row.get(c.name) {
            Some(v) => v.clone(),
            None if c.default.is_some() => continue,
            None => Value::Null,
        };
        placeholders.push(q.push_param(val, c.ty.pg_type()));
        cols.push(quoted(c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema, table.table),
        cols.join(", "),
        placeholders.join(", "),
        full_column_list(table)
    );
    q
}

/// UPDATE by id: SET only writable columns present in `patch`, always bumping `updated_at`.
pub fn update(table: &TableDef, schema: &str, id: &str, patch: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in patch {
        if k == ID || !table.is_writable(k) {
            continue;
        }
        let Some(c) = table.column(k) else { continue };
        let ph = q.push_param(v.clone(), c.ty.pg_type());
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    sets.push(format!("{} = NOW()", quoted(UPDATED_AT)));
    let id_ph = q.push_param(Value::String(id.to_string()), "text");
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(schema, table.table),
        sets.join(", "),
        quoted(ID),
        id_ph,
        full_column_list(table)
    );
    q
}

/// DELETE by id, returning the id when a row was removed.
pub fn delete(table: &TableDef, schema: &str, id: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_ph = q.push_param(Value::String(id.to_string()), "text");
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        qualified_table(schema, table.table),
        quoted(ID),
        id_ph,
        quoted(ID)
    );
    q
}
