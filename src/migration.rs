//! Idempotent DDL for the content tables: schema, tables, constraints, and listing indexes.
//! Safe to run on every startup.

use crate::error::ContentError;
use crate::schema::{ContentKind, TableDef, ID, SLUG, STATUS, UPDATED_AT};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_def(c: &crate::schema::ColumnDef) -> String {
    let mut def = format!("{} {}", quote(c.name), c.ty.pg_type());
    if c.not_null {
        def.push_str(" NOT NULL");
    }
    if let Some(d) = c.default {
        def.push_str(" DEFAULT ");
        def.push_str(d);
    }
    def
}

/// Statements creating (or catching up) one content table, in execution order.
pub fn table_ddl(table: &TableDef, schema: &str) -> Vec<String> {
    let full_name = format!("{}.{}", quote(schema), quote(table.table));
    let mut defs: Vec<String> = table.columns.iter().map(column_def).collect();
    defs.push(format!("PRIMARY KEY ({})", quote(ID)));
    defs.push(format!(
        "CONSTRAINT {} UNIQUE ({})",
        quote(&format!("{}_slug_key", table.table)),
        quote(SLUG)
    ));
    defs.push(format!(
        "CONSTRAINT {} CHECK ({} IN ('draft', 'published'))",
        quote(&format!("{}_status_check", table.table)),
        quote(STATUS)
    ));

    let mut stmts = vec![format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        full_name,
        defs.join(",\n    ")
    )];
    // Columns added after a table was first created; NOT NULL ones need a default to backfill.
    for c in table.columns.iter().filter(|c| !c.not_null || c.default.is_some()) {
        stmts.push(format!("ALTER TABLE {} ADD COLUMN IF NOT EXISTS {}", full_name, column_def(c)));
    }
    stmts.push(format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({}, {} DESC)",
        quote(&format!("{}_status_updated_idx", table.table)),
        full_name,
        quote(STATUS),
        quote(UPDATED_AT)
    ));
    stmts
}

pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), ContentError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema)))
        .execute(pool)
        .await?;
    for kind in ContentKind::ALL {
        for sql in table_ddl(kind.table(), schema) {
            tracing::debug!(sql = %sql, "migration");
            sqlx::query(&sql).execute(pool).await?;
        }
        tracing::info!(table = kind.table().table, schema, "content table ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{POSTS, SERVICES};

    #[test]
    fn create_table_carries_constraints() {
        let stmts = table_ddl(&POSTS, "public");
        let create = &stmts[0];
        assert!(create.starts_with("CREATE TABLE IF NOT EXISTS \"public\".\"posts\""));
        assert!(create.contains("\"id\" text NOT NULL"));
        assert!(create.contains("\"tags\" jsonb NOT NULL DEFAULT '[]'::jsonb"));
        assert!(create.contains("\"status\" text NOT NULL DEFAULT 'draft'"));
        assert!(create.contains("CONSTRAINT \"posts_slug_key\" UNIQUE (\"slug\")"));
        assert!(create.contains("\"published_at\" timestamptz"));
        assert!(stmts.last().unwrap().contains("(\"status\", \"updated_at\" DESC)"));
    }

    #[test]
    fn catch_up_skips_required_columns_without_default() {
        let stmts = table_ddl(&SERVICES, "site");
        assert!(stmts.iter().any(|s| s.contains("ADD COLUMN IF NOT EXISTS \"indexable\" boolean NOT NULL DEFAULT TRUE")));
        assert!(!stmts.iter().any(|s| s.contains("ADD COLUMN IF NOT EXISTS \"title\"")));
        assert!(!stmts.iter().any(|s| s.contains("ADD COLUMN IF NOT EXISTS \"slug\"")));
    }
}
