//! Content kinds and their table definitions.
//!
//! Table and column names are static; the SQL builder only ever interpolates identifiers from here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Project,
    Service,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Post, ContentKind::Project, ContentKind::Service];

    pub fn singular(self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Project => "project",
            ContentKind::Service => "service",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Project => "projects",
            ContentKind::Service => "services",
        }
    }

    /// Public listing route; detail pages live at `{listing}/{slug}`.
    pub fn listing_path(self) -> &'static str {
        match self {
            ContentKind::Post => "/blog",
            ContentKind::Project => "/projects",
            ContentKind::Service => "/services",
        }
    }

    pub fn detail_path(self, slug: &str) -> String {
        format!("{}/{}", self.listing_path(), slug)
    }

    pub fn table(self) -> &'static TableDef {
        match self {
            ContentKind::Post => &POSTS,
            ContentKind::Project => &PROJECTS,
            ContentKind::Service => &SERVICES,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Bool,
    /// JSON array of strings.
    TextList,
    Timestamp,
}

impl ColumnType {
    /// PostgreSQL type used for DDL and parameter casts.
    pub fn pg_type(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Bool => "boolean",
            ColumnType::TextList => "jsonb",
            ColumnType::Timestamp => "timestamptz",
        }
    }
}

#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
    /// SQL default expression, also mirrored by the in-memory store.
    pub default: Option<&'static str>,
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        ty,
        not_null: false,
        default: None,
    }
}

const fn required(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        ty,
        not_null: true,
        default: None,
    }
}

const fn defaulted(name: &'static str, ty: ColumnType, default: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        ty,
        not_null: true,
        default: Some(default),
    }
}

#[derive(Debug)]
pub struct TableDef {
    pub kind: ContentKind,
    pub table: &'static str,
    /// Column shown as the entity's title (`name` for projects).
    pub title_column: &'static str,
    /// Column feeding the card's `date`; falls back to `created_at`.
    pub date_column: &'static str,
    pub columns: &'static [ColumnDef],
}

pub const ID: &str = "id";
pub const SLUG: &str = "slug";
pub const STATUS: &str = "status";
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// Columns the server maintains; request bodies cannot set them.
pub const MANAGED_COLUMNS: &[&str] = &[CREATED_AT, UPDATED_AT];

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Columns a request body may write.
    pub fn is_writable(&self, name: &str) -> bool {
        self.column(name).is_some() && !MANAGED_COLUMNS.contains(&name)
    }
}

use ColumnType::{Bool, Text, TextList, Timestamp};

macro_rules! content_columns {
    ($($extra:expr),* $(,)?) => {
        &[
            required(ID, Text),
            required(SLUG, Text),
            $($extra,)*
            col("excerpt", Text),
            col("content", Text),
            col("category", Text),
            defaulted("tags", TextList, "'[]'::jsonb"),
            defaulted(STATUS, Text, "'draft'"),
            col("thumbnail", Text),
            col("seo_title", Text),
            col("seo_description", Text),
            col("seo_keywords", Text),
            col("canonical_url", Text),
            col("og_title", Text),
            col("og_description", Text),
            col("og_image", Text),
            col("twitter_title", Text),
            col("twitter_description", Text),
            col("twitter_image", Text),
            defaulted(CREATED_AT, Timestamp, "NOW()"),
            defaulted(UPDATED_AT, Timestamp, "NOW()"),
        ]
    };
}

pub static POSTS: TableDef = TableDef {
    kind: ContentKind::Post,
    table: "posts",
    title_column: "title",
    date_column: "published_at",
    columns: content_columns!(
        required("title", Text),
        col("author", Text),
        col("published_at", Timestamp),
    ),
};

pub static PROJECTS: TableDef = TableDef {
    kind: ContentKind::Project,
    table: "projects",
    title_column: "name",
    date_column: CREATED_AT,
    columns: content_columns!(
        required("name", Text),
        defaulted("tech_stack", TextList, "'[]'::jsonb"),
        col("live_url", Text),
        col("repo_url", Text),
        col("client", Text),
    ),
};

pub static SERVICES: TableDef = TableDef {
    kind: ContentKind::Service,
    table: "services",
    title_column: "title",
    date_column: CREATED_AT,
    columns: content_columns!(
        required("title", Text),
        col("hook_line", Text),
        defaulted("indexable", Bool, "TRUE"),
    ),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_the_shared_projection() {
        for kind in ContentKind::ALL {
            let t = kind.table();
            assert_eq!(t.kind, kind);
            for name in [ID, SLUG, STATUS, UPDATED_AT, t.title_column] {
                assert!(t.column(name).is_some(), "{} missing {}", t.table, name);
            }
            assert!(t.column(t.date_column).is_some());
        }
    }

    #[test]
    fn managed_columns_are_not_writable() {
        assert!(!POSTS.is_writable(UPDATED_AT));
        assert!(!POSTS.is_writable("nope"));
        assert!(POSTS.is_writable("title"));
        assert!(PROJECTS.is_writable("tech_stack"));
    }

    #[test]
    fn paths() {
        assert_eq!(ContentKind::Post.detail_path("hello"), "/blog/hello");
        assert_eq!(ContentKind::Service.listing_path(), "/services");
    }
}
