//! Typed content entities decoded from store rows.

use crate::schema::ContentKind;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,
    Published,
}

/// Search and social overrides shared by every kind. Empty fields fall back to the entity's own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub og_title: Option<String>,
    #[serde(default)]
    pub og_description: Option<String>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub twitter_title: Option<String>,
    #[serde(default)]
    pub twitter_description: Option<String>,
    #[serde(default)]
    pub twitter_image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub seo: Seo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub seo: Seo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub hook_line: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether search engines may list the page. Non-indexable services stay out of sitemaps.
    #[serde(default = "default_true")]
    pub indexable: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub seo: Seo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Reduced projection for listing grids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentCard {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Fields every kind exposes, whatever its own column names are.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntitySummary {
    pub kind: ContentKind,
    pub id: String,
    pub slug: String,
    pub title: String,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

impl EntitySummary {
    pub fn path(&self) -> String {
        self.kind.detail_path(&self.slug)
    }
}

/// A content row of a known kind.
pub trait Content: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: ContentKind;

    fn summary(&self) -> EntitySummary;

    fn body(&self) -> Option<&str>;

    fn excerpt(&self) -> Option<&str>;

    fn seo(&self) -> &Seo;
}

macro_rules! impl_content {
    ($ty:ty, $kind:expr, $title:ident) => {
        impl Content for $ty {
            const KIND: ContentKind = $kind;

            fn summary(&self) -> EntitySummary {
                EntitySummary {
                    kind: $kind,
                    id: self.id.clone(),
                    slug: self.slug.clone(),
                    title: self.$title.clone(),
                    status: self.status,
                    updated_at: self.updated_at,
                }
            }

            fn body(&self) -> Option<&str> {
                self.content.as_deref()
            }

            fn excerpt(&self) -> Option<&str> {
                self.excerpt.as_deref()
            }

            fn seo(&self) -> &Seo {
                &self.seo
            }
        }
    };
}

impl_content!(Post, ContentKind::Post, title);
impl_content!(Project, ContentKind::Project, name);
impl_content!(Service, ContentKind::Service, title);

/// Any content entity, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentEntity {
    Post(Post),
    Project(Project),
    Service(Service),
}

impl ContentEntity {
    /// Decode a full store row of `kind`.
    pub fn from_row(kind: ContentKind, row: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ContentKind::Post => ContentEntity::Post(serde_json::from_value(row)?),
            ContentKind::Project => ContentEntity::Project(serde_json::from_value(row)?),
            ContentKind::Service => ContentEntity::Service(serde_json::from_value(row)?),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentEntity::Post(_) => ContentKind::Post,
            ContentEntity::Project(_) => ContentKind::Project,
            ContentEntity::Service(_) => ContentKind::Service,
        }
    }

    pub fn summary(&self) -> EntitySummary {
        match self {
            ContentEntity::Post(p) => p.summary(),
            ContentEntity::Project(p) => p.summary(),
            ContentEntity::Service(s) => s.summary(),
        }
    }

    /// Whether the entity belongs in public sitemaps.
    pub fn is_indexable(&self) -> bool {
        match self {
            ContentEntity::Service(s) => s.indexable && s.status == Status::Published,
            other => other.summary().status == Status::Published,
        }
    }
}

impl From<Post> for ContentEntity {
    fn from(p: Post) -> Self {
        ContentEntity::Post(p)
    }
}

impl From<Project> for ContentEntity {
    fn from(p: Project) -> Self {
        ContentEntity::Project(p)
    }
}

impl From<Service> for ContentEntity {
    fn from(s: Service) -> Self {
        ContentEntity::Service(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_row(indexable: bool) -> serde_json::Value {
        json!({
            "id": "s1", "slug": "audit", "title": "Audit", "status": "published",
            "indexable": indexable, "tags": [], "seo_title": "Audit | Udyomx",
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-02-01T00:00:00+00:00"
        })
    }

    #[test]
    fn decodes_row_with_flattened_seo() {
        let e = ContentEntity::from_row(ContentKind::Service, service_row(true)).unwrap();
        let ContentEntity::Service(s) = &e else { panic!("wrong kind") };
        assert_eq!(s.seo.seo_title.as_deref(), Some("Audit | Udyomx"));
        assert_eq!(e.summary().path(), "/services/audit");
        assert!(e.is_indexable());
    }

    #[test]
    fn non_indexable_service_stays_out_of_sitemaps() {
        let e = ContentEntity::from_row(ContentKind::Service, service_row(false)).unwrap();
        assert!(!e.is_indexable());
    }

    #[test]
    fn project_summary_uses_name() {
        let row = json!({
            "id": "p1", "slug": "shop", "name": "Shop", "status": "draft",
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
        });
        let p: Project = serde_json::from_value(row).unwrap();
        let s = p.summary();
        assert_eq!(s.title, "Shop");
        assert_eq!(s.status, Status::Draft);
        assert!(p.tech_stack.is_empty());
    }

    #[test]
    fn tagged_serialization() {
        let e = ContentEntity::from_row(ContentKind::Service, service_row(true)).unwrap();
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["kind"], "service");
        assert_eq!(v["slug"], "audit");
    }
}
