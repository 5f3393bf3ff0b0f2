//! Rendered page cache and path revalidation.
//!
//! Public pages are rendered once and served from the cache until their time-to-live lapses or a
//! path is revalidated explicitly.

use async_trait::async_trait;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const MAX_PAGES: u64 = 10_000;

/// Something that can drop cached output for a path.
#[async_trait]
pub trait Revalidate: Send + Sync {
    async fn revalidate_path(&self, path: &str);
}

#[derive(Clone)]
pub struct PageCache {
    inner: Cache<String, Arc<String>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        PageCache {
            inner: Cache::builder().max_capacity(MAX_PAGES).time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self, path: &str) -> Option<Arc<String>> {
        self.inner.get(path).await
    }

    pub async fn insert(&self, path: &str, html: String) -> Arc<String> {
        let html = Arc::new(html);
        self.inner.insert(path.to_string(), Arc::clone(&html)).await;
        html
    }

    /// Serve `path` from cache, or render it and cache the result. Render errors are not cached.
    pub async fn get_or_render<E, F, Fut>(&self, path: &str, render: F) -> Result<Arc<String>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(hit) = self.get(path).await {
            tracing::trace!(path, "page cache hit");
            return Ok(hit);
        }
        let html = render().await?;
        Ok(self.insert(path, html).await)
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.inner.contains_key(path)
    }

    /// Approximate; moka applies pending writes lazily.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[async_trait]
impl Revalidate for PageCache {
    async fn revalidate_path(&self, path: &str) {
        self.inner.invalidate(path).await;
        tracing::info!(path, "page revalidated");
    }
}

/// Paths to invalidate for a revalidation request: `path` itself, then the listing for
/// `kind` and the homepage when the kind is recognised. Duplicates are dropped, order kept.
pub fn revalidation_targets(path: &str, kind: Option<&str>) -> Vec<String> {
    let listing = match kind {
        Some("post") | Some("blog") => Some("/blog"),
        Some("project") => Some("/projects"),
        Some("service") => Some("/services"),
        _ => None,
    };
    let mut targets = vec![path.to_string()];
    if let Some(listing) = listing {
        for extra in [listing, "/"] {
            if !targets.iter().any(|t| t == extra) {
                targets.push(extra.to_string());
            }
        }
    }
    targets
}

/// Invalidate every target for a request in order.
pub async fn revalidate_all(revalidator: &dyn Revalidate, targets: &[String]) {
    for path in targets {
        revalidator.revalidate_path(path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_for_each_kind() {
        assert_eq!(revalidation_targets("/blog/foo", Some("post")), ["/blog/foo", "/blog", "/"]);
        assert_eq!(revalidation_targets("/blog/foo", Some("blog")), ["/blog/foo", "/blog", "/"]);
        assert_eq!(revalidation_targets("/projects/x", Some("project")), ["/projects/x", "/projects", "/"]);
        assert_eq!(revalidation_targets("/services/x", Some("service")), ["/services/x", "/services", "/"]);
    }

    #[test]
    fn unknown_kind_only_invalidates_path() {
        assert_eq!(revalidation_targets("/about", Some("page")), ["/about"]);
        assert_eq!(revalidation_targets("/about", None), ["/about"]);
    }

    #[test]
    fn targets_are_deduplicated() {
        assert_eq!(revalidation_targets("/blog", Some("post")), ["/blog", "/"]);
        assert_eq!(revalidation_targets("/", Some("service")), ["/", "/services"]);
    }

    #[tokio::test]
    async fn revalidate_drops_cached_page() {
        let cache = PageCache::new(Duration::from_secs(60));
        cache.insert("/blog", "<html>old</html>".into()).await;
        assert!(cache.contains("/blog").await);
        cache.revalidate_path("/blog").await;
        assert!(cache.get("/blog").await.is_none());
    }

    #[tokio::test]
    async fn render_errors_are_not_cached() {
        let cache = PageCache::new(Duration::from_secs(60));
        let r: Result<_, &str> = cache.get_or_render("/x", || async { Err("boom") }).await;
        assert!(r.is_err());
        let page = cache
            .get_or_render::<&str, _, _>("/x", || async { Ok("ok".to_string()) })
            .await
            .unwrap();
        assert_eq!(page.as_str(), "ok");
        let again = cache
            .get_or_render::<&str, _, _>("/x", || async { Ok("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(again.as_str(), "ok");
    }
}
