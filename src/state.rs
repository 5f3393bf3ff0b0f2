//! Shared application state for all routes. Everything here is cheap to clone.

use crate::auth::IdentityProvider;
use crate::cache::{PageCache, Revalidate};
use crate::content::{Content, ContentApi, ContentCatalog};
use crate::settings::Settings;
use crate::store::ContentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    /// Rendered public pages.
    pub pages: PageCache,
    /// Where revalidation requests go. The page cache itself unless replaced.
    pub revalidator: Arc<dyn Revalidate>,
    pub identity: Arc<dyn IdentityProvider>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, identity: Arc<dyn IdentityProvider>, settings: Settings) -> Self {
        let pages = PageCache::new(settings.page_ttl);
        AppState {
            store,
            revalidator: Arc::new(pages.clone()),
            pages,
            identity,
            settings: Arc::new(settings),
        }
    }

    /// Send revalidations somewhere other than the page cache.
    pub fn with_revalidator(mut self, revalidator: Arc<dyn Revalidate>) -> Self {
        self.revalidator = revalidator;
        self
    }

    pub fn api<T: Content>(&self) -> ContentApi<T> {
        ContentApi::new(Arc::clone(&self.store))
    }

    pub fn catalog(&self) -> ContentCatalog {
        ContentCatalog::new(Arc::clone(&self.store))
    }
}
