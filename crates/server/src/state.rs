//! Application state shared across handlers.

use crate::fetch::LinkFetcher;
use cass_core::config::AppConfig;
use cass_storage::ContentStore;
use std::sync::Arc;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<ContentStore>,
    pub fetcher: Arc<LinkFetcher>,
}

impl AppState {
    /// Create application state; the link fetcher is built from `config.fetch`.
    pub fn new(config: AppConfig, store: ContentStore) -> Self {
        let fetcher = LinkFetcher::new(&config.fetch);
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Replace the link fetcher.
    pub fn with_fetcher(mut self, fetcher: LinkFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Public URL of a stored object.
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}{}", self.config.server.url_base, filename)
    }
}
