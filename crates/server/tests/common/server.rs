//! Server test utilities.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use cass_core::config::AppConfig;
use cass_server::{AppState, LinkFetcher, create_router};
use cass_storage::ContentStore;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

/// URL prefix test servers answer with.
pub const URL_BASE: &str = "http://files.test/c/";

/// Fetch timeouts used by test servers unless overridden.
const TEST_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

/// A buffered response.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary directories.
    pub async fn new() -> Self {
        Self::build(|_| {}, TEST_FETCH_TIMEOUT).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::build(modifier, TEST_FETCH_TIMEOUT).await
    }

    /// Create a test server whose link fetcher gives up after `timeout`.
    pub async fn with_fetch_timeout(timeout: Duration) -> Self {
        Self::build(|_| {}, timeout).await
    }

    async fn build<F>(modifier: F, fetch_timeout: Duration) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let mut config = AppConfig::default();
        config.server.url_base = URL_BASE.to_string();
        config.store.file_store = temp_dir.path().join("c");
        config.store.temp_dir = temp_dir.path().join("tmp");
        config.fetch.user_agent = "cass-tests/1.0".to_string();

        // Apply user modifications
        modifier(&mut config);

        let store = ContentStore::new(&config.store.file_store, &config.store.temp_dir)
            .await
            .expect("Failed to create content store");
        let fetcher = LinkFetcher::new(&config.fetch).with_timeouts(fetch_timeout, fetch_timeout);

        let state = AppState::new(config, store).with_fetcher(fetcher);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request through the router and buffer the response.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(body_bytes.to_vec()).unwrap(),
        }
    }

    /// Names of published objects.
    pub fn stored_files(&self) -> Vec<String> {
        list_dir(self.state.store.file_store())
    }

    /// Names of leftover temp files.
    pub fn temp_files(&self) -> Vec<String> {
        list_dir(self.state.store.temp_dir())
    }

    /// Content of a published object.
    pub fn read_stored(&self, filename: &str) -> Vec<u8> {
        std::fs::read(self.state.store.object_path(filename)).expect("stored object missing")
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
