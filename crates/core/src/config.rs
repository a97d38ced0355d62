//! Configuration types shared across crates.
//!
//! Loaded once at startup and shared read-only by every request.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Full application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl AppConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.listen.trim().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "server.listen must not be empty".to_string(),
            ));
        }
        if self.server.url_base.is_empty() {
            return Err(crate::Error::InvalidConfig(
                "server.url_base must not be empty".to_string(),
            ));
        }
        if self.store.file_store.as_os_str().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "store.file_store must not be empty".to_string(),
            ));
        }
        if self.store.temp_dir.as_os_str().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "store.temp_dir must not be empty".to_string(),
            ));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "fetch.user_agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:8000").
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Prefix prepended to stored filenames in responses.
    #[serde(default = "default_url_base")]
    pub url_base: String,
}

/// Content store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory published objects are renamed into.
    #[serde(default = "default_file_store")]
    pub file_store: PathBuf,
    /// Directory for in-flight uploads. Keep it on the same filesystem as
    /// `file_store` so publishing is a single atomic rename.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

/// Remote link fetching configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent sent with outbound link downloads.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Store bodies of non-2xx responses instead of failing the request.
    #[serde(default)]
    pub allow_error_status: bool,
}

fn default_listen() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_url_base() -> String {
    "https://arachnist.is-a.cat/c/".to_string()
}

fn default_file_store() -> PathBuf {
    PathBuf::from("/srv/www/arachnist.is-a.cat/c")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("./tmp")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/90.0.4430.212 Safari/537.36"
        .to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            url_base: default_url_base(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_store: default_file_store(),
            temp_dir: default_temp_dir(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            allow_error_status: false,
        }
    }
}
