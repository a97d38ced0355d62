//! Configuration loading.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file,
//! `CASS_`-prefixed environment variables (`__` separates sections, e.g.
//! `CASS_STORE__FILE_STORE`), then command-line overrides.

use anyhow::{Context, Result};
use cass_core::config::AppConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration keys.
pub const ENV_PREFIX: &str = "CASS_";

/// Values given on the command line. Unset fields leave the lower layers alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConfigOverrides {
    pub server: ServerOverrides,
    pub store: StoreOverrides,
    pub fetch: FetchOverrides,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ServerOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_base: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct StoreOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_store: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct FetchOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Load and validate configuration. A missing file at `config_path` is not an error.
pub fn load(config_path: &Path, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if config_path.exists() {
        tracing::info!(config_path = %config_path.display(), "Loading configuration from file");
        figment = figment.merge(Toml::file(config_path));
    } else {
        tracing::debug!("No config file found at {}", config_path.display());
    }

    let config: AppConfig = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Serialized::defaults(overrides))
        .extract()
        .context("failed to load configuration")?;

    config.validate().context("invalid configuration")?;
    Ok(config)
}
