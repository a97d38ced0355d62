//! cass server binary.

use anyhow::{Context, Result};
use cass_server::config::{ConfigOverrides, FetchOverrides, ServerOverrides, StoreOverrides};
use cass_server::{AppState, create_router};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// cass - content-addressed file drop
#[derive(Parser, Debug)]
#[command(name = "cassd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "CASS_CONFIG", default_value = "config/server.toml")]
    config: String,

    /// Address to listen on
    #[arg(long)]
    listen: Option<String>,

    /// Directory to store files in
    #[arg(long)]
    file_store: Option<PathBuf>,

    /// URL prefix of stored files
    #[arg(long)]
    url_base: Option<String>,

    /// Temporary files directory
    #[arg(long)]
    tmp_dir: Option<PathBuf>,

    /// User-Agent string for link downloads
    #[arg(long = "useragent")]
    user_agent: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server: ServerOverrides {
                listen: self.listen.clone(),
                url_base: self.url_base.clone(),
            },
            store: StoreOverrides {
                file_store: self.file_store.clone(),
                temp_dir: self.tmp_dir.clone(),
            },
            fetch: FetchOverrides {
                user_agent: self.user_agent.clone(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("cass v{}", env!("CARGO_PKG_VERSION"));

    let config = cass_server::config::load(Path::new(&args.config), &args.overrides())?;

    let store = cass_storage::from_config(&config.store)
        .await
        .context("failed to initialize content store")?;
    store
        .health_check()
        .await
        .context("content store health check failed")?;
    if !store.same_device().await? {
        tracing::warn!(
            file_store = %store.file_store().display(),
            temp_dir = %store.temp_dir().display(),
            "Temp and store directories are on different filesystems; \
             every publish will take the copy fallback"
        );
    }
    tracing::info!(
        file_store = %store.file_store().display(),
        url_base = %config.server.url_base,
        "Content store initialized"
    );

    let listen = config.server.listen.clone();
    let state = AppState::new(config, store);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind to {listen}"))?;
    tracing::info!("Listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
