mod commands;
mod config;

use anyhow::Context;
use clap::Parser;
use md_app_core::{AppContext, NoopScrollLock};
use md_catalog_client::ApiKeyResolver;
use md_catalog_tmdb::TmdbCatalog;
use md_storage::{InMemoryStore, RocksDbStore, ScopedStorage};
use std::sync::Arc;
use tracing::debug;

use crate::commands::{Cli, run};
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    debug!(?config, "loaded configuration");

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let durable = RocksDbStore::open_default(&config.data_dir)?;
    // a CLI run is the closest thing to a browsing session
    let storage = ScopedStorage::new(Arc::new(durable), Arc::new(InMemoryStore::new()));

    let keys = ApiKeyResolver::new(storage.clone(), config.fallback_api_key.clone());
    let catalog = TmdbCatalog::new(config.api_url.clone(), config.language.clone(), keys);
    let mut app = AppContext::new(storage, catalog, Box::new(NoopScrollLock))?;

    let mut stdout = std::io::stdout().lock();
    run(cli.command, &mut app, &mut stdout).await
}
