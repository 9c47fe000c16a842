pub mod api;
pub mod cli {
    pub mod setup;
    pub mod stats;
    pub mod ui;
}
pub mod core;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::loader::CsvLoader;
use crate::core::{RecordCache, StatsEngine};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Stats { currency_code: String },
    Normalized,
    Highest { day: u32, month: u32, year: i32 },
    Import { file: PathBuf },
    Serve,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    ephemeral: bool,
) -> Result<()> {
    info!("Crypto analyzer starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let engine = build_engine(&config, ephemeral).await?;

    match command {
        AppCommand::Stats { currency_code } => {
            cli::stats::run_stats(&engine, &currency_code).await
        }
        AppCommand::Normalized => cli::stats::run_normalized(&engine).await,
        AppCommand::Highest { day, month, year } => {
            cli::stats::run_highest(&engine, day, month, year).await
        }
        AppCommand::Import { file } => cli::stats::run_import(&engine, &file).await,
        AppCommand::Serve => {
            api::serve(engine, &config.server.bind, config.server.port).await
        }
    }
}

/// Opens the record store, fills the cache and returns an engine over it.
pub async fn build_engine(config: &AppConfig, ephemeral: bool) -> Result<Arc<StatsEngine>> {
    let store = store::open_record_store(config, ephemeral)?;
    let cache = Arc::new(RecordCache::new(store));
    let loader = CsvLoader::new(config.prices_dir(), config.currencies.clone());

    let pb = cli::ui::new_spinner("Loading price records...");
    let loaded = cache.initialize(&loader).await;
    pb.finish_and_clear();
    let loaded = loaded.context("Failed to initialize price records")?;
    debug!("{loaded} records cached at startup");

    Ok(Arc::new(StatsEngine::new(
        cache,
        config.currencies.clone(),
    )))
}
