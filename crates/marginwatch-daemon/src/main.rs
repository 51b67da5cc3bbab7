//! `marginwatch` — run the margin monitor until Ctrl-C.
//!
//! Usage: `marginwatch [config.toml]`. Without an argument the path is taken
//! from `MARGINWATCH_CONFIG`; without either, defaults apply. `MARGINWATCH_*`
//! variables override the file.

use std::sync::Arc;

use anyhow::{Context, Result};

use marginwatch_alerts::AlertEngine;
use marginwatch_core::config::MarginWatchConfig;
use marginwatch_core::constants::{ENV_PREFIX, SERVICE_NAME, VERSION};
use marginwatch_core::traits::SystemClock;
use marginwatch_gateway::{HttpAnalysisClient, HttpFeedClient};

fn load_config() -> Result<MarginWatchConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(format!("{ENV_PREFIX}CONFIG")).ok());

    let mut config = match &path {
        Some(path) => MarginWatchConfig::from_file(path).with_context(|| format!("loading {path}"))?,
        None => MarginWatchConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("applying environment overrides")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    marginwatch_observability::init_tracing(&config.observability);

    tracing::info!(
        service = SERVICE_NAME,
        version = VERSION,
        trigger = config.monitor.trigger_threshold,
        resolve = config.monitor.resolve_threshold,
        interval_secs = config.monitor.interval_secs,
        "starting"
    );
    if config.feed.credentials.is_none() {
        tracing::warn!("feed credentials not set; every fetch will fail until {ENV_PREFIX}FEED_* is configured");
    }

    let feed = Arc::new(HttpFeedClient::new(config.feed.clone()).context("building feed client")?);
    let analysis =
        Arc::new(HttpAnalysisClient::new(config.analysis.clone()).context("building analysis client")?);
    let engine = AlertEngine::new(config, feed, analysis, Arc::new(SystemClock)).context("building engine")?;

    engine.start_monitoring().await;

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    tracing::info!("shutdown requested");

    let reports = engine.shutdown().await;
    let status = engine.monitoring_status().await;
    tracing::info!(
        dispatches_joined = reports.len(),
        cards = ?status.card_counts_by_status,
        "stopped"
    );
    Ok(())
}
