//! SETARB — marketplace set-arbitrage scanner
//!
//! Entry point. Loads configuration, initialises structured logging, starts
//! the background scan loop and the query API, and shuts both down cleanly
//! on Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};

use setarb::api;
use setarb::api::routes::ApiState;
use setarb::config::AppConfig;
use setarb::engine::evaluator::{ArbitrageEvaluator, EvaluatorConfig};
use setarb::engine::scheduler::ScanScheduler;
use setarb::engine::shutdown;
use setarb::engine::store::SnapshotStore;
use setarb::market::fetch::FetchClient;
use setarb::market::warframe::WarframeMarket;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("SETARB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        upstream = %cfg.fetch.base_url,
        min_arbitrage = cfg.scan.min_arbitrage_value,
        rescan_interval_secs = cfg.scan.rescan_interval_secs,
        "SETARB starting up"
    );

    // -- Initialise components -------------------------------------------

    let client = FetchClient::new(cfg.fetch.clone())?;
    let market = Arc::new(WarframeMarket::new(client));
    let store = Arc::new(SnapshotStore::new());
    let evaluator = ArbitrageEvaluator::new(EvaluatorConfig::from(&cfg.scan));
    let scheduler = ScanScheduler::new(market, evaluator, store.clone(), &cfg.scan);
    let api_state = Arc::new(ApiState::new(store, scheduler.status()));

    let (trigger, shutdown) = shutdown::channel();

    // -- Background scan loop --------------------------------------------

    let scan_task = tokio::spawn(scheduler.run(shutdown.clone()));

    // -- Query API -------------------------------------------------------

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind query API on {addr}"))?;
    let api_task = tokio::spawn(api::serve(listener, api_state, shutdown));

    info!("Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received.");
    trigger.trigger();

    if let Err(e) = scan_task.await {
        error!(error = %e, "Scan task ended abnormally");
    }
    match api_task.await {
        Ok(Err(e)) => error!(error = %e, "Query API ended with error"),
        Err(e) => error!(error = %e, "Query API task ended abnormally"),
        Ok(Ok(())) => {}
    }

    info!("SETARB shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("setarb=info"));

    if std::env::var("SETARB_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
