//! access-map - crowd-sourced wheelchair accessibility map backend
//!
//! Grades building entrances, collects field reports and serves the map
//! client over HTTP.
//!
//! Module structure:
//! - `domain/` - Core types (Place, Report, Grade, request forms)
//! - `io/` - External interfaces (HTTP API, journal, Prometheus)
//! - `services/` - Business logic (grading, markers, store, gamification)
//! - `infra/` - Infrastructure (Config, Metrics)

use access_map::infra::{Config, Metrics};
use access_map::io::{read_entries, start_api_server, AppState, Journal};
use access_map::services::{PlaceStore, SystemClock};
use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Accessibility map backend
#[derive(Parser, Debug)]
#[command(name = "access-map", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then config/dev.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default: INFO, use RUST_LOG=debug for per-request lines
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = %env!("GIT_HASH"), "access-map starting");

    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(Config::config_path_from_env);
    let config = Config::load_from_path(&config_path);

    info!(
        config_file = %config.config_file(),
        site = %config.site_id(),
        bind_address = %config.bind_address(),
        port = %config.port(),
        max_body_bytes = %config.max_body_bytes(),
        journal_enabled = %config.journal_enabled(),
        journal_file = %config.journal_file(),
        report_list_limit = %config.report_list_limit(),
        "config_loaded"
    );

    // Rebuild the store from the journal before accepting requests
    let store = if config.journal_enabled() {
        let entries = read_entries(config.journal_file())?;
        PlaceStore::restore(entries, Some(Journal::new(config.journal_file())))
    } else {
        PlaceStore::new(None)
    };

    let store = Arc::new(store);
    let metrics = Arc::new(Metrics::new());
    let state =
        Arc::new(AppState::new(&config, store.clone(), metrics.clone(), Arc::new(SystemClock)));

    let addr: SocketAddr = format!("{}:{}", config.bind_address(), config.port())
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", config.bind_address(), config.port())
        })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start metrics reporter
    let metrics_interval = config.metrics_interval_secs().max(1);
    let reporter_store = store.clone();
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            let summary =
                reporter_metrics.report(reporter_store.place_count(), reporter_store.report_count());
            summary.log();
        }
    });

    // Handle shutdown on Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = start_api_server(addr, state, shutdown_rx).await {
        tracing::error!(error = %e, "API server error");
        return Err(anyhow::anyhow!(e));
    }

    info!("access-map shutdown complete");
    Ok(())
}
