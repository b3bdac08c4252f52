//! teraslice-exporter — serves Teraslice cluster metrics for Prometheus.
//!
//! # Usage
//!
//! ```text
//! TERASLICE_URL=http://teraslice-master:5678 teraslice-exporter --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::sync::{RwLock, watch};
use tracing::{error, info};

use teraslice_exporter::{ExporterConfig, METRICS_PATH, Poller, build_router};
use teraslice_metrics::TerasliceMetrics;
use teraslice_stats::TerasliceStats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ExporterConfig::parse();

    let default_filter = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    run(config).await
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    info!(url = %config.teraslice_url, "teraslice exporter starting");

    let stats = TerasliceStats::with_config(
        config.teraslice_url.clone(),
        config.display_url.clone(),
        config.collector_config(),
    )?;
    let metrics = Arc::new(RwLock::new(TerasliceMetrics::new()));

    // ── Poll loop ──────────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(stats, metrics.clone(), config.query_interval());
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    // ── HTTP server ────────────────────────────────────────────

    let router = build_router(metrics);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, metrics_path = METRICS_PATH, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = poller_handle.await;

    info!("teraslice exporter stopped");
    Ok(())
}
