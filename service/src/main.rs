//! Door service HTTP server.
//!
//! Ticket issuance, at-most-once check-in, and real-time door counters
//! over in-process stores.

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnstile_memstore::{MemoryCounterStore, MemoryTicketStore};
use turnstile_service::metrics::register_business_metrics;
use turnstile_service::{AppState, Config, DoorService, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting Turnstile door service"
    );

    // Metrics exporter
    let metrics_addr: SocketAddr =
        format!("{}:{}", config.server.metrics_host, config.server.metrics_port)
            .parse()
            .context("invalid metrics listen address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("failed to install Prometheus exporter")?;
    register_business_metrics();
    info!(%metrics_addr, "Metrics exporter listening");

    // In-process store backends
    let tickets = Arc::new(MemoryTicketStore::new());
    let counters = Arc::new(MemoryCounterStore::new());

    let service = Arc::new(DoorService::new(tickets, counters, &config));
    let app = build_router(AppState::new(Arc::clone(&service)));

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .context("failed to bind server address")?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Let in-flight effects settle before exiting
    if let Err(err) = service.shutdown(config.shutdown_timeout()).await {
        warn!(error = %err, "Shutdown left pending effects");
    }
    info!("Door service stopped");

    Ok(())
}

/// Resolve when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
