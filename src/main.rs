// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::application::chart_service::ChartService;
use crate::application::dashboard_service::DashboardService;
use crate::application::live_feed::{LiveFeed, POLL_INTERVAL};
use crate::infrastructure::config::{load_dashboard_config, load_store_config};
use crate::infrastructure::rest_store::RestStore;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{charts, dashboard, health_check, stream_live};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let store_config = load_store_config()?;
    let dashboard_config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(RestStore::new(store_config.store));

    // Start the live feed and create services (application layer)
    let live_feed = LiveFeed::start(repository.clone(), POLL_INTERVAL);
    let dashboard_service =
        DashboardService::new(&dashboard_config.tiles, &dashboard_config.alarms);
    let chart_service = ChartService::new(repository.clone(), &dashboard_config.charts);

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        chart_service,
        live: live_feed.state(),
    });

    // Build router (presentation layer)
    // Note: We compress manually in our response builders, so we don't use
    // CompressionLayer to avoid double compression
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/", get(dashboard))
        .route("/charts", get(charts))
        .route("/live", get(stream_live))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting digester-telemetry service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the push subscription and cancel the poll timer before
    // exiting.
    live_feed.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
