//! swh-ui (Intake & Triage Dashboard) - Operator-facing service
//!
//! Hosts the intake flow and dashboard state for the browser front end
//! and keeps the patient list fresh by polling the file-storage service.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use swh_ui::poller::spawn_refresh_task;
use swh_ui::{build_router, AppState, StorageClient};

/// Command-line arguments for swh-ui
#[derive(Parser, Debug)]
#[command(name = "swh-ui")]
#[command(about = "Intake and triage dashboard service for SwiftHealth")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SWH_UI_PORT")]
    port: u16,

    /// Base URL of the file-storage service
    #[arg(
        short,
        long,
        default_value = "http://127.0.0.1:3001",
        env = "SWH_STORAGE_URL"
    )]
    storage_url: String,

    /// Seconds between patient-list refreshes
    #[arg(long, default_value = "10", env = "SWH_POLL_INTERVAL_SECS")]
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting SwiftHealth Triage Dashboard (swh-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let client = StorageClient::new(args.storage_url);
    match client.health().await {
        Ok(health) => info!(
            "Connected to {} v{} at {}",
            health.service,
            health.version,
            client.base_url()
        ),
        // Not fatal: the refresh task keeps retrying and the dashboard
        // serves its last snapshot in the meantime
        Err(e) => warn!(
            "File storage at {} not reachable yet: {}",
            client.base_url(),
            e
        ),
    }

    let state = AppState::new(client);
    spawn_refresh_task(state.clone(), Duration::from_secs(args.poll_interval_secs));

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("swh-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
