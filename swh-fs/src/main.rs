//! swh-fs (File Storage) - Per-patient record persistence service
//!
//! Persists each completed intake as a record folder (transcript,
//! metadata, optional photo) and exposes the create/list/update HTTP
//! surface the intake and dashboard services talk to.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use swh_fs::{build_router, AppState, RecordStore};

/// Command-line arguments for swh-fs
#[derive(Parser, Debug)]
#[command(name = "swh-fs")]
#[command(about = "File storage service for SwiftHealth patient records")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001", env = "SWH_FS_PORT")]
    port: u16,

    /// Root folder holding the patient_records directory
    #[arg(short, long, env = "SWH_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
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
        "Starting SwiftHealth File Storage (swh-fs) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let root_folder = swh_common::config::resolve_root_folder(args.root_folder.as_deref());
    let records_dir = swh_common::config::ensure_records_dir(&root_folder)
        .context("Failed to initialize records directory")?;
    info!("Saving patient records to {}", records_dir.display());

    let state = AppState::new(RecordStore::new(records_dir));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("swh-fs listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
