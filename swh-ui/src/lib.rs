//! swh-ui library - Intake & Triage Dashboard service
//!
//! Hosts the patient intake flow and the operator dashboard as JSON state
//! endpoints for the browser front end, talking to the file-storage
//! service (swh-fs) over HTTP: intake submissions create records, the
//! dashboard polls the record list and pushes optimistic triage updates.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use uuid::Uuid;

pub mod api;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod poller;

pub use client::StorageClient;
pub use error::{ApiError, ApiResult};

use dashboard::Dashboard;
use intake::IntakeFlow;

/// Application state shared across handlers and the refresh task
#[derive(Clone)]
pub struct AppState {
    /// Client for the file-storage service
    pub client: StorageClient,
    /// Merged patient list plus operator view state
    pub dashboard: Arc<RwLock<Dashboard>>,
    /// Active intake sessions, one per kiosk/browser session
    pub intakes: Arc<RwLock<HashMap<Uuid, IntakeFlow>>>,
}

impl AppState {
    /// Create new application state
    pub fn new(client: StorageClient) -> Self {
        Self {
            client,
            dashboard: Arc::new(RwLock::new(Dashboard::default())),
            intakes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::dashboard_routes())
        .merge(api::intake_routes())
        .merge(api::health_routes())
        .with_state(state)
}
