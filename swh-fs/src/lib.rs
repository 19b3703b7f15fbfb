//! swh-fs library - File Storage service
//!
//! HTTP facade over the directory-per-patient record store: create on
//! intake submission, list for the dashboard poll, partial triage update,
//! photo serving, and a health check.

use axum::Router;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod error;
pub mod store;

pub use error::{ApiError, ApiResult};
pub use store::RecordStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-patient record store rooted at `<root>/patient_records`
    pub store: RecordStore,
}

impl AppState {
    /// Create new application state
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

/// Build application router
///
/// CORS is permissive so a browser front end served from another port can
/// reach the storage endpoints directly.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::patient_routes())
        .merge(api::photo_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
