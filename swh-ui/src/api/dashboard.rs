//! Dashboard endpoints: merged patient views, queue, view state, and
//! optimistic triage edits
//!
//! Edits update the in-memory list immediately and push the storage write
//! from a spawned task; the response never waits on the round-trip. The
//! per-field edit ledger in the returned views tells the front end whether
//! a write is pending, committed, or failed.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use swh_common::api::UpdatePatientRequest;
use swh_common::{TriagePriority, TriageStatus, TriageUpdate};

use crate::dashboard::{PatientView, Tab};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/patients response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientsResponse {
    pub patients: Vec<PatientView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    pub active_tab: Tab,
    pub search: String,
}

/// GET /api/queue response
#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub patients: Vec<PatientView>,
}

/// GET/POST /api/view response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    pub active_tab: Tab,
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_patient: Option<PatientView>,
}

/// POST /api/view body; absent fields stay unchanged. An empty `selected`
/// string clears the selection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewUpdate {
    pub active_tab: Option<Tab>,
    pub search: Option<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: TriageStatus,
}

#[derive(Debug, Deserialize)]
pub struct PriorityBody {
    pub priority: TriagePriority,
}

/// GET /api/patients
///
/// Merged patient list with the current search filter applied.
pub async fn get_patients(State(state): State<AppState>) -> Json<PatientsResponse> {
    let dashboard = state.dashboard.read().await;
    Json(PatientsResponse {
        patients: dashboard.filtered(),
        selected: dashboard.selected.clone(),
        active_tab: dashboard.active_tab,
        search: dashboard.search.clone(),
    })
}

/// GET /api/queue
///
/// Non-Completed records, most urgent first.
pub async fn get_queue(State(state): State<AppState>) -> Json<QueueResponse> {
    let dashboard = state.dashboard.read().await;
    Json(QueueResponse {
        patients: dashboard.queue(),
    })
}

/// GET /api/view
pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let dashboard = state.dashboard.read().await;
    Json(view_response(&dashboard))
}

/// POST /api/view
pub async fn update_view(
    State(state): State<AppState>,
    Json(body): Json<ViewUpdate>,
) -> ApiResult<Json<ViewResponse>> {
    let mut dashboard = state.dashboard.write().await;
    if let Some(tab) = body.active_tab {
        dashboard.active_tab = tab;
    }
    if let Some(search) = body.search {
        dashboard.search = search;
    }
    if let Some(selected) = body.selected {
        if selected.is_empty() {
            dashboard.selected = None;
        } else {
            dashboard.select(&selected)?;
        }
    }
    Ok(Json(view_response(&dashboard)))
}

/// POST /api/patients/:folder/status
pub async fn set_status(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Json<PatientView>> {
    let view = state.dashboard.write().await.set_status(&folder, body.status)?;
    push_update(
        &state,
        folder,
        TriageUpdate {
            status: Some(body.status),
            priority: None,
        },
    );
    Ok(Json(view))
}

/// POST /api/patients/:folder/priority
pub async fn set_priority(
    State(state): State<AppState>,
    Path(folder): Path<String>,
    Json(body): Json<PriorityBody>,
) -> ApiResult<Json<PatientView>> {
    let view = state
        .dashboard
        .write()
        .await
        .set_priority(&folder, body.priority)?;
    push_update(
        &state,
        folder,
        TriageUpdate {
            status: None,
            priority: Some(body.priority),
        },
    );
    Ok(Json(view))
}

/// Push a triage update to storage without blocking the edit response.
/// The outcome lands in the edit ledger; a failure keeps the optimistic
/// value on screen.
fn push_update(state: &AppState, folder: String, update: TriageUpdate) {
    let client = state.client.clone();
    let dashboard = state.dashboard.clone();
    tokio::spawn(async move {
        let request = UpdatePatientRequest {
            folder: folder.clone(),
            update,
        };
        let ok = match client.update_patient(&request).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to persist triage update for {}: {}", folder, e);
                false
            }
        };
        let mut dashboard = dashboard.write().await;
        if update.status.is_some() {
            dashboard.resolve_status(&folder, ok);
        }
        if update.priority.is_some() {
            dashboard.resolve_priority(&folder, ok);
        }
    });
}

fn view_response(dashboard: &crate::dashboard::Dashboard) -> ViewResponse {
    ViewResponse {
        selected: dashboard.selected.clone(),
        active_tab: dashboard.active_tab,
        search: dashboard.search.clone(),
        selected_patient: dashboard.selected_patient().cloned(),
    }
}

/// Build dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/patients", get(get_patients))
        .route("/api/queue", get(get_queue))
        .route("/api/view", get(get_view).post(update_view))
        .route("/api/patients/:folder/status", post(set_status))
        .route("/api/patients/:folder/priority", post(set_priority))
}
