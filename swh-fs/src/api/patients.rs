//! Patient record endpoints: create, list, and triage update

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use swh_common::api::{
    ListPatientsResponse, SavePatientRequest, SavePatientResponse, UpdatePatientRequest,
    UpdatePatientResponse,
};

use crate::error::ApiResult;
use crate::AppState;

/// POST /save-patient
///
/// Creates a record folder from a completed intake. Rejects submissions
/// without a name or symptom text with 400.
pub async fn save_patient(
    State(state): State<AppState>,
    Json(req): Json<SavePatientRequest>,
) -> ApiResult<Json<SavePatientResponse>> {
    let created = state.store.create(&req).await?;
    info!("Saved patient record: {}", created.folder);

    Ok(Json(SavePatientResponse {
        success: true,
        folder: created.folder,
        path: created.path.display().to_string(),
    }))
}

/// GET /list-patients
///
/// Returns every readable record; folders with missing or corrupt
/// metadata are omitted rather than failing the listing.
pub async fn list_patients(
    State(state): State<AppState>,
) -> ApiResult<Json<ListPatientsResponse>> {
    let patients = state.store.list().await?;
    Ok(Json(ListPatientsResponse { patients }))
}

/// POST /update-patient
///
/// Merges the provided triage fields (status, priority) into an existing
/// record. Unknown folders yield 404.
pub async fn update_patient(
    State(state): State<AppState>,
    Json(req): Json<UpdatePatientRequest>,
) -> ApiResult<Json<UpdatePatientResponse>> {
    let metadata = state.store.update(&req.folder, &req.update).await?;
    info!("Updated triage fields for {}", req.folder);

    Ok(Json(UpdatePatientResponse {
        success: true,
        metadata,
    }))
}

/// Build patient record routes
pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route("/save-patient", post(save_patient))
        .route("/list-patients", get(list_patients))
        .route("/update-patient", post(update_patient))
}
