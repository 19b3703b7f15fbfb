//! Intake session endpoints
//!
//! One `IntakeFlow` per session id; the browser walks it forward step by
//! step. The photo step fires the storage submission from a spawned task
//! so navigation never blocks on the network; the flow state carries a
//! transient `saving` flag and, eventually, the saved folder or an error.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use swh_common::InputMethod;

use crate::error::{ApiError, ApiResult};
use crate::intake::IntakeFlow;
use crate::AppState;

/// POST /api/intake response: the new session id plus the initial flow
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub flow: IntakeFlow,
}

#[derive(Debug, Deserialize)]
pub struct NameBody {
    pub name: String,
    /// True when `name` is a voice transcript that should go through the
    /// extraction heuristics
    #[serde(default)]
    pub voice: bool,
}

#[derive(Debug, Deserialize)]
pub struct MethodBody {
    pub method: InputMethod,
}

#[derive(Debug, Deserialize)]
pub struct SymptomsBody {
    pub symptoms: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoBody {
    pub photo: String,
}

/// POST /api/intake
pub async fn start_intake(State(state): State<AppState>) -> Json<IntakeSessionResponse> {
    let session_id = Uuid::new_v4();
    let flow = IntakeFlow::default();
    state.intakes.write().await.insert(session_id, flow.clone());
    info!("Started intake session {}", session_id);
    Json(IntakeSessionResponse { session_id, flow })
}

/// GET /api/intake/:id
pub async fn get_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IntakeFlow>> {
    let sessions = state.intakes.read().await;
    let flow = sessions
        .get(&id)
        .ok_or_else(|| unknown_session(id))?
        .clone();
    Ok(Json(flow))
}

/// POST /api/intake/:id/name
pub async fn submit_name(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NameBody>,
) -> ApiResult<Json<IntakeFlow>> {
    with_flow(&state, id, |flow| flow.submit_name(&body.name, body.voice)).await
}

/// POST /api/intake/:id/method
pub async fn choose_method(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MethodBody>,
) -> ApiResult<Json<IntakeFlow>> {
    with_flow(&state, id, |flow| flow.choose_method(body.method)).await
}

/// POST /api/intake/:id/symptoms
pub async fn submit_symptoms(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SymptomsBody>,
) -> ApiResult<Json<IntakeFlow>> {
    with_flow(&state, id, |flow| {
        flow.submit_symptoms(&body.symptoms, body.language.clone())
    })
    .await
}

/// POST /api/intake/:id/photo
///
/// Attaches the photo and fires the storage submission without blocking
/// the response; the returned flow still has `saving: true`.
pub async fn capture_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PhotoBody>,
) -> ApiResult<Json<IntakeFlow>> {
    let (request, snapshot) = {
        let mut sessions = state.intakes.write().await;
        let flow = sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;
        let request = flow.capture_photo(body.photo)?;
        (request, flow.clone())
    };

    let client = state.client.clone();
    let intakes = state.intakes.clone();
    tokio::spawn(async move {
        let result = client.save_patient(&request).await;
        let mut sessions = intakes.write().await;
        if let Some(flow) = sessions.get_mut(&id) {
            match result {
                Ok(response) => {
                    info!("Patient record saved: {}", response.folder);
                    flow.mark_saved(response.folder);
                }
                Err(e) => {
                    error!("Failed to save patient record: {}", e);
                    flow.mark_save_failed(e.to_string());
                }
            }
        }
    });

    Ok(Json(snapshot))
}

/// POST /api/intake/:id/back
pub async fn go_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IntakeFlow>> {
    with_flow(&state, id, |flow| {
        flow.back();
        Ok(())
    })
    .await
}

/// POST /api/intake/:id/reset
pub async fn reset_intake(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<IntakeFlow>> {
    with_flow(&state, id, |flow| {
        flow.reset();
        Ok(())
    })
    .await
}

async fn with_flow<F>(state: &AppState, id: Uuid, apply: F) -> ApiResult<Json<IntakeFlow>>
where
    F: FnOnce(&mut IntakeFlow) -> swh_common::Result<()>,
{
    let mut sessions = state.intakes.write().await;
    let flow = sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;
    apply(flow)?;
    Ok(Json(flow.clone()))
}

fn unknown_session(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Unknown intake session: {}", id))
}

/// Build intake routes
pub fn intake_routes() -> Router<AppState> {
    Router::new()
        .route("/api/intake", post(start_intake))
        .route("/api/intake/:id", get(get_intake))
        .route("/api/intake/:id/name", post(submit_name))
        .route("/api/intake/:id/method", post(choose_method))
        .route("/api/intake/:id/symptoms", post(submit_symptoms))
        .route("/api/intake/:id/photo", post(capture_photo))
        .route("/api/intake/:id/back", post(go_back))
        .route("/api/intake/:id/reset", post(reset_intake))
}
