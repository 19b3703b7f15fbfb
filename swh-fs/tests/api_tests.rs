//! Integration tests for the swh-fs HTTP surface
//!
//! Drives the real router (with a temp records directory) through
//! tower's oneshot, asserting on the JSON bodies and status codes the
//! intake and dashboard services depend on.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use swh_fs::{build_router, AppState, RecordStore};

/// Test helper: router over a fresh temp records directory
fn setup_app(tmp: &TempDir) -> Router {
    let state = AppState::new(RecordStore::new(tmp.path()));
    build_router(state)
}

/// Test helper: GET request
fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: POST request with a JSON body
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn intake_body() -> Value {
    json!({
        "name": "Alice Smith",
        "symptoms": "persistent cough",
        "language": "en",
        "inputMethod": "voice",
        "timestamp": "2026-01-15T09:30:45.000Z",
    })
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "file-storage");
    assert!(body["version"].is_string());
}

// =============================================================================
// save-patient
// =============================================================================

#[tokio::test]
async fn test_save_patient_creates_record() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let response = app
        .oneshot(post_json("/save-patient", intake_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["folder"], "alice_smith_2026-01-15T09-30-45-000Z");
    assert!(body["path"].as_str().unwrap().contains("alice_smith"));
}

#[tokio::test]
async fn test_save_patient_missing_fields_is_400() {
    let tmp = TempDir::new().unwrap();

    for body in [json!({"symptoms": "fever"}), json!({"name": "Bob"})] {
        let app = setup_app(&tmp);
        let response = app.oneshot(post_json("/save-patient", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_save_patient_invalid_timestamp_is_400() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let mut body = intake_body();
    body["timestamp"] = json!("yesterday-ish");

    let response = app.oneshot(post_json("/save-patient", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// list-patients
// =============================================================================

#[tokio::test]
async fn test_list_patients_round_trip() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let save = app
        .clone()
        .oneshot(post_json("/save-patient", intake_body()))
        .await
        .unwrap();
    assert_eq!(save.status(), StatusCode::OK);

    let response = app.oneshot(get("/list-patients")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let patients = body["patients"].as_array().unwrap();
    assert_eq!(patients.len(), 1);

    let patient = &patients[0];
    assert_eq!(patient["folder"], "alice_smith_2026-01-15T09-30-45-000Z");
    assert_eq!(patient["name"], "Alice Smith");
    assert_eq!(patient["symptoms"], "persistent cough");
    assert_eq!(patient["inputMethod"], "voice");
    assert_eq!(patient["hasPhoto"], false);
    // Listing fills the documented defaults
    assert_eq!(patient["status"], "Waiting");
    assert_eq!(patient["priority"], "Medium");
    assert!(patient.get("photoUrl").is_none());
}

#[tokio::test]
async fn test_list_patients_empty_store() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let response = app.oneshot(get("/list-patients")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["patients"].as_array().unwrap().len(), 0);
}

// =============================================================================
// update-patient
// =============================================================================

#[tokio::test]
async fn test_update_patient_then_list_shows_new_status() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let save = app
        .clone()
        .oneshot(post_json("/save-patient", intake_body()))
        .await
        .unwrap();
    let folder = extract_json(save.into_body()).await["folder"]
        .as_str()
        .unwrap()
        .to_string();

    let update = app
        .clone()
        .oneshot(post_json(
            "/update-patient",
            json!({"folder": folder, "status": "Completed"}),
        ))
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::OK);

    let body = extract_json(update.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["metadata"]["status"], "Completed");

    let list = app.oneshot(get("/list-patients")).await.unwrap();
    let body = extract_json(list.into_body()).await;
    let patient = &body["patients"][0];
    assert_eq!(patient["status"], "Completed");
    // Priority was never edited; still the default
    assert_eq!(patient["priority"], "Medium");
}

#[tokio::test]
async fn test_update_patient_unknown_folder_is_404() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let response = app
        .oneshot(post_json(
            "/update-patient",
            json!({"folder": "ghost_2026-01-15T09-30-45-000Z", "status": "Completed"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Photo route
// =============================================================================

#[tokio::test]
async fn test_photo_route_serves_saved_photo() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let photo_bytes = b"jpeg bytes stand-in";
    let mut body = intake_body();
    body["photo"] = json!(format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(photo_bytes)
    ));

    let save = app
        .clone()
        .oneshot(post_json("/save-patient", body))
        .await
        .unwrap();
    let folder = extract_json(save.into_body()).await["folder"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(get(&format!("/patient-photos/{}/photo.jpg", folder)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "image/jpeg"
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], photo_bytes);
}

#[tokio::test]
async fn test_photo_route_unknown_folder_is_404() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    let response = app
        .oneshot(get("/patient-photos/no_such_folder/photo.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_route_rejects_traversal_component() {
    let tmp = TempDir::new().unwrap();
    let app = setup_app(&tmp);

    // An encoded traversal component must never reach the filesystem
    let response = app
        .oneshot(get("/patient-photos/%2e%2e%2fsecrets/photo.jpg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
