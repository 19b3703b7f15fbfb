//! Shared API request/response types
//!
//! Types used on the wire between the intake/dashboard service (swh-ui)
//! and the file-storage service (swh-fs). Field names are camelCase to
//! match the JSON the original record folders were written with.

use serde::{Deserialize, Serialize};

use crate::records::{InputMethod, PatientMetadata, PatientRecord, TriageUpdate};

/// Body of `POST /save-patient`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePatientRequest {
    /// Required; a missing key deserializes to empty and is rejected by
    /// the store's validation
    #[serde(default)]
    pub name: String,
    /// Required; same treatment as `name`
    #[serde(default)]
    pub symptoms: String,
    /// Photo as a base64 data URL (`data:image/jpeg;base64,...`) or bare
    /// base64 payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_method: Option<InputMethod>,
    /// RFC 3339 timestamp; defaults to the server clock when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Response of `POST /save-patient`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePatientResponse {
    pub success: bool,
    /// Folder name of the created record (primary key)
    pub folder: String,
    /// Absolute path of the record folder on the storage host
    pub path: String,
}

/// Response of `GET /list-patients`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPatientsResponse {
    pub patients: Vec<PatientRecord>,
}

/// Body of `POST /update-patient`: folder identity plus the triage fields
/// to merge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub folder: String,
    #[serde(flatten)]
    pub update: TriageUpdate,
}

/// Response of `POST /update-patient`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientResponse {
    pub success: bool,
    /// Metadata after the merge was applied
    pub metadata: PatientMetadata,
}

/// Response of `GET /health` on every service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
