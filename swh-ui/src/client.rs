//! HTTP client for the file-storage service
//!
//! Thin typed wrapper over reqwest. Non-success responses are mapped back
//! into the shared error taxonomy so callers can distinguish a missing
//! record (404) or a rejected submission (400) from plain connectivity
//! failures.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use swh_common::api::{
    HealthResponse, ListPatientsResponse, SavePatientRequest, SavePatientResponse,
    UpdatePatientRequest, UpdatePatientResponse,
};
use swh_common::{Error, PatientRecord, Result};

/// Client for the swh-fs HTTP surface
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
}

impl StorageClient {
    /// Create a client for a storage service base URL, e.g.
    /// `http://127.0.0.1:3001`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/health").await
    }

    /// GET /list-patients
    pub async fn list_patients(&self) -> Result<Vec<PatientRecord>> {
        let response: ListPatientsResponse = self.get_json("/list-patients").await?;
        Ok(response.patients)
    }

    /// POST /save-patient
    pub async fn save_patient(&self, request: &SavePatientRequest) -> Result<SavePatientResponse> {
        self.post_json("/save-patient", request).await
    }

    /// POST /update-patient
    pub async fn update_patient(
        &self,
        request: &UpdatePatientRequest,
    ) -> Result<UpdatePatientResponse> {
        self.post_json("/update-patient", request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("GET {} failed: {}", url, e)))?;
        Self::decode(&url, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("POST {} failed: {}", url, e)))?;
        Self::decode(&url, response).await
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| Error::Network(format!("Decoding {} response failed: {}", url, e)));
        }

        let message = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST => Error::InvalidInput(message),
            _ => Error::Network(format!("{} returned {}: {}", url, status, message)),
        })
    }
}
