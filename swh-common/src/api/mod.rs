//! Shared API types for the SwiftHealth HTTP surfaces

pub mod types;

pub use types::{
    HealthResponse, ListPatientsResponse, SavePatientRequest, SavePatientResponse,
    UpdatePatientRequest, UpdatePatientResponse,
};
