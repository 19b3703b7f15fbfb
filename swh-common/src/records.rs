//! Patient record domain types
//!
//! Shared between the file-storage service (which persists these as
//! `metadata.json` inside a per-patient folder) and the dashboard service
//! (which fetches them over HTTP and layers triage edits on top).
//!
//! All JSON uses camelCase field names (`inputMethod`, `hasPhoto`,
//! `photoUrl`) to stay wire-compatible with existing record folders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Triage status of a patient in the queue.
///
/// Absent on disk until the first dashboard edit; readers default to
/// `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TriageStatus {
    #[default]
    Waiting,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// Triage priority, ordered by clinical urgency.
///
/// Absent on disk until the first dashboard edit; readers default to
/// `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TriagePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TriagePriority {
    /// Queue sort rank: Critical(0) < High(1) < Medium(2) < Low(3)
    pub fn rank(self) -> u8 {
        match self {
            TriagePriority::Critical => 0,
            TriagePriority::High => 1,
            TriagePriority::Medium => 2,
            TriagePriority::Low => 3,
        }
    }
}

/// How the patient entered their symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    Text,
    Voice,
}

impl InputMethod {
    /// Wire/transcript spelling of the variant
    pub fn as_str(self) -> &'static str {
        match self {
            InputMethod::Text => "text",
            InputMethod::Voice => "voice",
        }
    }
}

/// On-disk patient metadata, one `metadata.json` per record folder.
///
/// `status` and `priority` are written only once a triage edit has been
/// applied; a freshly created record carries neither key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientMetadata {
    pub name: String,
    pub symptoms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_method: Option<InputMethod>,
    pub timestamp: DateTime<Utc>,
    pub has_photo: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TriageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TriagePriority>,
}

/// One entry in a patient-list response: folder identity plus metadata,
/// annotated with the photo URL when the folder holds a `photo.jpg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Folder name, `sanitize(name)_timestamp`. Primary key; immutable.
    pub folder: String,
    #[serde(flatten)]
    pub metadata: PatientMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Partial triage update: only the provided fields are merged into the
/// stored metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TriageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TriagePriority>,
}

impl TriageUpdate {
    /// True when the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_metadata() -> PatientMetadata {
        PatientMetadata {
            name: "Alice Smith".to_string(),
            symptoms: "persistent cough".to_string(),
            language: Some("en".to_string()),
            input_method: Some(InputMethod::Voice),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
            has_photo: true,
            status: None,
            priority: None,
        }
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let json = serde_json::to_value(sample_metadata()).unwrap();
        assert_eq!(json["inputMethod"], "voice");
        assert_eq!(json["hasPhoto"], true);
        // status/priority keys absent until first triage edit
        assert!(json.get("status").is_none());
        assert!(json.get("priority").is_none());
    }

    #[test]
    fn metadata_tolerates_missing_status_and_priority() {
        let json = r#"{
            "name": "Bob",
            "symptoms": "fever",
            "timestamp": "2026-01-15T09:30:00Z",
            "hasPhoto": false
        }"#;
        let meta: PatientMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.status, None);
        assert_eq!(meta.priority, None);
        assert_eq!(meta.status.unwrap_or_default(), TriageStatus::Waiting);
        assert_eq!(meta.priority.unwrap_or_default(), TriagePriority::Medium);
    }

    #[test]
    fn status_uses_display_spelling() {
        let json = serde_json::to_string(&TriageStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: TriageStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, TriageStatus::InProgress);
    }

    #[test]
    fn priority_rank_orders_by_urgency() {
        assert!(TriagePriority::Critical.rank() < TriagePriority::High.rank());
        assert!(TriagePriority::High.rank() < TriagePriority::Medium.rank());
        assert!(TriagePriority::Medium.rank() < TriagePriority::Low.rank());
    }

    #[test]
    fn record_flattens_metadata() {
        let record = PatientRecord {
            folder: "alice_smith_2026-01-15T09-30-00-000Z".to_string(),
            metadata: sample_metadata(),
            photo_url: Some("/patient-photos/alice_smith_2026-01-15T09-30-00-000Z/photo.jpg".to_string()),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["folder"], "alice_smith_2026-01-15T09-30-00-000Z");
        assert_eq!(json["name"], "Alice Smith");
        assert!(json["photoUrl"].as_str().unwrap().ends_with("photo.jpg"));
    }

    #[test]
    fn triage_update_partial_fields() {
        let update: TriageUpdate = serde_json::from_str(r#"{"status": "Completed"}"#).unwrap();
        assert_eq!(update.status, Some(TriageStatus::Completed));
        assert_eq!(update.priority, None);
        assert!(!update.is_empty());
        assert!(TriageUpdate::default().is_empty());
    }
}
