//! Triage dashboard state
//!
//! Holds the merged patient list plus the operator's view state (active
//! tab, search text, selection). Server snapshots arrive via the poller
//! and are merged so that locally edited triage fields are never clobbered
//! by a round-trip; triage edits are optimistic, tracked per field in an
//! explicit ledger instead of being silently dropped on failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use swh_common::{Error, InputMethod, PatientRecord, Result, TriagePriority, TriageStatus};

/// Outcome of an optimistic triage edit, per field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    /// No edit in flight; value matches the last server snapshot
    #[default]
    Committed,
    /// Edit applied locally, storage write still in flight
    Pending,
    /// Storage write failed; the local value is kept and the failure
    /// surfaced
    Failed,
}

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Patients,
    Queue,
}

/// One patient as shown on the dashboard: the fetched record plus the
/// locally authoritative triage fields and their edit ledger
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    pub folder: String,
    pub name: String,
    pub symptoms: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_method: Option<InputMethod>,
    pub timestamp: DateTime<Utc>,
    pub has_photo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub status: TriageStatus,
    pub priority: TriagePriority,
    pub status_edit: EditState,
    pub priority_edit: EditState,
}

impl PatientView {
    /// Build a view from a fetched record. A record arriving without a
    /// priority gets one from the symptom keyword heuristic; a missing
    /// status defaults to Waiting.
    pub fn from_record(record: PatientRecord) -> Self {
        let PatientRecord {
            folder,
            metadata,
            photo_url,
        } = record;
        let priority = metadata
            .priority
            .unwrap_or_else(|| detect_priority(&metadata.symptoms));
        let status = metadata.status.unwrap_or_default();
        Self {
            folder,
            name: metadata.name,
            symptoms: metadata.symptoms,
            language: metadata.language,
            input_method: metadata.input_method,
            timestamp: metadata.timestamp,
            has_photo: metadata.has_photo,
            photo_url,
            status,
            priority,
            status_edit: EditState::Committed,
            priority_edit: EditState::Committed,
        }
    }
}

/// Dashboard state: merged patient list plus ephemeral view state
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub patients: Vec<PatientView>,
    /// Folder of the currently selected record
    pub selected: Option<String>,
    pub active_tab: Tab,
    pub search: String,
}

impl Dashboard {
    /// Merge a freshly fetched snapshot into the current list.
    ///
    /// For every fetched record that matches a current entry by folder,
    /// the current entry's status/priority (and edit ledger) are kept,
    /// since they are locally authoritative while an optimistic edit may
    /// be in flight; every other field is taken from the fetch. Unmatched
    /// records are inserted as fetched; records no longer on the server
    /// drop out. The result preserves fetch order, and merging the same
    /// snapshot twice is a no-op.
    pub fn merge(&mut self, fetched: Vec<PatientRecord>) {
        let existing: HashMap<String, PatientView> = self
            .patients
            .drain(..)
            .map(|p| (p.folder.clone(), p))
            .collect();

        self.patients = fetched
            .into_iter()
            .map(|record| {
                let mut view = PatientView::from_record(record);
                if let Some(prev) = existing.get(&view.folder) {
                    view.status = prev.status;
                    view.priority = prev.priority;
                    view.status_edit = prev.status_edit;
                    view.priority_edit = prev.priority_edit;
                }
                view
            })
            .collect();

        if let Some(selected) = &self.selected {
            if !self.patients.iter().any(|p| &p.folder == selected) {
                self.selected = None;
            }
        }
    }

    /// Queue view: everything not yet Completed, most urgent first.
    /// The sort is stable, so equal priorities keep arrival order.
    pub fn queue(&self) -> Vec<PatientView> {
        let mut queue: Vec<PatientView> = self
            .patients
            .iter()
            .filter(|p| p.status != TriageStatus::Completed)
            .cloned()
            .collect();
        queue.sort_by_key(|p| p.priority.rank());
        queue
    }

    /// Patient list filtered by the current search text (case-insensitive
    /// over name and symptoms)
    pub fn filtered(&self) -> Vec<PatientView> {
        if self.search.trim().is_empty() {
            return self.patients.clone();
        }
        let needle = self.search.to_lowercase();
        self.patients
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.symptoms.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Select a record for the detail view
    pub fn select(&mut self, folder: &str) -> Result<()> {
        if self.patients.iter().any(|p| p.folder == folder) {
            self.selected = Some(folder.to_string());
            Ok(())
        } else {
            Err(Error::NotFound(format!("Unknown patient record: {}", folder)))
        }
    }

    /// Currently selected record, if any
    pub fn selected_patient(&self) -> Option<&PatientView> {
        let selected = self.selected.as_deref()?;
        self.patients.iter().find(|p| p.folder == selected)
    }

    /// Apply an optimistic status edit; the field goes Pending until
    /// [`resolve_status`](Self::resolve_status) reports the write outcome
    pub fn set_status(&mut self, folder: &str, status: TriageStatus) -> Result<PatientView> {
        let patient = self.find_mut(folder)?;
        patient.status = status;
        patient.status_edit = EditState::Pending;
        Ok(patient.clone())
    }

    /// Apply an optimistic priority edit, mirroring `set_status`
    pub fn set_priority(&mut self, folder: &str, priority: TriagePriority) -> Result<PatientView> {
        let patient = self.find_mut(folder)?;
        patient.priority = priority;
        patient.priority_edit = EditState::Pending;
        Ok(patient.clone())
    }

    /// Record the outcome of the status write. The optimistic value stays
    /// either way; a failure only flips the ledger entry.
    pub fn resolve_status(&mut self, folder: &str, ok: bool) {
        if let Ok(patient) = self.find_mut(folder) {
            if patient.status_edit == EditState::Pending {
                patient.status_edit = if ok { EditState::Committed } else { EditState::Failed };
            }
        }
    }

    /// Record the outcome of the priority write
    pub fn resolve_priority(&mut self, folder: &str, ok: bool) {
        if let Ok(patient) = self.find_mut(folder) {
            if patient.priority_edit == EditState::Pending {
                patient.priority_edit =
                    if ok { EditState::Committed } else { EditState::Failed };
            }
        }
    }

    fn find_mut(&mut self, folder: &str) -> Result<&mut PatientView> {
        self.patients
            .iter_mut()
            .find(|p| p.folder == folder)
            .ok_or_else(|| Error::NotFound(format!("Unknown patient record: {}", folder)))
    }
}

const CRITICAL_KEYWORDS: &[&str] = &[
    "chest pain",
    "heart attack",
    "stroke",
    "seizure",
    "severe bleeding",
    "unconscious",
];
const HIGH_KEYWORDS: &[&str] = &[
    "severe pain",
    "difficulty breathing",
    "high fever",
    "broken bone",
    "head injury",
];
const MEDIUM_KEYWORDS: &[&str] = &["pain", "fever", "infection", "injury", "bleeding"];

/// Keyword heuristic assigning a priority to symptom text, used when a
/// fetched record carries no stored priority
pub fn detect_priority(symptoms: &str) -> TriagePriority {
    let text = symptoms.to_lowercase();
    if CRITICAL_KEYWORDS.iter().any(|k| text.contains(k)) {
        TriagePriority::Critical
    } else if HIGH_KEYWORDS.iter().any(|k| text.contains(k)) {
        TriagePriority::High
    } else if MEDIUM_KEYWORDS.iter().any(|k| text.contains(k)) {
        TriagePriority::Medium
    } else {
        TriagePriority::Low
    }
}
