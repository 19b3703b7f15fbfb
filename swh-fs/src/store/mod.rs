//! Per-patient record store
//!
//! One directory per patient intake under the records directory. Each
//! folder holds a human-readable `transcript.txt`, a `metadata.json`, and
//! optionally the captured `photo.jpg`. The folder name doubles as the
//! record's primary key and never changes after creation; triage edits
//! rewrite `metadata.json` in place.
//!
//! Metadata writes go through a temp-file + rename so a concurrent reader
//! never observes a torn file. Read-modify-write races between two
//! concurrent updates remain possible (last writer wins); acceptable for
//! the single-operator deployment this store serves.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use swh_common::api::SavePatientRequest;
use swh_common::{time, Error, InputMethod, PatientMetadata, PatientRecord, Result, TriageUpdate};

const TRANSCRIPT_FILE: &str = "transcript.txt";
const METADATA_FILE: &str = "metadata.json";
const METADATA_TMP_FILE: &str = "metadata.json.tmp";
const PHOTO_FILE: &str = "photo.jpg";

/// A record folder created by [`RecordStore::create`]
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    /// Folder name (primary key)
    pub folder: String,
    /// Absolute path of the record folder
    pub path: PathBuf,
}

/// Directory-per-patient persistence layer
#[derive(Debug, Clone)]
pub struct RecordStore {
    records_dir: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at an existing records directory
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
        }
    }

    /// Root directory holding one folder per record
    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Path of a record's photo file (the file may or may not exist)
    pub fn photo_path(&self, folder: &str) -> PathBuf {
        self.records_dir.join(folder).join(PHOTO_FILE)
    }

    /// Create a new record folder from an intake submission.
    ///
    /// Validates that `name` and `symptoms` are non-empty and that the
    /// submitted timestamp (if any) parses; writes the transcript, the
    /// decoded photo when supplied, and the metadata file.
    pub async fn create(&self, req: &SavePatientRequest) -> Result<CreatedRecord> {
        if req.name.trim().is_empty() || req.symptoms.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Name and symptoms are required".to_string(),
            ));
        }

        let timestamp = match &req.timestamp {
            Some(raw) => time::parse_iso(raw)
                .ok_or_else(|| Error::InvalidInput(format!("Invalid timestamp: {}", raw)))?,
            None => time::now(),
        };

        let folder = format!(
            "{}_{}",
            sanitize_name(&req.name),
            time::folder_timestamp(&timestamp)
        );
        let dir = self.records_dir.join(&folder);
        fs::create_dir_all(&dir).await?;

        fs::write(
            dir.join(TRANSCRIPT_FILE),
            render_transcript(req, &timestamp),
        )
        .await?;

        let has_photo = match &req.photo {
            Some(payload) => {
                let bytes = decode_photo(payload)?;
                fs::write(dir.join(PHOTO_FILE), bytes).await?;
                true
            }
            None => false,
        };

        let metadata = PatientMetadata {
            name: req.name.clone(),
            symptoms: req.symptoms.clone(),
            language: req.language.clone(),
            input_method: req.input_method,
            timestamp,
            has_photo,
            status: None,
            priority: None,
        };
        self.write_metadata(&dir, &metadata).await?;

        Ok(CreatedRecord { folder, path: dir })
    }

    /// List every readable record.
    ///
    /// Folders with missing or corrupt metadata are skipped with a warning
    /// rather than failing the whole listing. Absent `status`/`priority`
    /// are filled with their defaults; records with a photo file get a
    /// `photoUrl` pointing at the photo route.
    pub async fn list(&self) -> Result<Vec<PatientRecord>> {
        let mut dir = match fs::read_dir(&self.records_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut folders = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                folders.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // Folder names embed the record timestamp, so sorting by name gives
        // a deterministic, roughly chronological listing
        folders.sort();

        let mut patients = Vec::with_capacity(folders.len());
        for folder in folders {
            match self.read_record(&folder).await {
                Ok(record) => patients.push(record),
                Err(e) => warn!("Skipping record folder {}: {}", folder, e),
            }
        }
        Ok(patients)
    }

    /// Merge the provided triage fields into an existing record's metadata.
    ///
    /// Returns NotFound when the folder has no metadata file. Only the
    /// fields present in `update` change; everything else is preserved.
    pub async fn update(&self, folder: &str, update: &TriageUpdate) -> Result<PatientMetadata> {
        if !is_valid_folder_name(folder) {
            return Err(Error::InvalidInput(format!(
                "Invalid folder name: {}",
                folder
            )));
        }

        let dir = self.records_dir.join(folder);
        let raw = match fs::read(dir.join(METADATA_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!(
                    "Patient record not found: {}",
                    folder
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let mut metadata: PatientMetadata = serde_json::from_slice(&raw)?;
        if let Some(status) = update.status {
            metadata.status = Some(status);
        }
        if let Some(priority) = update.priority {
            metadata.priority = Some(priority);
        }
        self.write_metadata(&dir, &metadata).await?;

        Ok(metadata)
    }

    async fn read_record(&self, folder: &str) -> Result<PatientRecord> {
        let dir = self.records_dir.join(folder);
        let raw = fs::read(dir.join(METADATA_FILE)).await?;
        let mut metadata: PatientMetadata = serde_json::from_slice(&raw)?;
        metadata.status.get_or_insert_with(Default::default);
        metadata.priority.get_or_insert_with(Default::default);

        let photo_url = if fs::metadata(dir.join(PHOTO_FILE)).await.is_ok() {
            Some(format!("/patient-photos/{}/{}", folder, PHOTO_FILE))
        } else {
            None
        };

        Ok(PatientRecord {
            folder: folder.to_string(),
            metadata,
            photo_url,
        })
    }

    /// Write `metadata.json` via temp file + rename
    async fn write_metadata(&self, dir: &Path, metadata: &PatientMetadata) -> Result<()> {
        let tmp = dir.join(METADATA_TMP_FILE);
        let body = serde_json::to_vec_pretty(metadata)?;
        fs::write(&tmp, &body).await?;
        fs::rename(&tmp, dir.join(METADATA_FILE)).await?;
        Ok(())
    }
}

/// Lower-case a patient name and replace every character outside
/// `[a-z0-9_-]` with `_`, yielding the filesystem-safe folder component
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Check a folder name against the identity charset.
///
/// Folder names are produced by `sanitize_name` plus the timestamp suffix,
/// so anything outside `[A-Za-z0-9_-]` (separators in particular) marks a
/// name that cannot belong to this store.
pub fn is_valid_folder_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 256
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Render the human-readable transcript file
fn render_transcript(req: &SavePatientRequest, timestamp: &DateTime<Utc>) -> String {
    format!(
        "Patient Name: {}\n\
         Timestamp: {}\n\
         Input Method: {}\n\
         Language: {}\n\
         \n\
         SYMPTOMS:\n\
         {}\n",
        req.name,
        time::to_iso(timestamp),
        req.input_method.map(InputMethod::as_str).unwrap_or("unknown"),
        req.language.as_deref().unwrap_or("unknown"),
        req.symptoms,
    )
}

/// Decode a photo payload, stripping the `data:image/...;base64,` prefix
/// when present
fn decode_photo(payload: &str) -> Result<Vec<u8>> {
    let b64 = match payload.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| Error::InvalidInput(format!("Invalid photo payload: {}", e)))
}
