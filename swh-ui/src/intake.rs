//! Patient intake flow
//!
//! A strictly forward-moving step sequence: the patient gives their name
//! (typed or spoken), picks how to describe their symptoms, enters or
//! dictates the symptom text, then takes a photo. Reaching the photo step
//! finalizes the draft into a storage submission; the submission itself is
//! fired by the API layer without blocking navigation, and this state only
//! tracks the transient `saving` flag plus the eventual outcome.
//!
//! `back()` walks one step backward keeping earlier answers; `reset()`
//! (Start Over) drops everything.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use swh_common::api::SavePatientRequest;
use swh_common::{time, Error, InputMethod, Result};

/// Intake wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStep {
    #[default]
    Name,
    Choice,
    Input,
    Camera,
}

/// Accumulated intake state for one patient session
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntakeFlow {
    pub step: IntakeStep,
    pub patient_name: Option<String>,
    pub input_method: Option<InputMethod>,
    pub symptoms: Option<String>,
    pub language: Option<String>,
    /// Raw photo payload; kept out of state responses
    #[serde(skip)]
    pub photo_data: Option<String>,
    pub has_photo: bool,
    /// True while the storage submission is in flight
    pub saving: bool,
    /// Folder of the created record once the submission succeeded
    pub saved_folder: Option<String>,
    /// Message of a failed submission, surfaced to the patient screen
    pub save_error: Option<String>,
}

impl IntakeFlow {
    /// Record the patient's name and advance to the method choice.
    ///
    /// Voice input runs through the transcript heuristics first; typed
    /// input is only trimmed.
    pub fn submit_name(&mut self, raw: &str, voice: bool) -> Result<()> {
        self.expect_step(IntakeStep::Name)?;
        let name = if voice {
            extract_name(raw)
        } else {
            raw.trim().to_string()
        };
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Patient name must not be empty".to_string(),
            ));
        }
        self.patient_name = Some(name);
        self.step = IntakeStep::Choice;
        Ok(())
    }

    /// Pick how symptoms will be captured and advance to the input step
    pub fn choose_method(&mut self, method: InputMethod) -> Result<()> {
        self.expect_step(IntakeStep::Choice)?;
        self.input_method = Some(method);
        self.step = IntakeStep::Input;
        Ok(())
    }

    /// Record the symptom text (typed or transcribed) and advance to the
    /// camera step. A transcription may carry a detected language;
    /// otherwise English is assumed.
    pub fn submit_symptoms(&mut self, text: &str, language: Option<String>) -> Result<()> {
        self.expect_step(IntakeStep::Input)?;
        if text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Symptom description must not be empty".to_string(),
            ));
        }
        self.symptoms = Some(text.to_string());
        self.language = Some(language.unwrap_or_else(|| "en".to_string()));
        self.step = IntakeStep::Camera;
        Ok(())
    }

    /// Attach the captured photo and produce the storage submission.
    ///
    /// Marks the flow as saving; the caller fires the actual request and
    /// reports back via [`mark_saved`](Self::mark_saved) /
    /// [`mark_save_failed`](Self::mark_save_failed).
    pub fn capture_photo(&mut self, photo: String) -> Result<SavePatientRequest> {
        self.expect_step(IntakeStep::Camera)?;
        self.photo_data = Some(photo);
        self.has_photo = true;
        self.saving = true;
        self.save_error = None;
        Ok(self.to_request())
    }

    /// One step backward; earlier answers are kept. No-op on the first step.
    pub fn back(&mut self) {
        self.step = match self.step {
            IntakeStep::Camera => IntakeStep::Input,
            IntakeStep::Input => IntakeStep::Choice,
            IntakeStep::Choice | IntakeStep::Name => IntakeStep::Name,
        };
    }

    /// Start Over: drop all accumulated state
    pub fn reset(&mut self) {
        *self = IntakeFlow::default();
    }

    /// Submission completed; remember the record folder
    pub fn mark_saved(&mut self, folder: String) {
        self.saving = false;
        self.saved_folder = Some(folder);
    }

    /// Submission failed; surface the message
    pub fn mark_save_failed(&mut self, message: String) {
        self.saving = false;
        self.save_error = Some(message);
    }

    fn to_request(&self) -> SavePatientRequest {
        SavePatientRequest {
            name: self.patient_name.clone().unwrap_or_default(),
            symptoms: self.symptoms.clone().unwrap_or_default(),
            photo: self.photo_data.clone(),
            language: self.language.clone(),
            input_method: self.input_method,
            timestamp: Some(time::to_iso(&time::now())),
        }
    }

    fn expect_step(&self, expected: IntakeStep) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Action requires step {:?}, flow is at {:?}",
                expected, self.step
            )))
        }
    }
}

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:my name is|i am|i'm|this is|call me)\s+(.+?)(?:\.|$)").unwrap(),
        Regex::new(r"(?i)(?:name|called):\s*(.+?)(?:\.|$)").unwrap(),
    ]
});

/// Strip conversational filler from a spoken name transcript
/// ("Hello, my name is John" -> "John"). Falls back to the raw transcript
/// when no pattern matches; trailing punctuation is removed either way.
pub fn extract_name(raw: &str) -> String {
    let raw = raw.trim();
    let mut extracted = raw;
    for pattern in NAME_PATTERNS.iter() {
        if let Some(m) = pattern.captures(raw).and_then(|c| c.get(1)) {
            extracted = m.as_str();
            break;
        }
    }
    extracted
        .trim()
        .trim_end_matches(&['.', ',', '!', '?'][..])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Name extraction
    // =========================================================================

    #[test]
    fn extracts_name_from_introduction() {
        assert_eq!(extract_name("Hi, my name is Alice Smith."), "Alice Smith");
        assert_eq!(extract_name("I am Carol"), "Carol");
        assert_eq!(extract_name("I'm Dave!"), "Dave");
        assert_eq!(extract_name("you can call me Erin."), "Erin");
        assert_eq!(extract_name("name: Frank"), "Frank");
    }

    #[test]
    fn falls_back_to_raw_transcript() {
        assert_eq!(extract_name("Bob"), "Bob");
        assert_eq!(extract_name("  Bob Jones  "), "Bob Jones");
    }

    #[test]
    fn strips_trailing_punctuation() {
        assert_eq!(extract_name("Grace."), "Grace");
        assert_eq!(extract_name("my name is Heidi, "), "Heidi");
    }

    // =========================================================================
    // Step transitions
    // =========================================================================

    fn flow_at_camera() -> IntakeFlow {
        let mut flow = IntakeFlow::default();
        flow.submit_name("Alice Smith", false).unwrap();
        flow.choose_method(InputMethod::Voice).unwrap();
        flow.submit_symptoms("persistent cough", Some("en".to_string()))
            .unwrap();
        flow
    }

    #[test]
    fn steps_advance_in_order() {
        let mut flow = IntakeFlow::default();
        assert_eq!(flow.step, IntakeStep::Name);

        flow.submit_name("Alice Smith", false).unwrap();
        assert_eq!(flow.step, IntakeStep::Choice);
        assert_eq!(flow.patient_name.as_deref(), Some("Alice Smith"));

        flow.choose_method(InputMethod::Text).unwrap();
        assert_eq!(flow.step, IntakeStep::Input);

        flow.submit_symptoms("fever", None).unwrap();
        assert_eq!(flow.step, IntakeStep::Camera);
        assert_eq!(flow.language.as_deref(), Some("en"));
    }

    #[test]
    fn voice_name_goes_through_extraction() {
        let mut flow = IntakeFlow::default();
        flow.submit_name("Hello, my name is Alice Smith.", true).unwrap();
        assert_eq!(flow.patient_name.as_deref(), Some("Alice Smith"));
    }

    #[test]
    fn out_of_order_actions_are_rejected() {
        let mut flow = IntakeFlow::default();
        assert!(flow.submit_symptoms("fever", None).is_err());
        assert!(flow.choose_method(InputMethod::Text).is_err());
        assert!(flow.capture_photo("data:...".to_string()).is_err());
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let mut flow = IntakeFlow::default();
        assert!(flow.submit_name("   ", false).is_err());

        flow.submit_name("Bob", false).unwrap();
        flow.choose_method(InputMethod::Text).unwrap();
        assert!(flow.submit_symptoms("  ", None).is_err());
    }

    #[test]
    fn capture_photo_builds_submission() {
        let mut flow = flow_at_camera();
        let request = flow.capture_photo("data:image/jpeg;base64,Zm9v".to_string()).unwrap();

        assert_eq!(request.name, "Alice Smith");
        assert_eq!(request.symptoms, "persistent cough");
        assert_eq!(request.input_method, Some(InputMethod::Voice));
        assert!(request.photo.is_some());
        assert!(request.timestamp.is_some());
        assert!(flow.saving);
        assert!(flow.has_photo);
    }

    #[test]
    fn save_outcome_clears_saving_flag() {
        let mut flow = flow_at_camera();
        flow.capture_photo("x".to_string()).unwrap();

        flow.mark_saved("alice_smith_x".to_string());
        assert!(!flow.saving);
        assert_eq!(flow.saved_folder.as_deref(), Some("alice_smith_x"));

        let mut failed = flow_at_camera();
        failed.capture_photo("x".to_string()).unwrap();
        failed.mark_save_failed("storage unreachable".to_string());
        assert!(!failed.saving);
        assert_eq!(failed.save_error.as_deref(), Some("storage unreachable"));
    }

    #[test]
    fn back_keeps_earlier_answers() {
        let mut flow = flow_at_camera();
        flow.back();
        assert_eq!(flow.step, IntakeStep::Input);
        assert_eq!(flow.patient_name.as_deref(), Some("Alice Smith"));
        flow.back();
        flow.back();
        assert_eq!(flow.step, IntakeStep::Name);
        // No-op at the first step
        flow.back();
        assert_eq!(flow.step, IntakeStep::Name);
    }

    #[test]
    fn reset_clears_everything() {
        let mut flow = flow_at_camera();
        flow.capture_photo("x".to_string()).unwrap();
        flow.reset();

        assert_eq!(flow.step, IntakeStep::Name);
        assert!(flow.patient_name.is_none());
        assert!(flow.symptoms.is_none());
        assert!(flow.photo_data.is_none());
        assert!(!flow.has_photo);
        assert!(!flow.saving);
    }
}
