//! Request and response types for the summary endpoints.
//!
//! Raw bodies keep every field optional so validation can report all
//! problems at once; `validate` turns them into the typed requests the
//! prompt builder consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default minimum length (in characters) of trimmed session notes
pub const DEFAULT_MIN_NOTES_LENGTH: usize = 10;

/// Care plan substituted when the model reply has no recognizable care plan
pub const CARE_PLAN_PLACEHOLDER: &str = "Please review session notes and develop appropriate care plan based on client needs and therapeutic goals.";

/// Writing style of the generated documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Clinical,
    Conversational,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Formal, Tone::Clinical, Tone::Conversational];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Clinical => "clinical",
            Tone::Conversational => "conversational",
        }
    }

    /// Parse a wire value; matching is exact
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// Layout of the generated documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Paragraph,
    Bullet,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Paragraph => "paragraph",
            OutputFormat::Bullet => "bullet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "paragraph" => Some(OutputFormat::Paragraph),
            "bullet" => Some(OutputFormat::Bullet),
            _ => None,
        }
    }
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// All validation failures for one request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Invalid request data ({} field errors)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

/// Body of `POST /api/summary` as received
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequestBody {
    #[serde(default)]
    pub session_notes: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub session_date: Option<String>,
}

/// Body of the legacy `POST /api/generate-summary` as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacySummaryRequestBody {
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

/// Validated summary request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub session_notes: String,
    pub tone: Tone,
    pub output_format: OutputFormat,
    pub session_date: Option<String>,
}

/// Validated legacy summary request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacySummaryRequest {
    pub notes: String,
    pub tone: Tone,
}

fn check_notes(field: &str, notes: Option<&str>, min_len: usize, errors: &mut Vec<FieldError>) {
    match notes {
        None => errors.push(FieldError::new(field, format!("{} is required", field))),
        Some(n) if n.trim().chars().count() < min_len => errors.push(FieldError::new(
            field,
            format!("Notes must be at least {} characters long", min_len),
        )),
        Some(_) => {}
    }
}

fn check_tone(tone: Option<&str>, errors: &mut Vec<FieldError>) -> Option<Tone> {
    match tone {
        None => {
            errors.push(FieldError::new("tone", "tone is required"));
            None
        }
        Some(raw) => {
            let parsed = Tone::parse(raw);
            if parsed.is_none() {
                errors.push(FieldError::new(
                    "tone",
                    format!(
                        "Invalid tone '{}'. Expected 'formal' | 'clinical' | 'conversational'",
                        raw
                    ),
                ));
            }
            parsed
        }
    }
}

impl SummaryRequestBody {
    pub fn validate(&self, min_notes_length: usize) -> Result<SummaryRequest, ValidationErrors> {
        let mut errors = Vec::new();

        check_notes(
            "sessionNotes",
            self.session_notes.as_deref(),
            min_notes_length,
            &mut errors,
        );
        let tone = check_tone(self.tone.as_deref(), &mut errors);

        let output_format = match self.output_format.as_deref() {
            None => Some(OutputFormat::default()),
            Some(raw) => {
                let parsed = OutputFormat::parse(raw);
                if parsed.is_none() {
                    errors.push(FieldError::new(
                        "outputFormat",
                        format!("Invalid output format '{}'. Expected 'paragraph' | 'bullet'", raw),
                    ));
                }
                parsed
            }
        };

        match (self.session_notes.as_ref(), tone, output_format) {
            (Some(notes), Some(tone), Some(output_format)) if errors.is_empty() => {
                Ok(SummaryRequest {
                    session_notes: notes.clone(),
                    tone,
                    output_format,
                    session_date: self
                        .session_date
                        .as_deref()
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                })
            }
            _ => Err(ValidationErrors { errors }),
        }
    }
}

impl LegacySummaryRequestBody {
    pub fn validate(&self, min_notes_length: usize) -> Result<LegacySummaryRequest, ValidationErrors> {
        let mut errors = Vec::new();

        check_notes("notes", self.notes.as_deref(), min_notes_length, &mut errors);
        let tone = check_tone(self.tone.as_deref(), &mut errors);

        match (self.notes.as_ref(), tone) {
            (Some(notes), Some(tone)) if errors.is_empty() => Ok(LegacySummaryRequest {
                notes: notes.clone(),
                tone,
            }),
            _ => Err(ValidationErrors { errors }),
        }
    }
}

/// Generated documentation returned to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: String,
    pub care_plan: String,
}

/// Body of `POST /api/feedback`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

/// Body of `POST /api/export`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub summary: String,
    pub care_plan: String,
    #[serde(default)]
    pub session_date: Option<String>,
    #[serde(default)]
    pub output_format: OutputFormat,
}
