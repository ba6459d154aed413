use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::FillError;
use crate::form::field_model::{FieldDescriptor, FieldKind, FieldValue, ValueAssignment};
use crate::form::label::UNKNOWN_FIELD;
use crate::mapping::inference::{MockTextInference, TextInference};
use crate::mapping::prompt::{build_mapping_prompt, extract_json_object};

/// Produces the label → value mapping for a set of discovered fields.
pub trait ValueMappingProvider {
    fn provide(
        &self,
        fields: &[FieldDescriptor],
        context: Option<&str>,
    ) -> Result<ValueAssignment, FillError>;
}

// ============================================================================
// LlmMappingProvider: asks a language model
// ============================================================================

pub struct LlmMappingProvider {
    backend: Box<dyn TextInference>,
}

impl LlmMappingProvider {
    pub fn new(backend: Box<dyn TextInference>) -> Self {
        Self { backend }
    }

    /// Provider backed by a canned model response.
    pub fn with_mock_response(response: &str) -> Self {
        Self {
            backend: Box::new(MockTextInference::new(response)),
        }
    }
}

impl ValueMappingProvider for LlmMappingProvider {
    fn provide(
        &self,
        fields: &[FieldDescriptor],
        context: Option<&str>,
    ) -> Result<ValueAssignment, FillError> {
        let prompt = build_mapping_prompt(fields, context);
        let response = self.backend.infer_text(&prompt)?;
        debug!(chars = response.len(), "model responded");

        let object = extract_json_object(&response)?;
        let mut values = ValueAssignment::from_json_object(&object);
        if values.remove(UNKNOWN_FIELD).is_some() {
            debug!("dropped a value keyed by the unlabeled-field placeholder");
        }
        info!(values = values.len(), "value mapping extracted");
        Ok(values)
    }
}

// ============================================================================
// FileMappingProvider: answers from a YAML or JSON file
// ============================================================================

pub struct FileMappingProvider {
    path: PathBuf,
}

impl FileMappingProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ValueMappingProvider for FileMappingProvider {
    fn provide(
        &self,
        _fields: &[FieldDescriptor],
        _context: Option<&str>,
    ) -> Result<ValueAssignment, FillError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            FillError::Acquisition(format!("could not read {}: {}", self.path.display(), e))
        })?;
        // YAML is a superset of JSON, so one parser covers both.
        let parsed: Value = serde_yaml::from_str(&content).map_err(|e| {
            FillError::Extraction(format!("{} is not YAML/JSON: {}", self.path.display(), e))
        })?;
        match parsed {
            Value::Object(object) => Ok(ValueAssignment::from_json_object(&object)),
            _ => Err(FillError::Extraction(format!(
                "{} does not hold a label → value mapping",
                self.path.display()
            ))),
        }
    }
}

// ============================================================================
// HeuristicMappingProvider: deterministic offline values
// ============================================================================

/// Fills every field with a plausible value derived from its label, without
/// any model call.
pub struct HeuristicMappingProvider;

/// Labels for which a checkbox is ticked.
const CONSENT_KEYWORDS: [&str; 4] = ["agree", "accept", "consent", "terms"];

/// Option texts that are prompts rather than answers.
const PLACEHOLDER_OPTIONS: [&str; 4] = ["choose", "select", "--", "please"];

impl ValueMappingProvider for HeuristicMappingProvider {
    fn provide(
        &self,
        fields: &[FieldDescriptor],
        _context: Option<&str>,
    ) -> Result<ValueAssignment, FillError> {
        let mut values = ValueAssignment::new();
        for field in fields {
            if field.label == UNKNOWN_FIELD {
                continue;
            }
            let value = match field.kind {
                FieldKind::SingleLineText | FieldKind::MultiLineText => {
                    Some(FieldValue::Text(guess_value(&field.label)))
                }
                FieldKind::SingleChoice | FieldKind::ChoiceList => {
                    first_real_option(&field.options).map(FieldValue::Text)
                }
                FieldKind::MultiChoice => {
                    let lower = field.label.to_lowercase();
                    Some(FieldValue::Flag(
                        CONSENT_KEYWORDS.iter().any(|k| lower.contains(k)),
                    ))
                }
            };
            if let Some(v) = value {
                values.insert(field.label.clone(), v);
            }
        }
        Ok(values)
    }
}

fn first_real_option(options: &[String]) -> Option<String> {
    options
        .iter()
        .find(|o| {
            let lower = o.trim().to_lowercase();
            !lower.is_empty() && !PLACEHOLDER_OPTIONS.iter().any(|p| lower.starts_with(p))
        })
        .cloned()
}

/// Derive a sensible fill value from a field label.
pub fn guess_value(label: &str) -> String {
    let l = label.to_lowercase();

    // Label-based heuristics (checked in order)
    if l.contains("email") || l.contains("e-mail") {
        return "user@example.com".into();
    }
    if l.contains("password") {
        return "TestPass123!".into();
    }
    if l.contains("phone") || l.contains("tel") || l.contains("mobile") {
        return "555-0100".into();
    }
    if l.contains("url") || l.contains("website") {
        return "https://example.com".into();
    }
    if l.contains("zip") || l.contains("postal") {
        return "90210".into();
    }
    if l.contains("username") || l.contains("user") {
        return "testuser".into();
    }
    if l.contains("name") {
        return "Jane Doe".into();
    }
    if l.contains("address") || l.contains("street") {
        return "1 Main Street".into();
    }
    if l.contains("city") {
        return "Springfield".into();
    }
    if l.contains("date") || l.contains("birth") {
        return "2025-01-15".into();
    }
    if l.split(|c: char| !c.is_alphanumeric()).any(|w| w == "age")
        || l.contains("number")
        || l.contains("amount")
        || l.contains("quantity")
    {
        return "42".into();
    }

    "test".into()
}
