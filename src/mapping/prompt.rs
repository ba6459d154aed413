use serde_json::{Map, Value};

use crate::error::FillError;
use crate::form::field_model::{FieldDescriptor, FieldKind};
use crate::form::label::UNKNOWN_FIELD;

/// Fields whose label can serve as a lookup key.
fn labeled(fields: &[FieldDescriptor]) -> impl Iterator<Item = &FieldDescriptor> {
    fields.iter().filter(|f| f.label != UNKNOWN_FIELD)
}

/// Numbered, human-readable enumeration of the fields. Fields without a
/// usable label are left out.
///
/// `1. [single-choice] Favorite color (required) options: Red | Green | Blue`
pub fn render_field_list(fields: &[FieldDescriptor]) -> String {
    labeled(fields)
        .enumerate()
        .map(|(i, f)| {
            let mut line = format!("{}. [{}] {}", i + 1, f.kind, f.label);
            if f.required {
                line.push_str(" (required)");
            }
            if !f.options.is_empty() {
                line.push_str(" options: ");
                line.push_str(&f.options.join(" | "));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt asking a language model for a label → value JSON object.
pub fn build_mapping_prompt(fields: &[FieldDescriptor], context: Option<&str>) -> String {
    let has = |kind: FieldKind| labeled(fields).any(|f| f.kind == kind);

    let mut rules = vec![
        "- Use each label EXACTLY as written above as the JSON key.".to_string(),
        "- Omit a field (or use null) when you have nothing sensible to enter.".to_string(),
    ];
    if has(FieldKind::SingleLineText) || has(FieldKind::MultiLineText) {
        rules.push("- Text fields take a string.".into());
    }
    if has(FieldKind::SingleChoice) || has(FieldKind::ChoiceList) {
        rules.push("- single-choice and choice-list fields take exactly one of their options, copied verbatim.".into());
    }
    if has(FieldKind::MultiChoice) {
        rules.push("- multi-choice fields are single checkboxes and take true or false.".into());
    }

    format!(
        r#"You are filling in a web form on behalf of a user.

FIELDS:
{fields}

CONTEXT:
{context}

RULES:
{rules}

Respond with ONLY a JSON object mapping labels to values, no explanation."#,
        fields = render_field_list(fields),
        context = context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("(none)"),
        rules = rules.join("\n"),
    )
}

/// First well-formed JSON object embedded in `text`.
///
/// Model output is untrusted: it may wrap the object in prose or code
/// fences, or emit broken candidates before the real one.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, FillError> {
    for (start, _) in text.match_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<Map<String, Value>>();
        if let Some(Ok(object)) = stream.next() {
            return Ok(object);
        }
    }

    let preview: String = text.chars().take(120).collect();
    Err(FillError::Extraction(format!(
        "no JSON object found in model output: {:?}",
        preview
    )))
}
