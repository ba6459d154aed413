use std::io::Write;

use form_autofill::{
    error::FillError,
    form::{
        field_model::{FieldDescriptor, FieldKind, FieldValue, ValueAssignment},
        label::UNKNOWN_FIELD,
    },
    mapping::{
        prompt::{build_mapping_prompt, extract_json_object, render_field_list},
        provider::{
            FileMappingProvider, HeuristicMappingProvider, LlmMappingProvider,
            ValueMappingProvider, guess_value,
        },
    },
};

fn descriptor(kind: FieldKind, label: &str, options: &[&str]) -> FieldDescriptor {
    FieldDescriptor {
        kind,
        label: label.into(),
        identifier: format!("q0_{}", label.to_lowercase().replace(' ', "_")),
        required: false,
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

fn sample_fields() -> Vec<FieldDescriptor> {
    let mut name = descriptor(FieldKind::SingleLineText, "Full name", &[]);
    name.required = true;
    vec![
        name,
        descriptor(FieldKind::SingleChoice, "Favorite color", &["Red", "Green", "Blue"]),
        descriptor(FieldKind::MultiChoice, "I accept the terms", &[]),
        descriptor(FieldKind::ChoiceList, "Country", &["Select one", "Canada", "Mexico"]),
        descriptor(FieldKind::MultiLineText, UNKNOWN_FIELD, &[]),
    ]
}

// ============================================================================
// Field list rendering and prompt
// ============================================================================

#[test]
fn field_list_is_numbered_with_kind_and_options() {
    let rendered = render_field_list(&sample_fields());
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "1. [single-line-text] Full name (required)");
    assert_eq!(
        lines[1],
        "2. [single-choice] Favorite color options: Red | Green | Blue"
    );
    assert_eq!(lines[2], "3. [multi-choice] I accept the terms");
    assert!(!rendered.contains(UNKNOWN_FIELD));
}

#[test]
fn prompt_carries_fields_context_and_rules() {
    let prompt = build_mapping_prompt(&sample_fields(), Some("Ada, lives in Canada"));

    assert!(prompt.contains("1. [single-line-text] Full name (required)"));
    assert!(prompt.contains("Ada, lives in Canada"));
    assert!(prompt.contains("take true or false"));
    assert!(prompt.contains("JSON object"));
}

#[test]
fn prompt_without_context_says_none() {
    let prompt = build_mapping_prompt(&sample_fields()[..1], Some("   "));
    assert!(prompt.contains("(none)"));
    assert!(!prompt.contains("true or false"));
}

// ============================================================================
// JSON extraction from model output
// ============================================================================

#[test]
fn extracts_object_wrapped_in_prose_and_fences() {
    let output = "Sure! Here you go:\n```json\n{\"Full name\": \"Ada\", \"Age\": 36}\n```\nHope it helps.";
    let object = extract_json_object(output).unwrap();

    assert_eq!(object["Full name"], "Ada");
    assert_eq!(object["Age"], 36);
}

#[test]
fn skips_broken_candidates() {
    let output = r#"{not json at all} then {"Country": "Canada", "nested": {"a": 1}}"#;
    let object = extract_json_object(output).unwrap();

    assert_eq!(object["Country"], "Canada");
    assert_eq!(object["nested"]["a"], 1);
}

#[test]
fn no_object_is_an_extraction_error() {
    let err = extract_json_object("I cannot help with that.").unwrap_err();
    assert!(matches!(err, FillError::Extraction(_)));
    assert!(err.is_fatal());

    assert!(extract_json_object("[1, 2, 3]").is_err());
}

#[test]
fn json_values_convert_to_field_values() {
    let object = extract_json_object(
        r#"{"a": "x", "b": true, "c": 7, "d": null, "e": ["p", 1], "f": {"g": 1}}"#,
    )
    .unwrap();
    let values = ValueAssignment::from_json_object(&object);

    assert_eq!(values.len(), 4);
    assert_eq!(values.get("a"), Some(&FieldValue::Text("x".into())));
    assert_eq!(values.get("b"), Some(&FieldValue::Flag(true)));
    assert_eq!(values.get("c"), Some(&FieldValue::Text("7".into())));
    assert_eq!(
        values.get("e"),
        Some(&FieldValue::List(vec!["p".into(), "1".into()]))
    );
    assert_eq!(values.get("d"), None);
    assert_eq!(values.get("f"), None);
}

// ============================================================================
// Providers
// ============================================================================

#[test]
fn llm_provider_with_canned_response() {
    let provider = LlmMappingProvider::with_mock_response(
        r#"Answer: {"Full name": "Ada Lovelace", "Favorite color": "Green", "I accept the terms": true}"#,
    );
    let values = provider.provide(&sample_fields(), None).unwrap();

    assert_eq!(values.len(), 3);
    assert_eq!(values.get("Favorite color"), Some(&FieldValue::Text("Green".into())));
    assert_eq!(values.get("I accept the terms"), Some(&FieldValue::Flag(true)));
}

#[test]
fn llm_provider_drops_placeholder_label_key() {
    let provider = LlmMappingProvider::with_mock_response(
        r#"{"Full name": "Ada", "Unknown field": "leaked"}"#,
    );
    let values = provider.provide(&sample_fields(), None).unwrap();

    assert_eq!(values.len(), 1);
    assert_eq!(values.get(UNKNOWN_FIELD), None);
}

#[test]
fn prompt_rules_ignore_unlabeled_fields() {
    let prompt = build_mapping_prompt(&sample_fields()[4..], None);
    assert!(!prompt.contains(UNKNOWN_FIELD));
    assert!(!prompt.contains("Text fields take a string"));
}

#[test]
fn llm_provider_without_json_fails() {
    let provider = LlmMappingProvider::with_mock_response("no idea, sorry");
    let err = provider.provide(&sample_fields(), None).unwrap_err();
    assert!(matches!(err, FillError::Extraction(_)));
}

#[test]
fn heuristic_provider_fills_every_labeled_field() {
    let values = HeuristicMappingProvider
        .provide(&sample_fields(), None)
        .unwrap();

    assert_eq!(values.get("Full name"), Some(&FieldValue::Text("Jane Doe".into())));
    assert_eq!(values.get("Favorite color"), Some(&FieldValue::Text("Red".into())));
    assert_eq!(values.get("I accept the terms"), Some(&FieldValue::Flag(true)));
    // "Select one" is a prompt, not an answer
    assert_eq!(values.get("Country"), Some(&FieldValue::Text("Canada".into())));
    assert_eq!(values.get(UNKNOWN_FIELD), None);
}

#[test]
fn guess_value_by_label() {
    assert_eq!(guess_value("Work email"), "user@example.com");
    assert_eq!(guess_value("Mobile phone"), "555-0100");
    assert_eq!(guess_value("Postal code"), "90210");
    assert_eq!(guess_value("Your age"), "42");
    assert_eq!(guess_value("Message"), "test");
}

#[test]
fn file_provider_reads_yaml_answers() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Full name: Ada Lovelace\nFavorite color: Green\nI accept the terms: true\nCountry: ~"
    )
    .unwrap();

    let provider = FileMappingProvider::new(file.path());
    let values = provider.provide(&sample_fields(), None).unwrap();

    assert_eq!(values.len(), 3);
    assert_eq!(values.get("Full name"), Some(&FieldValue::Text("Ada Lovelace".into())));
    assert_eq!(values.get("I accept the terms"), Some(&FieldValue::Flag(true)));
}

#[test]
fn file_provider_accepts_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"Country": "Mexico"}}"#).unwrap();

    let values = FileMappingProvider::new(file.path())
        .provide(&[], None)
        .unwrap();
    assert_eq!(values.get("Country"), Some(&FieldValue::Text("Mexico".into())));
}

#[test]
fn file_provider_rejects_non_mapping() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "- just\n- a list").unwrap();

    let err = FileMappingProvider::new(file.path())
        .provide(&[], None)
        .unwrap_err();
    assert!(matches!(err, FillError::Extraction(_)));
}

#[test]
fn file_provider_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileMappingProvider::new(dir.path().join("answers.yaml"))
        .provide(&[], None)
        .unwrap_err();
    assert!(matches!(err, FillError::Acquisition(_)));
}
