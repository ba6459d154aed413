use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Field descriptors produced by discovery
// ============================================================================

/// Semantic kind of a discovered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    SingleLineText,
    MultiLineText,
    SingleChoice,
    MultiChoice,
    ChoiceList,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::SingleLineText => "single-line-text",
            FieldKind::MultiLineText => "multi-line-text",
            FieldKind::SingleChoice => "single-choice",
            FieldKind::MultiChoice => "multi-choice",
            FieldKind::ChoiceList => "choice-list",
        }
    }

    /// Short tag used when building descriptor identifiers.
    pub(crate) fn id_tag(self) -> &'static str {
        match self {
            FieldKind::SingleLineText => "text",
            FieldKind::MultiLineText => "textarea",
            FieldKind::SingleChoice => "radio",
            FieldKind::MultiChoice => "checkbox",
            FieldKind::ChoiceList => "select",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, FieldKind::SingleLineText | FieldKind::MultiLineText)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered control or control group.
///
/// Pure data: holds no handle to the node it was discovered from. The
/// application pass re-resolves the control from a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub label: String,
    pub identifier: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

// ============================================================================
// Value assignment supplied by the value-mapping provider
// ============================================================================

/// A value assigned to one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert loosely-typed JSON into a value. `null` and objects are absent.
    pub fn from_json(value: &Value) -> Option<FieldValue> {
        match value {
            Value::Bool(b) => Some(FieldValue::Flag(*b)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            Value::Array(items) => Some(FieldValue::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(b) => write!(f, "{}", b),
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::List(items) => write!(f, "{:?}", items),
        }
    }
}

/// Label → value mapping. Keyed by label, never by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueAssignment {
    values: HashMap<String, FieldValue>,
}

impl ValueAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, dropping entries whose value is `null` or
    /// has no usable shape.
    pub fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        let values = object
            .iter()
            .filter_map(|(label, v)| FieldValue::from_json(v).map(|fv| (label.clone(), fv)))
            .collect();
        Self { values }
    }

    pub fn insert(&mut self, label: impl Into<String>, value: FieldValue) {
        self.values.insert(label.into(), value);
    }

    pub fn with(mut self, label: impl Into<String>, value: FieldValue) -> Self {
        self.insert(label, value);
        self
    }

    pub fn remove(&mut self, label: &str) -> Option<FieldValue> {
        self.values.remove(label)
    }

    /// Exact-label lookup.
    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.values.get(label)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
