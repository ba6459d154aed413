use serde::Serialize;
use sha1::{Digest, Sha1};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dom::document::Document;
use crate::form::field_model::FieldDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TracePhase {
    Discovery,
    Mapping,
    Apply,
}

#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub phase: TracePhase,

    pub field_id: Option<String>,
    pub label: Option<String>,
    pub kind: Option<String>,

    pub outcome: Option<String>,
    pub detail: Option<String>,

    /// SHA-1 of the snapshot the event was computed against.
    pub document_digest: Option<String>,
}

impl TraceEvent {
    pub fn now(phase: TracePhase) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            phase,
            field_id: None,
            label: None,
            kind: None,
            outcome: None,
            detail: None,
            document_digest: None,
        }
    }

    pub fn with_field(mut self, field: &FieldDescriptor) -> Self {
        self.field_id = Some(field.identifier.clone());
        self.label = Some(field.label.clone());
        self.kind = Some(field.kind.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_document(mut self, doc: &Document) -> Self {
        self.document_digest = Some(document_digest(doc));
        self
    }
}

/// Hex SHA-1 of the serialized document, live form state included.
pub fn document_digest(doc: &Document) -> String {
    let mut hasher = Sha1::new();
    hasher.update(doc.to_html().as_bytes());
    format!("{:x}", hasher.finalize())
}
