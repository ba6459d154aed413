use serde::Serialize;
use tracing::{debug, info, warn};

use crate::browser::page::Page;
use crate::dom::controls::{ControlKind, controls_of};
use crate::dom::document::{Document, ElementPath, NodeId};
use crate::error::FillError;
use crate::form::container::Layout;
use crate::form::field_model::{FieldDescriptor, FieldKind, FieldValue, ValueAssignment};
use crate::form::label::choice_text;
use crate::form::matcher::{best_match, match_labels};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{TraceEvent, TracePhase};

/// Pacing between successive field applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    pub field_delay_ms: u64,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self { field_delay_ms: 500 }
    }
}

/// What happened to one descriptor during the application pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum FieldStatus {
    /// The control was mutated.
    Applied,
    /// The control already held the desired state; nothing dispatched.
    Unchanged,
    /// Not attempted: no value, or a value of the wrong shape.
    Skipped(String),
    /// Attempted and failed; the run carried on.
    Failed(String),
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldStatus::Applied => write!(f, "applied"),
            FieldStatus::Unchanged => write!(f, "unchanged"),
            FieldStatus::Skipped(reason) => write!(f, "skipped: {}", reason),
            FieldStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldOutcome {
    pub identifier: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(flatten)]
    pub status: FieldStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<FieldOutcome>,
}

impl ApplyReport {
    pub fn outcome(&self, identifier: &str) -> Option<&FieldOutcome> {
        self.outcomes.iter().find(|o| o.identifier == identifier)
    }

    fn count(&self, pred: impl Fn(&FieldStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Applied | FieldStatus::Unchanged))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, FieldStatus::Failed(_)))
    }
}

/// Apply every assigned value, one field at a time, in descriptor order.
///
/// Each field re-resolves its control from a fresh snapshot. Failures are
/// recorded per field and never stop the pass.
pub fn apply_assignments(
    page: &mut dyn Page,
    fields: &[FieldDescriptor],
    values: &ValueAssignment,
    options: &ApplyOptions,
    tracer: &TraceLogger,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    let mut attempted = 0usize;

    for field in fields {
        let status = match values.get(&field.label) {
            None => FieldStatus::Skipped("no value assigned".into()),
            Some(value) => {
                if attempted > 0 && options.field_delay_ms > 0 {
                    if let Err(e) = page.settle(options.field_delay_ms) {
                        warn!(error = %e, "pacing delay failed");
                    }
                }
                attempted += 1;

                match apply_field(page, field, value, tracer) {
                    Ok(status) => status,
                    Err(e) => {
                        warn!(field = %field.identifier, label = %field.label, error = %e, "field application failed");
                        FieldStatus::Failed(e.to_string())
                    }
                }
            }
        };

        match &status {
            FieldStatus::Applied => info!(field = %field.identifier, label = %field.label, "applied"),
            FieldStatus::Skipped(reason) => debug!(field = %field.identifier, label = %field.label, reason = %reason, "skipped"),
            _ => debug!(field = %field.identifier, label = %field.label, status = %status, "field done"),
        }

        tracer.log(
            &TraceEvent::now(TracePhase::Apply)
                .with_field(field)
                .with_outcome(&status),
        );

        report.outcomes.push(FieldOutcome {
            identifier: field.identifier.clone(),
            label: field.label.clone(),
            kind: field.kind,
            status,
        });
    }

    report
}

/// Re-resolve one descriptor's control on a fresh snapshot and apply `value`.
pub fn apply_field(
    page: &mut dyn Page,
    field: &FieldDescriptor,
    value: &FieldValue,
    tracer: &TraceLogger,
) -> Result<FieldStatus, FillError> {
    let doc = page.snapshot()?;
    if tracer.is_enabled() {
        tracer.log(
            &TraceEvent::now(TracePhase::Apply)
                .with_field(field)
                .with_detail("resolving")
                .with_document(&doc),
        );
    }
    let layout = Layout::of(&doc);

    match field.kind {
        FieldKind::SingleLineText | FieldKind::MultiLineText => {
            let Some(text) = value.as_text() else {
                return Ok(FieldStatus::Skipped(format!("{} expects a string", field.kind)));
            };
            let control_kind = if field.kind == FieldKind::SingleLineText {
                ControlKind::SingleLineText
            } else {
                ControlKind::MultiLineText
            };
            let target = resolve_by_label(&doc, &layout, control_kind, &field.label)
                .ok_or_else(|| FillError::field(&field.label, "no matching text control"))?;
            let path = path_for(&doc, target, field)?;
            page.set_text(&path, text)?;
            Ok(FieldStatus::Applied)
        }

        FieldKind::SingleChoice => {
            let Some(choice) = value.as_text() else {
                return Ok(FieldStatus::Skipped("single-choice expects one option".into()));
            };
            if !field.options.iter().any(|o| o == choice) {
                return Ok(FieldStatus::Skipped(format!("'{}' is not one of the options", choice)));
            }

            let radios = controls_of(&doc, ControlKind::Radio);
            let target = best_match(radios.into_iter().filter_map(|radio| {
                let own = match_labels(&choice_text(&doc, radio), choice)?;
                let group = match_labels(&layout.field_label(&doc, radio), &field.label)?;
                Some((radio, own.min(group)))
            }))
            .ok_or_else(|| FillError::field(&field.label, format!("no radio for '{}'", choice)))?;

            if doc.is_checked(target) {
                return Ok(FieldStatus::Unchanged);
            }
            let path = path_for(&doc, target, field)?;
            page.activate(&path)?;
            Ok(FieldStatus::Applied)
        }

        FieldKind::MultiChoice => {
            let Some(desired) = value.as_flag() else {
                return Ok(FieldStatus::Skipped("multi-choice expects a boolean".into()));
            };
            let target = resolve_by_label(&doc, &layout, ControlKind::Checkbox, &field.label)
                .ok_or_else(|| FillError::field(&field.label, "no matching checkbox"))?;

            if doc.is_checked(target) == desired {
                return Ok(FieldStatus::Unchanged);
            }
            let path = path_for(&doc, target, field)?;
            page.activate(&path)?;
            Ok(FieldStatus::Applied)
        }

        FieldKind::ChoiceList => {
            let Some(choice) = value.as_text() else {
                return Ok(FieldStatus::Skipped("choice-list expects one option".into()));
            };
            if !field.options.iter().any(|o| o == choice) {
                return Ok(FieldStatus::Skipped(format!("'{}' is not one of the options", choice)));
            }
            let target = resolve_by_label(&doc, &layout, ControlKind::Select, &field.label)
                .ok_or_else(|| FillError::field(&field.label, "no matching dropdown"))?;
            let path = path_for(&doc, target, field)?;
            page.select_option(&path, choice)?;
            Ok(FieldStatus::Applied)
        }
    }
}

/// First control of `kind` (document order) whose discovery label matches
/// `label`, preferring exact matches.
pub fn resolve_by_label(
    doc: &Document,
    layout: &Layout,
    kind: ControlKind,
    label: &str,
) -> Option<NodeId> {
    best_match(
        controls_of(doc, kind)
            .into_iter()
            .filter_map(|c| match_labels(&layout.field_label(doc, c), label).map(|q| (c, q))),
    )
}

fn path_for(
    doc: &Document,
    target: NodeId,
    field: &FieldDescriptor,
) -> Result<ElementPath, FillError> {
    doc.path_of(target)
        .ok_or_else(|| FillError::field(&field.label, "resolved control has no address"))
}
