use tracing::{info, warn};

use crate::{
    browser::page::Page,
    error::FillError,
    form::{
        apply::{ApplyOptions, ApplyReport, apply_assignments},
        discovery::discover_fields,
        field_model::FieldDescriptor,
    },
    mapping::provider::ValueMappingProvider,
    trace::{
        logger::TraceLogger,
        trace::{TraceEvent, TracePhase},
    },
};

pub mod browser;
pub mod cli;
pub mod dom;
pub mod error;
pub mod form;
pub mod mapping;
pub mod trace;

/// Default wait after navigation before discovery starts.
pub const DEFAULT_SETTLE_MS: u64 = 3000;

const ZERO_FIELDS_GUIDANCE: &str = "No fillable fields were discovered. The page may still be \
rendering (raise --settle-ms), the form may live in an iframe or behind a login, or its \
controls may not be native inputs.";

/// One fill run: where to go and how to pace it.
#[derive(Debug, Clone)]
pub struct FillRequest {
    pub url: String,
    pub context: Option<String>,
    pub settle_ms: u64,
    pub apply: ApplyOptions,
}

impl FillRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            context: None,
            settle_ms: DEFAULT_SETTLE_MS,
            apply: ApplyOptions::default(),
        }
    }

    pub fn with_context(mut self, context: Option<&str>) -> Self {
        self.context = context.map(str::to_string);
        self
    }

    pub fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    pub fn with_field_delay_ms(mut self, ms: u64) -> Self {
        self.apply.field_delay_ms = ms;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Discovery found nothing; the value mapping was never requested.
    NoFields,
    Completed {
        fields: Vec<FieldDescriptor>,
        report: ApplyReport,
    },
}

/// Navigate, wait for late content, then discover the page's fields.
pub fn discover_page(
    page: &mut dyn Page,
    url: &str,
    settle_ms: u64,
    tracer: &TraceLogger,
) -> Result<Vec<FieldDescriptor>, FillError> {
    page.navigate(url)?;
    if settle_ms > 0 {
        page.settle(settle_ms)?;
    }

    let doc = page.snapshot()?;
    let fields = discover_fields(&doc);
    info!(url, fields = fields.len(), "discovery complete");

    if tracer.is_enabled() {
        for field in &fields {
            tracer.log(
                &TraceEvent::now(TracePhase::Discovery)
                    .with_field(field)
                    .with_document(&doc),
            );
        }
    }

    Ok(fields)
}

/// Discovery → value mapping → application, in that order.
///
/// Only fatal errors are returned; per-field failures end up in the report.
/// The page is left open in whatever state the run reached.
pub fn run_fill(
    page: &mut dyn Page,
    request: &FillRequest,
    provider: &dyn ValueMappingProvider,
    tracer: &TraceLogger,
) -> Result<RunOutcome, FillError> {
    let fields = discover_page(page, &request.url, request.settle_ms, tracer)?;

    if fields.is_empty() {
        warn!(url = %request.url, "{}", ZERO_FIELDS_GUIDANCE);
        return Ok(RunOutcome::NoFields);
    }

    let values = provider.provide(&fields, request.context.as_deref())?;
    tracer.log(
        &TraceEvent::now(TracePhase::Mapping)
            .with_outcome("received")
            .with_detail(format!("{} values", values.len())),
    );

    let report = apply_assignments(page, &fields, &values, &request.apply, tracer);
    info!(
        applied = report.applied(),
        skipped = report.skipped(),
        failed = report.failed(),
        "application pass complete"
    );

    Ok(RunOutcome::Completed { fields, report })
}
