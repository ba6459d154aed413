use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::browser::session::BrowserSession;
use crate::browser::static_page::StaticPage;
use crate::cli::config::{AppConfig, Target, build_session_config};
use crate::error::FillError;
use crate::form::apply::FieldStatus;
use crate::form::field_model::FieldDescriptor;
use crate::mapping::inference::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL, OllamaBackend};
use crate::mapping::provider::{
    FileMappingProvider, HeuristicMappingProvider, LlmMappingProvider, ValueMappingProvider,
};
use crate::trace::logger::TraceLogger;
use crate::{FillRequest, RunOutcome, discover_page, run_fill};

/// Fill options after merging CLI flags over the config file.
#[derive(Debug, Clone)]
pub struct FillArgs {
    pub target: Target,
    pub context: Option<String>,
    pub provider: Option<String>,
    pub answers: Option<PathBuf>,
    pub settle_ms: Option<u64>,
    pub field_delay_ms: Option<u64>,
    pub headless: Option<bool>,
    pub keep_open: bool,
    pub output: Option<PathBuf>,
    pub trace: Option<String>,
}

// ============================================================================
// fill subcommand
// ============================================================================

pub fn cmd_fill(
    args: &FillArgs,
    config: &AppConfig,
    ollama_endpoint: Option<&str>,
    ollama_model: Option<&str>,
) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let provider_name = args.provider.as_deref().unwrap_or(&config.run.provider);
    let provider = build_provider(
        provider_name,
        args.answers.as_deref(),
        ollama_endpoint,
        ollama_model,
    )?;

    let tracer = match args.trace.as_deref().or(config.run.trace.as_deref()) {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    let settle_ms = args.settle_ms.unwrap_or(config.run.settle_ms);
    let field_delay_ms = args.field_delay_ms.unwrap_or(config.run.field_delay_ms);

    if let Some(path) = &args.target.file {
        // Offline documents are static: no settle, no pacing.
        let mut page = StaticPage::open(path)?;
        let url = page.url().unwrap_or_default().to_string();
        let request = FillRequest::new(&url)
            .with_context(args.context.as_deref())
            .with_settle_ms(0)
            .with_field_delay_ms(0);

        let outcome = run_fill(&mut page, &request, provider.as_ref(), &tracer)?;
        print!("{}", format_outcome(&outcome));

        if let Some(out) = &args.output {
            std::fs::write(out, page.to_html())?;
            info!(path = %out.display(), "filled document written");
        }
        return Ok(outcome);
    }

    let url = args
        .target
        .url
        .as_deref()
        .ok_or_else(|| FillError::Config("either --url or --file is required".into()))?;
    let request = FillRequest::new(url)
        .with_context(args.context.as_deref())
        .with_settle_ms(settle_ms)
        .with_field_delay_ms(field_delay_ms);

    let session_config = build_session_config(&config.browser, args.headless);
    let mut session = BrowserSession::launch(&session_config)?;

    let result = run_fill(&mut session, &request, provider.as_ref(), &tracer);
    match &result {
        Ok(outcome) => print!("{}", format_outcome(outcome)),
        Err(e) => eprintln!("Run aborted: {}", e),
    }

    if args.keep_open {
        eprintln!("Browser left open for inspection. Press Enter to close it.");
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
    }
    session.quit()?;

    Ok(result?)
}

// ============================================================================
// discover subcommand
// ============================================================================

pub fn cmd_discover(
    target: &Target,
    format: &str,
    settle_ms: Option<u64>,
    headless: Option<bool>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let tracer = TraceLogger::disabled();

    let fields = if let Some(path) = &target.file {
        let mut page = StaticPage::open(path)?;
        let url = page.url().unwrap_or_default().to_string();
        discover_page(&mut page, &url, 0, &tracer)?
    } else {
        let url = target
            .url
            .as_deref()
            .ok_or_else(|| FillError::Config("either --url or --file is required".into()))?;
        let mut session = BrowserSession::launch(&build_session_config(&config.browser, headless))?;
        let fields = discover_page(
            &mut session,
            url,
            settle_ms.unwrap_or(config.run.settle_ms),
            &tracer,
        )?;
        session.quit()?;
        fields
    };

    let output = match format {
        "json" => serde_json::to_string_pretty(&fields)?,
        "yaml" => serde_yaml::to_string(&fields)?,
        _ => format_fields(&fields),
    };
    println!("{}", output);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the value provider by name.
pub fn build_provider(
    name: &str,
    answers: Option<&Path>,
    ollama_endpoint: Option<&str>,
    ollama_model: Option<&str>,
) -> Result<Box<dyn ValueMappingProvider>, FillError> {
    match name {
        "llm" => {
            let endpoint = ollama_endpoint.unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let model = ollama_model.unwrap_or(DEFAULT_OLLAMA_MODEL);
            let backend = OllamaBackend::new(endpoint, model);
            Ok(Box::new(LlmMappingProvider::new(Box::new(backend))))
        }
        "heuristic" => Ok(Box::new(HeuristicMappingProvider)),
        "file" => {
            let path = answers.ok_or_else(|| {
                FillError::Config("--provider file needs --answers <path>".into())
            })?;
            Ok(Box::new(FileMappingProvider::new(path)))
        }
        other => Err(FillError::Config(format!(
            "unknown provider '{}' (expected llm, heuristic or file)",
            other
        ))),
    }
}

/// `tracing` filter directive for a `-v` count.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// One line per field: identifier, kind, label, then options.
pub fn format_fields(fields: &[FieldDescriptor]) -> String {
    if fields.is_empty() {
        return "No fields discovered.".to_string();
    }
    let mut out = format!("Discovered {} fields:\n", fields.len());
    for f in fields {
        out.push_str(&format!("  {:<16} [{}] {}", f.identifier, f.kind, f.label));
        if f.required {
            out.push_str(" *");
        }
        if !f.options.is_empty() {
            out.push_str(&format!("  ({})", f.options.join(" | ")));
        }
        out.push('\n');
    }
    out
}

/// Console summary of a run.
pub fn format_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::NoFields => "No fillable fields found; nothing was filled.\n".to_string(),
        RunOutcome::Completed { report, .. } => {
            let mut out = String::new();
            for o in &report.outcomes {
                let mark = match o.status {
                    FieldStatus::Applied => "+",
                    FieldStatus::Unchanged => "=",
                    FieldStatus::Skipped(_) => "-",
                    FieldStatus::Failed(_) => "!",
                };
                out.push_str(&format!("  {} {} ({}): {}\n", mark, o.label, o.identifier, o.status));
            }
            out.push_str(&format!(
                "\n{} applied, {} skipped, {} failed\n",
                report.applied(),
                report.skipped(),
                report.failed()
            ));
            out
        }
    }
}
