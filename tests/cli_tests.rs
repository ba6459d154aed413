use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use form_autofill::{
    RunOutcome,
    cli::{
        commands::{build_provider, format_fields, format_outcome, log_filter},
        config::{AppConfig, BrowserConfig, Cli, Commands, build_session_config, load_config},
    },
    error::FillError,
    form::{
        apply::{ApplyReport, FieldOutcome, FieldStatus},
        field_model::{FieldDescriptor, FieldKind},
    },
};

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_fill_minimal() {
    let cli = Cli::parse_from(["form-autofill", "fill", "--url", "https://example.com/form"]);
    match cli.command {
        Commands::Fill {
            target,
            context,
            provider,
            settle_ms,
            keep_open,
            headless,
            ..
        } => {
            assert_eq!(target.url.as_deref(), Some("https://example.com/form"));
            assert!(target.file.is_none());
            assert!(context.is_none());
            assert!(provider.is_none());
            assert!(settle_ms.is_none());
            assert!(headless.is_none());
            assert!(keep_open);
        }
        _ => panic!("Expected Fill command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_fill_all_args() {
    let cli = Cli::parse_from([
        "form-autofill",
        "-vv",
        "fill",
        "--file",
        "form.html",
        "--context",
        "I am a vegetarian",
        "--provider",
        "file",
        "--answers",
        "answers.yaml",
        "--settle-ms",
        "100",
        "--field-delay-ms",
        "0",
        "--headless",
        "true",
        "--keep-open",
        "false",
        "--output",
        "filled.html",
        "--trace",
        "trace.jsonl",
        "--ollama-model",
        "llama3",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.ollama_model.as_deref(), Some("llama3"));
    match cli.command {
        Commands::Fill {
            target,
            context,
            provider,
            answers,
            settle_ms,
            field_delay_ms,
            headless,
            keep_open,
            output,
            trace,
        } => {
            assert_eq!(target.file, Some(PathBuf::from("form.html")));
            assert_eq!(context.as_deref(), Some("I am a vegetarian"));
            assert_eq!(provider.as_deref(), Some("file"));
            assert_eq!(answers, Some(PathBuf::from("answers.yaml")));
            assert_eq!(settle_ms, Some(100));
            assert_eq!(field_delay_ms, Some(0));
            assert_eq!(headless, Some(true));
            assert!(!keep_open);
            assert_eq!(output, Some(PathBuf::from("filled.html")));
            assert_eq!(trace.as_deref(), Some("trace.jsonl"));
        }
        _ => panic!("Expected Fill command"),
    }
}

#[test]
fn cli_requires_exactly_one_target() {
    assert!(Cli::try_parse_from(["form-autofill", "fill"]).is_err());
    assert!(
        Cli::try_parse_from([
            "form-autofill",
            "discover",
            "--url",
            "https://a.test",
            "--file",
            "a.html"
        ])
        .is_err()
    );
}

#[test]
fn cli_parse_discover_defaults() {
    let cli = Cli::parse_from(["form-autofill", "discover", "--file", "form.html"]);
    match cli.command {
        Commands::Discover {
            target,
            format,
            settle_ms,
            headless,
        } => {
            assert_eq!(target.file, Some(PathBuf::from("form.html")));
            assert_eq!(format, "text");
            assert!(settle_ms.is_none());
            assert!(headless.is_none());
        }
        _ => panic!("Expected Discover command"),
    }
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.run.settle_ms, 3000);
    assert_eq!(config.run.field_delay_ms, 500);
    assert_eq!(config.run.provider, "llm");
    assert_eq!(config.browser.node, "node");
    assert!(!config.browser.headless);
    assert!(config.ollama.endpoint.is_none());
}

#[test]
fn config_missing_file_uses_defaults() {
    let config = load_config(Some("/nonexistent/form-autofill.yaml"));
    assert_eq!(config.run.settle_ms, 3000);
}

#[test]
fn config_partial_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "run:\n  settle_ms: 800\n  provider: heuristic\nbrowser:\n  headless: true\nollama:\n  model: llama3"
    )
    .unwrap();

    let config = load_config(file.path().to_str());
    assert_eq!(config.run.settle_ms, 800);
    assert_eq!(config.run.field_delay_ms, 500);
    assert_eq!(config.run.provider, "heuristic");
    assert!(config.browser.headless);
    assert_eq!(config.ollama.model.as_deref(), Some("llama3"));
}

#[test]
fn config_malformed_yaml_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "run: [this is: not valid").unwrap();

    let config = load_config(file.path().to_str());
    assert_eq!(config.run.provider, "llm");
}

#[test]
fn session_config_cli_headless_wins() {
    let browser = BrowserConfig {
        node: "/usr/local/bin/node".into(),
        node_modules: Some("/opt/pw/node_modules".into()),
        headless: true,
    };
    let session = build_session_config(&browser, Some(false));
    assert!(!session.headless);
    assert_eq!(session.node, "/usr/local/bin/node");
    assert_eq!(session.node_modules, Some(PathBuf::from("/opt/pw/node_modules")));

    assert!(build_session_config(&browser, None).headless);
}

// ============================================================================
// Command helpers
// ============================================================================

#[test]
fn provider_names() {
    assert!(build_provider("llm", None, None, None).is_ok());
    assert!(build_provider("heuristic", None, None, None).is_ok());
    assert!(build_provider("file", Some(std::path::Path::new("a.yaml")), None, None).is_ok());

    assert!(matches!(
        build_provider("file", None, None, None),
        Err(FillError::Config(_))
    ));
    assert!(matches!(
        build_provider("oracle", None, None, None),
        Err(FillError::Config(_))
    ));
}

#[test]
fn verbosity_maps_to_filter() {
    assert_eq!(log_filter(0), "warn");
    assert_eq!(log_filter(1), "info");
    assert_eq!(log_filter(2), "debug");
    assert_eq!(log_filter(9), "trace");
}

#[test]
fn field_listing_and_run_summary() {
    let fields = vec![FieldDescriptor {
        kind: FieldKind::SingleChoice,
        label: "Favorite color".into(),
        identifier: "q1_radio0".into(),
        required: true,
        options: vec!["Red".into(), "Green".into()],
    }];
    let listing = format_fields(&fields);
    assert!(listing.contains("q1_radio0"));
    assert!(listing.contains("[single-choice] Favorite color *"));
    assert!(listing.contains("(Red | Green)"));
    assert_eq!(format_fields(&[]), "No fields discovered.");

    let report = ApplyReport {
        outcomes: vec![FieldOutcome {
            identifier: "q1_radio0".into(),
            label: "Favorite color".into(),
            kind: FieldKind::SingleChoice,
            status: FieldStatus::Skipped("no value assigned".into()),
        }],
    };
    let summary = format_outcome(&RunOutcome::Completed { fields, report });
    assert!(summary.contains("- Favorite color (q1_radio0): skipped: no value assigned"));
    assert!(summary.contains("0 applied, 1 skipped, 0 failed"));
    assert!(format_outcome(&RunOutcome::NoFields).contains("nothing was filled"));
}
