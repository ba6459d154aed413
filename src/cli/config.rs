use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::browser::session::SessionConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "Discover the fields of a web form and fill them in"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// Where the document comes from: a live URL or a local HTML file.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// URL to open in the browser
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub url: Option<String>,

    /// Local HTML file, processed offline without a browser
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover fields, obtain values, and fill the form
    Fill {
        #[command(flatten)]
        target: Target,

        /// Free-text hint passed to the value provider
        #[arg(long)]
        context: Option<String>,

        /// Value provider: llm, heuristic or file
        #[arg(long)]
        provider: Option<String>,

        /// Answers file (YAML or JSON) for the file provider
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Wait after navigation before discovery, in ms
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Pause between field applications, in ms
        #[arg(long)]
        field_delay_ms: Option<u64>,

        /// Run the browser without a window
        #[arg(long, action = clap::ArgAction::Set)]
        headless: Option<bool>,

        /// Keep the browser open for inspection until Enter is pressed
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        keep_open: bool,

        /// Write the filled document here (offline --file runs only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append JSONL trace events to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Discover fields and print them without filling anything
    Discover {
        #[command(flatten)]
        target: Target,

        /// Output format: text, json, yaml
        #[arg(long, default_value = "text")]
        format: String,

        /// Wait after navigation before discovery, in ms
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Run the browser without a window
        #[arg(long, action = clap::ArgAction::Set)]
        headless: Option<bool>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_field_delay_ms")]
    pub field_delay_ms: u64,

    #[serde(default = "default_provider")]
    pub provider: String,

    pub trace: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            field_delay_ms: default_field_delay_ms(),
            provider: default_provider(),
            trace: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_node")]
    pub node: String,

    pub node_modules: Option<String>,

    #[serde(default)]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            node: default_node(),
            node_modules: None,
            headless: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// Serde default helpers
fn default_settle_ms() -> u64 { crate::DEFAULT_SETTLE_MS }
fn default_field_delay_ms() -> u64 { 500 }
fn default_provider() -> String { "llm".to_string() }
fn default_node() -> String { "node".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "malformed config file, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Build the browser launch settings; a CLI `--headless` wins over the file.
pub fn build_session_config(browser: &BrowserConfig, headless: Option<bool>) -> SessionConfig {
    SessionConfig {
        node: browser.node.clone(),
        node_modules: browser.node_modules.as_ref().map(PathBuf::from),
        headless: headless.unwrap_or(browser.headless),
    }
}
