use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::browser::page::Page;
use crate::dom::document::{Document, ElementPath};
use crate::dom::html::SnapshotNode;
use crate::error::FillError;

const SESSION_SCRIPT: &str = include_str!("session_server.js");
const SESSION_SCRIPT_NAME: &str = "form_autofill_session.js";

/// Request sent to the session script over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Snapshot {
        cmd: &'static str,
    },
    SetText {
        cmd: &'static str,
        path: Vec<usize>,
        value: String,
    },
    Activate {
        cmd: &'static str,
        path: Vec<usize>,
    },
    SelectOption {
        cmd: &'static str,
        path: Vec<usize>,
        option: String,
    },
    Wait {
        cmd: &'static str,
        duration_ms: u64,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn snapshot() -> Self {
        BrowserRequest::Snapshot { cmd: "snapshot" }
    }

    pub fn set_text(target: &ElementPath, value: &str) -> Self {
        BrowserRequest::SetText {
            cmd: "set_text",
            path: target.0.clone(),
            value: value.to_string(),
        }
    }

    pub fn activate(target: &ElementPath) -> Self {
        BrowserRequest::Activate {
            cmd: "activate",
            path: target.0.clone(),
        }
    }

    pub fn select_option(target: &ElementPath, option: &str) -> Self {
        BrowserRequest::SelectOption {
            cmd: "select_option",
            path: target.0.clone(),
            option: option.to_string(),
        }
    }

    pub fn wait(duration_ms: u64) -> Self {
        BrowserRequest::Wait {
            cmd: "wait",
            duration_ms,
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response read from the session script's stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// How to launch the session process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub node: String,
    /// Directory holding the `playwright` package; exported as `NODE_PATH`.
    pub node_modules: Option<PathBuf>,
    pub headless: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            node: "node".to_string(),
            node_modules: None,
            headless: false,
        }
    }
}

/// A persistent browser session backed by a Node.js Playwright script.
///
/// Commands are sent as NDJSON over stdin, responses read from stdout.
/// The browser stays open until `quit` or drop.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Write the embedded script to the temp dir, spawn it and wait for
    /// its ready line.
    pub fn launch(config: &SessionConfig) -> Result<Self, FillError> {
        let script_path = std::env::temp_dir().join(SESSION_SCRIPT_NAME);
        std::fs::write(&script_path, SESSION_SCRIPT).map_err(|e| {
            FillError::Acquisition(format!(
                "could not write {}: {}",
                script_path.display(),
                e
            ))
        })?;

        let mut command = Command::new(&config.node);
        command
            .arg(&script_path)
            .env("FORM_AUTOFILL_HEADLESS", if config.headless { "1" } else { "0" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        let node_modules = config
            .node_modules
            .clone()
            .or_else(|| std::env::current_dir().ok().map(|d| d.join("node_modules")));
        if let Some(dir) = node_modules {
            command.env("NODE_PATH", dir);
        }

        let mut child = command.spawn().map_err(|e| FillError::SubprocessSpawn {
            script: SESSION_SCRIPT_NAME.into(),
            source: e,
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            FillError::SessionIO("Failed to capture stdin of the session script".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            FillError::SessionIO("Failed to capture stdout of the session script".into())
        })?;

        let mut reader = BufReader::new(stdout);

        if let Err(e) = await_ready(&mut reader) {
            // The process may be alive with a browser attached.
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        info!(headless = config.headless, "browser session ready");

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            current_url: None,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, FillError> {
        let json = serde_json::to_string(request).map_err(|e| FillError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            FillError::SessionIO(format!("Failed to write to session stdin: {}", e))
        })?;

        self.stdin
            .flush()
            .map_err(|e| FillError::SessionIO(format!("Failed to flush session stdin: {}", e)))?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            FillError::SessionIO(format!("Failed to read from session stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(FillError::SessionIO(
                "Empty response from the session script (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| FillError::JsonParse {
            context: "session response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command_name: &str,
    ) -> Result<BrowserResponse, FillError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(FillError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        debug!(command = command_name, "session command ok");
        Ok(response)
    }

    /// Last URL navigated to (cached, no browser call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<(), FillError> {
        let request = BrowserRequest::quit();
        // Best-effort quit: the process may already be gone
        let _ = self.send(&request);
        let _ = self.child.wait();
        Ok(())
    }
}

/// Read and check the ready line the session script prints first.
pub fn await_ready(reader: &mut impl BufRead) -> Result<(), FillError> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| FillError::Acquisition(format!("Failed to read ready signal: {}", e)))?;

    let response: BrowserResponse = serde_json::from_str(line.trim()).map_err(|e| {
        FillError::Acquisition(format!("Malformed ready signal '{}': {}", line.trim(), e))
    })?;

    if !response.ok || response.ready != Some(true) {
        return Err(FillError::Acquisition(
            response
                .error
                .unwrap_or_else(|| "Did not receive ready signal from the session script".into()),
        ));
    }
    Ok(())
}

impl Page for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), FillError> {
        self.send_ok(&BrowserRequest::navigate(url), "navigate")
            .map_err(|e| FillError::Acquisition(format!("navigation to {} failed: {}", url, e)))?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    fn snapshot(&mut self) -> Result<Document, FillError> {
        let response = self.send_ok(&BrowserRequest::snapshot(), "snapshot")?;
        let data = response.data.ok_or_else(|| FillError::SessionProtocol {
            command: "snapshot".into(),
            error: "No data in snapshot response".into(),
        })?;
        let nodes: Vec<SnapshotNode> =
            serde_json::from_value(data).map_err(|e| FillError::JsonParse {
                context: "document snapshot".into(),
                source: e,
            })?;
        Ok(Document::from_snapshot(&nodes))
    }

    fn set_text(&mut self, target: &ElementPath, value: &str) -> Result<(), FillError> {
        self.send_ok(&BrowserRequest::set_text(target, value), "set_text")?;
        Ok(())
    }

    fn activate(&mut self, target: &ElementPath) -> Result<(), FillError> {
        self.send_ok(&BrowserRequest::activate(target), "activate")?;
        Ok(())
    }

    fn select_option(&mut self, target: &ElementPath, option_text: &str) -> Result<(), FillError> {
        self.send_ok(&BrowserRequest::select_option(target, option_text), "select_option")?;
        Ok(())
    }

    fn settle(&mut self, ms: u64) -> Result<(), FillError> {
        self.send_ok(&BrowserRequest::wait(ms), "wait")?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}
