use thiserror::Error;

#[derive(Debug, Error)]
pub enum FillError {
    /// Document session (or the value-mapping backend) is not ready
    #[error("Document session not ready: {0}")]
    Acquisition(String),

    /// Value-mapping output held no parseable JSON object
    #[error("No structured object in value mapping output: {0}")]
    Extraction(String),

    /// One control could not be located or mutated
    #[error("Could not apply field '{label}': {reason}")]
    FieldApplication { label: String, reason: String },

    /// Node.js subprocess failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the session process failed
    #[error("Session I/O error: {0}")]
    SessionIO(String),

    /// Session process answered a command with an error
    #[error("Session command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Bad CLI/config combination or unreadable input file
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FillError {
    pub fn field(label: &str, reason: impl ToString) -> Self {
        FillError::FieldApplication {
            label: label.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts a whole run. Per-field failures are absorbed.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FillError::FieldApplication { .. })
    }
}
