use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FillError;

/// Free-text completion backend.
pub trait TextInference {
    fn infer_text(&self, prompt: &str) -> Result<String, FillError>;
}

// ============================================================================
// Ollama Backend
// ============================================================================

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b";

pub struct OllamaBackend {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaBackend {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }
}

impl TextInference for OllamaBackend {
    fn infer_text(&self, prompt: &str) -> Result<String, FillError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "requesting value mapping");

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| FillError::Acquisition(format!("Ollama request failed: {}", e)))?;

        let ollama_response: OllamaResponse = response
            .json()
            .map_err(|e| FillError::Acquisition(format!("Ollama response unreadable: {}", e)))?;
        Ok(ollama_response.response)
    }
}

// ============================================================================
// Mock Backend (for testing without Ollama)
// ============================================================================

/// Returns a canned response for every prompt.
pub struct MockTextInference {
    pub response: String,
}

impl MockTextInference {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl TextInference for MockTextInference {
    fn infer_text(&self, _prompt: &str) -> Result<String, FillError> {
        Ok(self.response.clone())
    }
}
