use std::time::Duration;

use super::ollama::{OLLAMA_HOST, OLLAMA_MODEL, OLLAMA_TIMEOUT_SECS};

/// Where and how to reach the Ollama chat endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub num_predict: Option<i32>,
}

impl OllamaProviderConfig {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OllamaProviderConfig {
    fn default() -> Self {
        Self {
            host: OLLAMA_HOST.to_string(),
            model: OLLAMA_MODEL.to_string(),
            timeout: Duration::from_secs(OLLAMA_TIMEOUT_SECS),
            temperature: None,
            num_predict: None,
        }
    }
}
