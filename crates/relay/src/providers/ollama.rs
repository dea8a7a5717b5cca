use super::base::Provider;
use super::configs::OllamaProviderConfig;
use super::utils::aggregate_ndjson;
use crate::errors::{BackendError, BackendResult};
use crate::models::message::Message;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "gemma3";
pub const OLLAMA_TIMEOUT_SECS: u64 = 60;

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> BackendResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaProviderConfig {
        &self.config
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.host.trim_end_matches('/'))
    }

    fn build_payload(&self, prompt: &str) -> Value {
        let mut payload = json!({
            "model": self.config.model,
            "messages": [Message::user(prompt)],
        });

        let mut options = serde_json::Map::new();
        if let Some(temperature) = self.config.temperature {
            options.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(num_predict) = self.config.num_predict {
            options.insert("num_predict".to_string(), json!(num_predict));
        }
        if !options.is_empty() {
            payload["options"] = Value::Object(options);
        }

        payload
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout {
                url: url.to_string(),
                timeout: self.config.timeout,
            }
        } else {
            BackendError::Transport(err)
        }
    }

    async fn post(&self, payload: Value) -> BackendResult<String> {
        let url = self.chat_url();
        tracing::debug!(url = %url, model = %self.config.model, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        // Only 4xx/5xx are failures; anything else is read as a body
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(BackendError::from_status(status));
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(&url, e))
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> BackendResult<String> {
        let payload = self.build_payload(prompt);

        let body = match self.post(payload).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Ollama request failed: {}", e);
                return Err(e);
            }
        };

        tracing::debug!(
            records = body.lines().filter(|l| !l.trim().is_empty()).count(),
            "aggregating chat response"
        );
        Ok(aggregate_ndjson(&body))
    }
}
