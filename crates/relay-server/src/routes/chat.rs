use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use relay::{
    errors::BackendError,
    prompt_template::{structured_answer_prompt, PromptError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Deserialize, Serialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("No message provided")]
    MissingMessage,

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    Prompt(#[from] PromptError),

    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl ChatError {
    fn status(&self) -> StatusCode {
        match self {
            ChatError::MissingMessage | ChatError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ChatError::Prompt(_) | ChatError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// Relay one user message to the model and return the whole answer at once
async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected chat request body: {}", rejection.body_text());
        ChatError::InvalidBody(rejection.body_text())
    })?;

    let message = match request.message {
        Some(message) if !message.is_empty() => message,
        _ => {
            tracing::warn!("Chat request without a message");
            return Err(ChatError::MissingMessage);
        }
    };

    let prompt = structured_answer_prompt(&message)?;

    let response = state.provider.complete(&prompt).await.map_err(|e| {
        tracing::error!("Backend call failed: {}", e);
        ChatError::from(e)
    })?;

    Ok(Json(ChatResponse { response }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use relay::errors::BackendResult;
    use relay::providers::{
        base::Provider, configs::OllamaProviderConfig, ollama::OllamaProvider,
        utils::NO_RESPONSE_FALLBACK,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Clone, Default)]
    struct RecordingProvider {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingProvider {
        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        async fn complete(&self, prompt: &str) -> BackendResult<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("1. **Boil** water".to_string())
        }
    }

    fn chat_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .uri("/chat")
            .method("POST")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn ollama_app(response: ResponseTemplate, timeout: Duration) -> (MockServer, Router) {
        ollama_app_expecting(response, timeout, 1).await
    }

    async fn ollama_app_expecting(
        response: ResponseTemplate,
        timeout: Duration,
        calls: u64,
    ) -> (MockServer, Router) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(response)
            .expect(calls)
            .mount(&mock_server)
            .await;

        let config = OllamaProviderConfig::new(mock_server.uri(), "gemma3").with_timeout(timeout);
        let provider = OllamaProvider::new(config).unwrap();
        (mock_server, routes(AppState::new(provider)))
    }

    #[tokio::test]
    async fn test_chat_success() {
        let provider = RecordingProvider::default();
        let app = routes(AppState::new(provider.clone()));

        let (status, body) = send(
            app,
            chat_request(json!({"message": "How do I boil an egg?"}).to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "1. **Boil** water"}));

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("User question: How do I boil an egg?\n"));
        assert!(prompts[0].starts_with("Please provide your response"));
    }

    #[tokio::test]
    async fn test_message_is_forwarded_verbatim() {
        let provider = RecordingProvider::default();
        let app = routes(AppState::new(provider.clone()));
        let message = "  {{ x }} <tag> & \"quotes\"\n second line  ";

        let (status, _) = send(app, chat_request(json!({ "message": message }).to_string())).await;

        assert_eq!(status, StatusCode::OK);
        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(message));
    }

    #[tokio::test]
    async fn test_missing_or_empty_message() {
        for body in [json!({}), json!({"message": ""}), json!({"message": null})] {
            let provider = RecordingProvider::default();
            let app = routes(AppState::new(provider.clone()));

            let (status, response) = send(app, chat_request(body.to_string())).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({"error": "No message provided"}));
            assert!(provider.prompts().is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalid_body() {
        for body in ["not json", "{\"message\": 42}", "[\"message\"]"] {
            let provider = RecordingProvider::default();
            let app = routes(AppState::new(provider.clone()));

            let (status, response) = send(app, chat_request(body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!response["error"].as_str().unwrap().is_empty());
            assert!(provider.prompts().is_empty());
        }
    }

    #[tokio::test]
    async fn test_streamed_reply_is_aggregated() {
        let body = "{\"message\":{\"content\":\"Hi \"}}\nnot json\n{\"message\":{\"content\":\"there\"}}\n";
        let (_server, app) = ollama_app(
            ResponseTemplate::new(200).set_body_string(body),
            Duration::from_secs(5),
        )
        .await;

        let (status, response) =
            send(app, chat_request(json!({"message": "greet me"}).to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({"response": "Hi there"}));
    }

    #[tokio::test]
    async fn test_empty_backend_reply_falls_back() {
        let (_server, app) = ollama_app(ResponseTemplate::new(200), Duration::from_secs(5)).await;

        let (status, response) =
            send(app, chat_request(json!({"message": "hello"}).to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({"response": NO_RESPONSE_FALLBACK}));
    }

    #[tokio::test]
    async fn test_backend_error() {
        let (_server, app) = ollama_app(ResponseTemplate::new(500), Duration::from_secs(5)).await;

        let (status, response) =
            send(app, chat_request(json!({"message": "hello"}).to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response["error"]
            .as_str()
            .unwrap()
            .contains("Server error: 500"));
        assert!(response.get("response").is_none());
    }

    #[tokio::test]
    async fn test_backend_timeout() {
        let (_server, app) = ollama_app(
            ResponseTemplate::new(200)
                .set_body_string("{\"message\":{\"content\":\"partial\"}}\n")
                .set_delay(Duration::from_secs(2)),
            Duration::from_millis(100),
        )
        .await;

        let (status, response) =
            send(app, chat_request(json!({"message": "hello"}).to_string())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = response["error"].as_str().unwrap();
        assert!(!error.is_empty());
        assert!(!error.contains("partial"));
        assert!(response.get("response").is_none());
    }

    #[tokio::test]
    async fn test_repeated_request_same_outcome() {
        let (_server, app) = ollama_app_expecting(
            ResponseTemplate::new(200).set_body_string("{\"message\":{\"content\":\"x\"}}\n"),
            Duration::from_secs(5),
            2,
        )
        .await;

        let body = json!({"message": "hi"}).to_string();
        let first = send(app.clone(), chat_request(body.clone())).await;
        let second = send(app, chat_request(body)).await;

        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(first.1, json!({"response": "x"}));
    }

    #[tokio::test]
    async fn test_repeated_failure_same_outcome() {
        let (_server, app) =
            ollama_app_expecting(ResponseTemplate::new(500), Duration::from_secs(5), 2).await;

        let body = json!({"message": "hi"}).to_string();
        let (first_status, first_body) = send(app.clone(), chat_request(body.clone())).await;
        let (second_status, second_body) = send(app, chat_request(body)).await;

        assert_eq!(first_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(second_status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(first_body, second_body);
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let provider = RecordingProvider::default();
        let app = routes(AppState::new(provider.clone()));

        let request = Request::builder()
            .uri("/chat")
            .method("POST")
            .body(Body::from(r#"{"message":"hi"}"#))
            .unwrap();
        let (status, response) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].as_str().unwrap().contains("Content-Type"));
        assert!(provider.prompts().is_empty());
    }
}
