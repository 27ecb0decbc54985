//! OpenAI-compatible chat completion client.
//!
//! Works with any endpoint that serves `/chat/completions` in the OpenAI
//! format (OpenAI, OpenRouter, Ollama, vLLM, llama.cpp server). The whole
//! prompt is sent as a single user message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::assistant::LanguageModel;
use crate::config::LlmConfig;
use crate::error::GenerationError;

pub struct OpenAiChatModel {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    async fn call(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending completion request");

        let mut request = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        match status {
            200 => {}
            401 | 403 => {
                return Err(GenerationError::AuthenticationFailed(
                    "invalid API key or insufficient permissions".into(),
                ))
            }
            429 => return Err(GenerationError::RateLimited),
            _ => {
                let message = response.text().await.unwrap_or_default();
                warn!(status, body = %message, "completion endpoint returned an error");
                return Err(GenerationError::Api {
                    status_code: status,
                    message,
                });
            }
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn spawn_endpoint(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn model_for(base_url: String, api_key: &str) -> OpenAiChatModel {
        OpenAiChatModel::from_config(&LlmConfig {
            base_url,
            api_key: api_key.into(),
            model: "test-model".into(),
            timeout_secs: 5,
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sends_prompt_as_single_user_message() {
        let seen: Arc<Mutex<Option<(Value, Option<String>)>>> = Arc::default();
        let captured = seen.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    *captured.lock().unwrap() = Some((body, auth));
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": "Try a frittata."}}]
                    }))
                }
            }),
        );
        let model = model_for(spawn_endpoint(router).await, "sk-test");

        let answer = model.call("PROMPT TEXT").await.unwrap();
        assert_eq!(answer, "Try a frittata.");

        let (body, auth) = seen.lock().unwrap().take().unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "PROMPT TEXT");
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    }

    #[tokio::test]
    async fn maps_status_codes_to_errors() {
        let router = Router::new()
            .route("/unauthorized/chat/completions", post(|| async { StatusCode::UNAUTHORIZED }))
            .route("/limited/chat/completions", post(|| async { StatusCode::TOO_MANY_REQUESTS }))
            .route(
                "/broken/chat/completions",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
            );
        let base = spawn_endpoint(router).await;
        let root = base.trim_end_matches("/v1");

        let err = model_for(format!("{root}/unauthorized"), "bad").call("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::AuthenticationFailed(_)));

        let err = model_for(format!("{root}/limited"), "k").call("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited));

        let err = model_for(format!("{root}/broken"), "k").call("p").await.unwrap_err();
        match err {
            GenerationError::Api { status_code, message } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let model = model_for(spawn_endpoint(router).await, "");

        let err = model.call("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyCompletion));
    }

    #[tokio::test]
    async fn unparsable_body_is_invalid_response() {
        let router = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
        let model = model_for(spawn_endpoint(router).await, "");

        let err = model.call("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        // bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let model = model_for(format!("http://{addr}/v1"), "");
        let err = model.call("p").await.unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
    }
}
