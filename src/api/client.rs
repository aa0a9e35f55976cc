use crate::api::response::extract_content;
use crate::api::RequestBody;
use crate::error::{AskDbError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Anything that can answer an OpenAI-shaped chat completion request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one request and return the raw response body.
    async fn chat(&self, request: &RequestBody) -> Result<Value>;
}

/// Chat backend for any OpenAI-compatible endpoint (Ollama's `/v1` included).
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiCompatClient {
    pub fn new(endpoint: &str, api_key: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                    AskDbError::Config(format!("Invalid authorization header: {}", e))
                })?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: normalize_endpoint(endpoint),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for OpenAiCompatClient {
    async fn chat(&self, request: &RequestBody) -> Result<Value> {
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            tools = request.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AskDbError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        debug!(response = %body, "Raw chat response");
        Ok(serde_json::from_str(&body)?)
    }
}

/// Plain free-text completion: one user message, no tools.
pub async fn complete(backend: &dyn ChatBackend, model: &str, prompt: &str) -> Result<String> {
    let response = backend.chat(&RequestBody::completion(model, prompt)).await?;
    extract_content(&response)?
        .ok_or_else(|| AskDbError::Other("No content in completion response".to_string()))
}

/// Turn a base URL into a full chat-completions URL.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/chat/completions", endpoint)
    } else if endpoint.ends_with("/v1/") {
        format!("{}chat/completions", endpoint)
    } else {
        format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
    }
}
