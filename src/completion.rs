//! Completion service client for summary generation
//!
//! The summary service talks to the model through the [`CompletionService`]
//! trait so tests can swap in a fake. [`AnthropicClient`] is the production
//! implementation against the Anthropic Messages API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Default timeout for completion requests (2 minutes for generation)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default Anthropic API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Model used when the configuration does not name one
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion client misconfigured: {0}")]
    Config(String),

    #[error("Failed to reach completion service: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion service returned error status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse completion response: {0}")]
    Malformed(String),
}

/// A single completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Black-box text completion. One call, one attempt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Messages API chat message
#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Messages API request body
#[derive(Debug, Clone, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

/// Messages API response body
#[derive(Debug, Clone, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Text of the first content block, empty when it is not a text block
    fn first_text(&self) -> String {
        self.content
            .first()
            .filter(|block| block.kind == "text")
            .and_then(|block| block.text.clone())
            .unwrap_or_default()
    }
}

fn build_messages_request(request: CompletionRequest) -> MessagesRequest {
    MessagesRequest {
        model: request.model,
        max_tokens: request.max_tokens,
        system: if request.system.is_empty() {
            None
        } else {
            Some(request.system)
        },
        messages: vec![Message {
            role: "user",
            content: request.prompt,
        }],
    }
}

fn parse_messages_response(body: &str) -> Result<String, CompletionError> {
    let parsed: MessagesResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Malformed(e.to_string()))?;
    debug!(
        "Completion returned {} content blocks, stop_reason={:?}",
        parsed.content.len(),
        parsed.stop_reason
    );
    Ok(parsed.first_text())
}

/// Anthropic Messages API client
#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AnthropicClient {
    /// Create a new client with URL and key validation
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.anthropic.com")
    /// * `api_key` - Secret sent in the `x-api-key` header
    /// * `connect_timeout` - TCP/TLS connect timeout
    /// * `timeout` - Overall request timeout
    pub fn new(
        base_url: &str,
        api_key: &str,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let cleaned_url = base_url.trim_end_matches('/');

        let parsed = reqwest::Url::parse(cleaned_url).map_err(|e| {
            CompletionError::Config(format!("Invalid API URL '{}': {}", cleaned_url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CompletionError::Config(format!(
                "API URL must use http or https scheme, got: {}",
                parsed.scheme()
            )));
        }

        // Reject URLs with credentials
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(CompletionError::Config(
                "API URL must not contain credentials".to_string(),
            ));
        }

        if api_key.trim().is_empty() {
            return Err(CompletionError::Config("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("AnthropicClient created for {}", cleaned_url);

        Ok(Self {
            client,
            base_url: cleaned_url.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, CompletionError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| CompletionError::Config("API key is not a valid header value".to_string()))?;
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(
            "Completing with model {} at {} (prompt {} chars, max_tokens {})",
            request.model,
            url,
            request.prompt.len(),
            request.max_tokens
        );

        let body = build_messages_request(request);
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("Completion request failed: {} - {}", status, text);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = parse_messages_response(&text)?;
        info!("Completion succeeded ({} chars)", content.len());
        Ok(content)
    }
}
