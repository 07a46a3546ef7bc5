//! Anthropic Messages API client.
//!
//! Used for receipt image reading and for tool-assisted cash flow
//! forecasts. Services talk to the model through [`MessagesApi`] so that
//! they can run against a scripted model in tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cashflow::ai::{AiClient, MessageRequest, MessagesApi};
//!
//! let client = AiClient::from_env()?;
//! let request = MessageRequest::new(1024, vec![MessageRequest::user_text("Hello")]);
//! let response = client.create_message(request).await?;
//! println!("{}", response.text());
//! ```

pub mod prompt;

use std::env;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use crate::error::{AiError, AiResult};
pub use prompt::{forecast_prompt, receipt_prompt};

/// Messages endpoint
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value
const API_VERSION: &str = "2023-06-01";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Anthropic API client
#[derive(Clone)]
pub struct AiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
}

/// Body of a Messages API call, minus the model.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub max_tokens: u32,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
}

impl MessageRequest {
    pub fn new(max_tokens: u32, messages: Vec<Value>) -> Self {
        Self {
            max_tokens,
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    /// A user turn holding plain text.
    pub fn user_text(text: &str) -> Value {
        json!({ "role": "user", "content": text })
    }
}

/// Messages API response
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessageResponse {
    /// Text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the model stopped to ask for tool results.
    pub fn wants_tools(&self) -> bool {
        self.stop_reason.as_deref() == Some("tool_use")
    }

    /// `(id, name, input)` of every tool call.
    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some((id.as_str(), name.as_str(), input)),
            _ => None,
        })
    }

    /// The response as an assistant turn, to be sent back with tool results.
    pub fn as_assistant_turn(&self) -> Value {
        let content: Vec<&ContentBlock> = self
            .content
            .iter()
            .filter(|block| !matches!(block, ContentBlock::Other))
            .collect();
        json!({ "role": "assistant", "content": content })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// Anthropic API error response
#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Serialize)]
struct Envelope<'a> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a MessageRequest,
}

/// Something that answers Messages API requests.
pub trait MessagesApi {
    fn create_message(
        &self,
        request: MessageRequest,
    ) -> impl Future<Output = AiResult<MessageResponse>> + Send;
}

impl AiClient {
    /// Create a new client with explicit API key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from environment variable ANTHROPIC_API_KEY
    pub fn from_env() -> AiResult<Self> {
        let _ = dotenvy::dotenv();

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::MissingApiKey)?;
        if api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }
        Ok(Self::new(api_key))
    }

    /// Set the model to use
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Call the Messages API
    async fn post(&self, request: MessageRequest) -> AiResult<MessageResponse> {
        tracing::info!(
            model = %self.model,
            max_tokens = request.max_tokens,
            tools = request.tools.len(),
            "📡 Calling Anthropic API"
        );

        let response = self
            .http
            .post(API_URL)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&Envelope {
                model: &self.model,
                request: &request,
            })
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                tracing::warn!("✗ API error: {}", error.error.message);
                return Err(AiError::Api(error.error.message));
            }
            tracing::warn!("✗ HTTP error: {}", status);
            return Err(AiError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: MessageResponse =
            serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        tracing::debug!(stop_reason = ?parsed.stop_reason, "✓ Received {} bytes", body.len());
        Ok(parsed)
    }
}

impl MessagesApi for AiClient {
    fn create_message(
        &self,
        request: MessageRequest,
    ) -> impl Future<Output = AiResult<MessageResponse>> + Send {
        self.post(request)
    }
}

/// Extract JSON from a response that may contain markdown code blocks
pub fn extract_json(text: &str) -> String {
    // Fenced block tagged as JSON
    if let Some(start) = text.find("```json") {
        let json_start = start + "```json".len();
        if let Some(end) = text[json_start..].find("```") {
            return text[json_start..json_start + end].trim().to_string();
        }
    }

    // Any fenced block, skipping the language tag line
    if let Some(start) = text.find("```") {
        let after_start = start + 3;
        let content_start = text[after_start..]
            .find('\n')
            .map(|i| after_start + i + 1)
            .unwrap_or(after_start);

        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim().to_string();
        }
    }

    // Raw object somewhere in the prose
    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if start < end {
                return text[start..=end].to_string();
            }
        }
    }

    text.trim().to_string()
}
