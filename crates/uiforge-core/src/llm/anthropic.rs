//! Anthropic Claude API provider.
//!
//! Implements the [`LlmProvider`] trait for the Anthropic Messages API.
//! Supports chat completions with tool use via the `/v1/messages` endpoint.
//! The transcript types already use the Messages API wire shape, so the
//! request body is assembled without per-message conversion.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::BoxFuture;

use super::provider::{LlmError, LlmProvider};
use super::types::*;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: Zeroizing<String>,
    default_model: String,
    api_url: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Zeroizing::new(api_key.into()),
            default_model: DEFAULT_MODEL.to_string(),
            api_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Send requests to a different Messages API endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Convert our ChatRequest into Anthropic's API format.
    fn build_request_body(&self, request: &ChatRequest) -> AnthropicRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            system: request.system.clone(),
            messages: request.messages.clone(),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.clone())
            },
            temperature: request.temperature,
        }
    }

    /// Parse Anthropic's response into our ChatResponse.
    fn parse_response(&self, resp: AnthropicResponse) -> ChatResponse {
        ChatResponse {
            content: resp.content,
            stop_reason: resp.stop_reason,
            usage: Usage {
                input_tokens: resp.usage.input_tokens,
                output_tokens: resp.usage.output_tokens,
            },
            model: resp.model,
        }
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>> {
        let body = self.build_request_body(request);
        let betas = request.betas.join(",");
        Box::pin(async move {
            debug!(model = %body.model, messages = body.messages.len(), "Anthropic chat request");

            let mut builder = self
                .client
                .post(&self.api_url)
                .header("x-api-key", self.api_key.as_str())
                .header("anthropic-version", ANTHROPIC_API_VERSION)
                .header("content-type", "application/json");
            if !betas.is_empty() {
                builder = builder.header("anthropic-beta", betas);
            }

            let resp = builder.json(&body).send().await.map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

            let status = resp.status().as_u16();
            if status == 401 {
                return Err(LlmError::Auth("invalid API key".to_string()));
            }
            if status == 429 {
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                return Err(LlmError::RateLimited {
                    retry_after_secs: retry_after,
                });
            }
            if !resp.status().is_success() {
                let error_body = resp.text().await.unwrap_or_default();
                return Err(match status {
                    404 => LlmError::ModelNotFound(body.model.clone()),
                    400 if error_body.contains("prompt is too long") => {
                        LlmError::ContextLength(error_body)
                    }
                    _ => LlmError::ProviderError {
                        status,
                        message: error_body,
                    },
                });
            }

            let api_resp: AnthropicResponse = resp
                .json()
                .await
                .map_err(|e| LlmError::Parse(e.to_string()))?;

            Ok(self.parse_response(api_resp))
        })
    }
}

// ── Anthropic API types (private) ───────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
