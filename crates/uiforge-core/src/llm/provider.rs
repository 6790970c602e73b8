//! LLM provider trait — the core abstraction for chat completions.
//!
//! The conversation engine talks to the model only through this trait, so
//! tests can substitute a scripted provider.

use crate::BoxFuture;

use super::types::{ChatRequest, ChatResponse};

/// Errors from LLM provider calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    Request(String),

    #[error("authentication failed (check API key): {0}")]
    Auth(String),

    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("context length exceeded: {0}")]
    ContextLength(String),

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("provider error: {status} — {message}")]
    ProviderError { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout")]
    Timeout,
}

/// Core trait for LLM providers.
///
/// Implementations must be `Send + Sync` so one provider can serve
/// concurrent HTTP requests. Uses `BoxFuture` for object safety
/// (allows `Arc<dyn LlmProvider>`).
pub trait LlmProvider: Send + Sync {
    /// Provider display name (e.g. "Anthropic").
    fn name(&self) -> &str;

    /// Perform a chat completion.
    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>>;
}
