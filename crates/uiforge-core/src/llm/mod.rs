//! LLM provider integration — chat completions with tool use.
//!
//! The engine depends only on the [`LlmProvider`] trait. The shipped
//! implementation is **Anthropic** (Claude models via the Messages API);
//! tests plug in scripted providers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────┐
//! │ ConversationEngine   │────▶│ LlmProvider  │  (trait)
//! └──────────────────────┘     └──────┬───────┘
//!                                     │
//!                       ┌─────────────┴─────────────┐
//!                       ▼                           ▼
//!              ┌──────────────┐            ┌────────────────┐
//!              │  Anthropic   │            │   Scripted     │
//!              │ (Claude API) │            │   (tests)      │
//!              └──────────────┘            └────────────────┘
//! ```

pub mod anthropic;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use provider::{LlmError, LlmProvider};
pub use types::*;

/// Create an LLM provider from config.
///
/// Returns `None` when no API key is configured; callers decide how to
/// report the missing credential.
pub fn create_provider(config: &uiforge_config::LlmConfig) -> Option<Box<dyn LlmProvider>> {
    if !config.has_api_key() {
        return None;
    }

    let mut provider = AnthropicProvider::new(config.api_key.clone());
    if !config.model.is_empty() {
        provider = provider.with_model(&config.model);
    }
    if let Some(ref base_url) = config.base_url {
        provider = provider.with_base_url(base_url);
    }
    Some(Box::new(provider))
}
