//! Conversation engine — the tool-use agent loop.
//!
//! One [`ConversationEngine::run`] drives a single generation request through
//! three states:
//!
//! ```text
//!            ┌──────────────────┐  tool-use blocks   ┌──────────────────┐
//!  query ───▶│  AwaitingModel   │───────────────────▶│  ExecutingTools  │
//!            └────────┬─────────┘◀───────────────────└────────┬─────────┘
//!                     │               one tool ran,           │
//!                     │               ask the model again     │ nothing left
//!                     ▼                                       ▼
//!            ┌──────────────────────────────────────────────────────────┐
//!            │                          Done                            │
//!            └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Tool calls run one at a time in emission order. After each call the model
//! is asked again straight away, and any tool calls in that answer are
//! processed (depth first) before the next sibling of the earlier batch.
//! Pending batches live on an explicit stack, so deep chains never grow the
//! call stack.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use uiforge_config::AppConfig;

use crate::cost::{PricingModel, TokenUsage};
use crate::llm::provider::{LlmError, LlmProvider};
use crate::llm::types::{ChatMessage, ChatRequest, ChatResponse, ToolCall, ToolDefinition};
use crate::prompt::system_prompt;
use crate::tools::{ToolError, ToolRegistry};

/// Errors that end a conversation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("model request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("tool {tool} failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error("conversation exceeded {limit} model requests")]
    TurnLimitExceeded { limit: u32 },

    #[error("conversation exceeded its {secs}s deadline")]
    DeadlineExceeded { secs: u64 },
}

/// Loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    AwaitingModel,
    ExecutingTools,
    Done,
}

/// Per-request model parameters and loop limits.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub system_prompt: String,
    pub betas: Vec<String>,
    /// Maximum model requests per conversation.
    pub max_turns: Option<u32>,
    /// Wall-clock budget per conversation.
    pub deadline: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            system_prompt: system_prompt(&config.agent.code_language),
            betas: config.llm.betas.clone(),
            max_turns: (config.agent.max_turns > 0).then_some(config.agent.max_turns),
            deadline: (config.agent.deadline_secs > 0)
                .then(|| Duration::from_secs(config.agent.deadline_secs)),
        }
    }
}

/// The mutable aggregate threaded through one conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    /// Transcript in the order it is sent to the model.
    pub messages: Vec<ChatMessage>,
    /// Tool calls extracted from the latest response.
    pub pending_tool_calls: Vec<ToolCall>,
    pub latest_response: Option<ChatResponse>,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub api_call_count: u32,
}

impl ConversationState {
    /// Seed the transcript with the caller's request.
    pub fn new(query: &str) -> Self {
        Self {
            messages: vec![ChatMessage::user(query)],
            ..Default::default()
        }
    }

    fn record(&mut self, response: ChatResponse) {
        self.total_input_tokens += response.usage.input_tokens;
        self.total_output_tokens += response.usage.output_tokens;
        self.pending_tool_calls = response.tool_calls();
        self.latest_response = Some(response);
    }
}

/// Result of a finished conversation.
#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    /// Concatenated text blocks of the final response.
    pub final_text: String,
    pub state: ConversationState,
}

impl ConversationOutcome {
    /// Usage totals priced under `pricing`.
    pub fn usage(&self, pricing: &PricingModel) -> TokenUsage {
        TokenUsage::from_totals(
            self.state.total_input_tokens,
            self.state.total_output_tokens,
            self.state.api_call_count,
            pricing,
        )
    }
}

/// Drives the model through the tool workflow until it answers.
pub struct ConversationEngine {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    settings: EngineSettings,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            provider,
            tools,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one conversation for `query`, enforcing the configured deadline.
    pub async fn run(&self, query: &str) -> Result<ConversationOutcome, EngineError> {
        match self.settings.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run_loop(query))
                .await
                .map_err(|_| {
                    warn!(secs = deadline.as_secs(), "Conversation deadline exceeded");
                    EngineError::DeadlineExceeded {
                        secs: deadline.as_secs(),
                    }
                })?,
            None => self.run_loop(query).await,
        }
    }

    async fn run_loop(&self, query: &str) -> Result<ConversationOutcome, EngineError> {
        let definitions = self.tools.definitions();
        let mut state = ConversationState::new(query);
        let mut batches: Vec<VecDeque<ToolCall>> = Vec::new();
        let mut stage = EngineState::AwaitingModel;

        loop {
            trace!(?stage, depth = batches.len(), "Engine step");
            match stage {
                EngineState::AwaitingModel => {
                    let response = self.request(&state, &definitions).await?;
                    state.api_call_count += 1;
                    state.record(response);
                    if !state.pending_tool_calls.is_empty() {
                        batches.push(state.pending_tool_calls.iter().cloned().collect());
                    }
                    batches.retain(|b| !b.is_empty());
                    stage = if batches.is_empty() {
                        EngineState::Done
                    } else {
                        EngineState::ExecutingTools
                    };
                }
                EngineState::ExecutingTools => {
                    batches.retain(|b| !b.is_empty());
                    let Some(call) = batches.last_mut().and_then(VecDeque::pop_front) else {
                        stage = EngineState::Done;
                        continue;
                    };

                    let Some(tool) = self.tools.get(&call.name) else {
                        error!(tool = %call.name, id = %call.id, "Unknown tool requested, skipping");
                        continue;
                    };

                    info!(tool = %call.name, id = %call.id, "Model is using tool");
                    let output = tool
                        .executor
                        .execute(call.input.clone())
                        .await
                        .map_err(|source| EngineError::Tool {
                            tool: call.name.clone(),
                            source,
                        })?;

                    let replay = state
                        .latest_response
                        .as_ref()
                        .map(|r| r.content.clone())
                        .unwrap_or_default();
                    state.messages.push(ChatMessage::assistant_blocks(replay));
                    state.messages.push(ChatMessage::tool_result(&call.id, output));
                    stage = EngineState::AwaitingModel;
                }
                EngineState::Done => break,
            }
        }

        let final_text = state
            .latest_response
            .as_ref()
            .map(ChatResponse::text)
            .unwrap_or_default();

        info!(
            api_calls = state.api_call_count,
            input_tokens = state.total_input_tokens,
            output_tokens = state.total_output_tokens,
            "Conversation finished"
        );

        Ok(ConversationOutcome { final_text, state })
    }

    async fn request(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
    ) -> Result<ChatResponse, EngineError> {
        if let Some(limit) = self.settings.max_turns {
            if state.api_call_count >= limit {
                warn!(limit, "Conversation turn limit reached");
                return Err(EngineError::TurnLimitExceeded { limit });
            }
        }

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: state.messages.clone(),
            tools: tools.to_vec(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: Some(self.settings.system_prompt.clone()),
            betas: self.settings.betas.clone(),
        };

        let response = self.provider.chat(&request).await?;
        debug!(
            call = state.api_call_count + 1,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
            "Model responded"
        );
        Ok(response)
    }
}
