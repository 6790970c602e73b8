//! A scripted [`LlmProvider`] for driving the engine without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use uiforge_core::BoxFuture;
use uiforge_core::llm::{ChatRequest, ChatResponse, ContentBlock, LlmError, LlmProvider, Usage};

/// Replays queued responses in order and records every request.
///
/// Once the script runs out, further calls fail with [`LlmError::Request`].
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn then_respond(self, response: ChatResponse) -> Self {
        self.lock_responses().push_back(Ok(response));
        self
    }

    /// Queue a failure.
    pub fn then_fail(self, error: LlmError) -> Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock poisoned").len()
    }

    /// Responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock_responses().len()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<ChatResponse, LlmError>>> {
        self.responses.lock().expect("responses lock poisoned")
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    fn chat(&self, request: &ChatRequest) -> BoxFuture<'_, Result<ChatResponse, LlmError>> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());
        let next = self.lock_responses().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| Err(LlmError::Request("script exhausted".to_string())))
        })
    }
}

/// A final answer made of one text block.
pub fn text_response(text: &str, input_tokens: u64, output_tokens: u64) -> ChatResponse {
    response(vec![ContentBlock::text(text)], input_tokens, output_tokens)
}

/// A response asking for one tool call.
pub fn tool_response(
    id: &str,
    tool: &str,
    input: serde_json::Value,
    input_tokens: u64,
    output_tokens: u64,
) -> ChatResponse {
    response(
        vec![ContentBlock::tool_use(id, tool, input)],
        input_tokens,
        output_tokens,
    )
}

/// A response with arbitrary content blocks.
pub fn response(content: Vec<ContentBlock>, input_tokens: u64, output_tokens: u64) -> ChatResponse {
    let stop_reason = if content
        .iter()
        .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    {
        "tool_use"
    } else {
        "end_turn"
    };
    ChatResponse {
        content,
        stop_reason: Some(stop_reason.to_string()),
        usage: Usage {
            input_tokens,
            output_tokens,
        },
        model: "scripted".to_string(),
    }
}
