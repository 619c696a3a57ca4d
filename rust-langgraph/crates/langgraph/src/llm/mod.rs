//! LLM client abstraction and implementations.
//!
//! - `LlmClient`: one async model invocation
//! - `LlmRequest` / `LlmResponse`: messages and tools in, text and tool calls out
//! - `ChatOpenAI`: OpenAI-compatible Chat Completions client
//! - `MockLlm`: scripted responses for tests and offline runs

mod error;
mod mock;
mod openai;

pub use error::LlmError;
pub use mock::MockLlm;
pub use openai::{ChatOpenAI, OpenAiConfig, DEFAULT_BASE_URL};

use async_trait::async_trait;

use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

/// One model invocation.
///
/// Tools are bound per request rather than stored on the client, so the same
/// client serves callers with different capability sets.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    /// Full message list, system instruction first.
    pub messages: Vec<Message>,
    /// Tools the model may call; empty disables tool calling.
    pub tools: Vec<ToolSpec>,
    /// Whether the model may request several tool calls in one response.
    pub parallel_tool_calls: bool,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            parallel_tool_calls: false,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_parallel_tool_calls(mut self, enabled: bool) -> Self {
        self.parallel_tool_calls = enabled;
        self
    }

    /// Names of the bound tools.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Model output: assistant text and zero or more requested tool calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// Converts the response into the assistant message appended to history.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tool_calls(self.content, self.tool_calls)
    }
}

/// Async chat model.
///
/// **Interaction**: held by chat nodes as `Arc<dyn LlmClient>`; the only
/// suspension point of a chat step.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}
