//! Mock LLM for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, LlmRequest, LlmResponse};
use crate::message::ToolCall;

/// Mock LLM returning scripted responses in order and recording every request.
///
/// When the script is exhausted the last response is repeated if
/// `repeat_last` is set, otherwise `LlmError::Exhausted` is returned.
///
/// **Interaction**: implements `LlmClient`; tests read `requests()` to assert
/// which tools were bound and what instruction was sent.
pub struct MockLlm {
    script: Mutex<VecDeque<LlmResponse>>,
    last: Mutex<Option<LlmResponse>>,
    repeat_last: bool,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    /// Mock that answers with each response once, in order.
    pub fn scripted(responses: impl IntoIterator<Item = LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            last: Mutex::new(None),
            repeat_last: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that always answers with plain text.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted([LlmResponse::text(content)]).repeating()
    }

    /// Mock that first requests one tool call, then answers with `final_answer`.
    pub fn tool_then_answer(call: ToolCall, final_answer: impl Into<String>) -> Self {
        Self::scripted([
            LlmResponse::with_tool_calls("", vec![call]),
            LlmResponse::text(final_answer),
        ])
    }

    /// Repeats the last scripted response forever instead of failing.
    pub fn repeating(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self
            .script
            .lock()
            .map_err(|e| LlmError::Api(e.to_string()))?
            .pop_front();
        let mut last = self.last.lock().map_err(|e| LlmError::Api(e.to_string()))?;
        match next {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None if self.repeat_last => last.clone().ok_or(LlmError::Exhausted),
            None => Err(LlmError::Exhausted),
        }
    }
}
