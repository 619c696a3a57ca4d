//! Tool node: answers the tool calls of the latest assistant message.

use std::sync::Arc;

use async_trait::async_trait;
use langgraph::{AgentError, Message, Next, Node, RunnableConfig, ToolCall, ToolSource, ToolSourceError};
use serde_json::Value;

use crate::state::AgentState;

use super::TOOL_NODE;

/// Answers every call of the last assistant message, in request order,
/// appending one tool message per call keyed by its call id.
///
/// Backend calls are executed. Calls naming anything else get an `Error: ...`
/// result, since the model request that follows must carry a result for every
/// call id. Failures become `Error: ...` tool messages so the model can correct
/// itself. Always continues back to the chat node.
pub struct ToolNode {
    backend: Arc<dyn ToolSource>,
}

impl ToolNode {
    pub fn new(backend: Arc<dyn ToolSource>) -> Self {
        Self { backend }
    }

    async fn execute(&self, call: &ToolCall, backend: &[String], authenticated: bool) -> String {
        if !backend.contains(&call.name) {
            return error_text(&format!(
                "{} is not a valid tool, try one of [{}]",
                call.name,
                backend.join(", ")
            ));
        }
        if !authenticated {
            return error_text(&format!(
                "tool `{}` is only available to authenticated users",
                call.name
            ));
        }
        let args = match parse_arguments(&call.arguments) {
            Ok(args) => args,
            Err(e) => return error_text(&e.to_string()),
        };
        match self.backend.call_tool(&call.name, args).await {
            Ok(content) => content.text,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                error_text(&e.to_string())
            }
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, ToolSourceError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw).map_err(|e| ToolSourceError::InvalidInput(e.to_string()))
}

fn error_text(reason: &str) -> String {
    format!("Error: {reason}\n Please fix your mistakes.")
}

#[async_trait]
impl Node<AgentState> for ToolNode {
    fn id(&self) -> &str {
        TOOL_NODE
    }

    async fn run(
        &self,
        mut state: AgentState,
        _config: &RunnableConfig,
    ) -> Result<(AgentState, Next), AgentError> {
        let backend: Vec<String> = self
            .backend
            .list_tools()
            .await
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?
            .into_iter()
            .map(|t| t.name)
            .collect();
        let calls: Vec<ToolCall> = state
            .messages
            .iter()
            .rev()
            .find(|m| matches!(m, Message::Assistant { .. }))
            .map(|m| m.tool_calls().to_vec())
            .unwrap_or_default();
        let authenticated = state.is_authenticated();

        for call in &calls {
            tracing::info!(tool = %call.name, call_id = %call.id, "executing tool call");
            let text = self.execute(call, &backend, authenticated).await;
            state
                .messages
                .push(Message::tool(call.id.clone(), Some(call.name.clone()), text));
        }
        Ok((state, Next::Continue))
    }
}
