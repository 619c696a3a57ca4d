//! Chat node: prompt assembly, authorization-dependent tool binding, routing.

use std::sync::Arc;

use async_trait::async_trait;
use langgraph::{
    AgentError, LlmClient, LlmRequest, Message, Next, Node, RunnableConfig, ToolCall, ToolSource,
    ToolSpec,
};

use crate::prompt::build_system_prompt;
use crate::state::AgentState;
use crate::tools::bind_tools;

use super::{CHAT_NODE, TOOL_NODE};

/// Backend tool rounds allowed per turn before tools are withheld.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Number of assistant messages in `turn` that requested at least one backend
/// tool.
pub fn tool_rounds_this_turn(turn: &[Message], backend_names: &[String]) -> usize {
    turn.iter()
        .filter(|m| route_to_tool_node(m.tool_calls(), backend_names))
        .count()
}

/// True when any call names one of the bound backend tools.
///
/// Calls to caller-supplied tools are left to the client and never route.
pub fn route_to_tool_node(calls: &[ToolCall], bound_backend_names: &[String]) -> bool {
    calls
        .iter()
        .any(|c| bound_backend_names.iter().any(|n| *n == c.name))
}

/// Invokes the model with the tools this caller may use.
///
/// Appends the model's reply to `state.messages` and routes to the tool node
/// when the reply asks for a bound backend tool, otherwise ends the turn.
///
/// **Interaction**: holds the injected `LlmClient` and the backend
/// `ToolSource`; followed by `ToolNode` or `END`.
pub struct ChatNode {
    llm: Arc<dyn LlmClient>,
    backend: Arc<dyn ToolSource>,
    max_tool_rounds: usize,
}

impl ChatNode {
    pub fn new(llm: Arc<dyn LlmClient>, backend: Arc<dyn ToolSource>) -> Self {
        Self {
            llm,
            backend,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    async fn backend_specs(&self) -> Result<Vec<ToolSpec>, AgentError> {
        self.backend
            .list_tools()
            .await
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))
    }
}

#[async_trait]
impl Node<AgentState> for ChatNode {
    fn id(&self) -> &str {
        CHAT_NODE
    }

    async fn run(
        &self,
        mut state: AgentState,
        _config: &RunnableConfig,
    ) -> Result<(AgentState, Next), AgentError> {
        let backend = self.backend_specs().await?;
        let backend_names: Vec<String> = backend.iter().map(|t| t.name.clone()).collect();

        let rounds = tool_rounds_this_turn(state.current_turn(), &backend_names);
        let allowed: &[ToolSpec] = if rounds >= self.max_tool_rounds {
            tracing::warn!(
                rounds,
                max = self.max_tool_rounds,
                "tool budget exhausted for this turn, backend tools withheld"
            );
            &[]
        } else {
            &backend
        };

        let bound = bind_tools(state.identity(), &state.tools, allowed);
        let bound_backend: Vec<String> = if state.is_authenticated() {
            allowed.iter().map(|t| t.name.clone()).collect()
        } else {
            Vec::new()
        };

        let instruction = build_system_prompt(state.identity(), &state.proverbs, &backend_names);
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(instruction));
        messages.extend(state.messages.iter().cloned());

        let request = LlmRequest::new(messages)
            .with_tools(bound)
            .with_parallel_tool_calls(false);
        tracing::debug!(tools = ?request.tool_names(), "invoking model");
        let reply = self.llm.invoke(&request).await?.into_message();

        let next = if route_to_tool_node(reply.tool_calls(), &bound_backend) {
            Next::Node(TOOL_NODE.to_string())
        } else {
            Next::End
        };
        state.messages.push(reply);
        Ok((state, next))
    }
}
