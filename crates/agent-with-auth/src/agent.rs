//! Graph assembly and turn execution.
//!
//! `build_agent_graph` wires the three nodes; `Agent` restores a thread,
//! merges the request into it and runs (or streams) one turn.

use std::sync::Arc;

use langgraph::{
    AgentError, Checkpointer, CompilationError, CompiledStateGraph, LlmClient, MemorySaver,
    RunnableConfig, StateGraph, StreamEvent, ToolSource, AUTHORIZATION_KEY,
    DEFAULT_RECURSION_LIMIT, END, START,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_stream::wrappers::ReceiverStream;

use crate::auth::strip_bearer;
use crate::nodes::{AuthNode, ChatNode, ToolNode, AUTH_NODE, CHAT_NODE, DEFAULT_MAX_TOOL_ROUNDS, TOOL_NODE};
use crate::state::{AgentState, TurnInput};
use crate::token::TokenDecoder;
use crate::tools::BackendTools;

/// Everything the graph needs, injected at construction.
pub struct AgentDeps {
    pub llm: Arc<dyn LlmClient>,
    pub backend_tools: BackendTools,
    pub decoder: Arc<dyn TokenDecoder>,
    pub checkpointer: Arc<dyn Checkpointer<AgentState>>,
    pub max_tool_rounds: usize,
    pub recursion_limit: usize,
}

impl AgentDeps {
    /// Default backend tools, in-memory checkpointing, default limits.
    pub fn new(llm: Arc<dyn LlmClient>, decoder: Arc<dyn TokenDecoder>) -> Self {
        Self {
            llm,
            backend_tools: BackendTools::with_defaults(),
            decoder,
            checkpointer: Arc::new(MemorySaver::new()),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_backend_tools(mut self, tools: BackendTools) -> Self {
        self.backend_tools = tools;
        self
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer<AgentState>>) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// Builds START → auth → chat ⇢ {tool → chat, END}.
pub fn build_agent_graph(
    deps: &AgentDeps,
) -> Result<CompiledStateGraph<AgentState>, CompilationError> {
    let backend: Arc<dyn ToolSource> = Arc::new(deps.backend_tools.clone());

    let mut graph = StateGraph::<AgentState>::new();
    graph
        .add_node(AUTH_NODE, Arc::new(AuthNode::new(Arc::clone(&deps.decoder))))
        .add_node(
            CHAT_NODE,
            Arc::new(
                ChatNode::new(Arc::clone(&deps.llm), Arc::clone(&backend))
                    .with_max_tool_rounds(deps.max_tool_rounds),
            ),
        )
        .add_node(TOOL_NODE, Arc::new(ToolNode::new(backend)))
        .add_edge(START, AUTH_NODE)
        .add_edge(AUTH_NODE, CHAT_NODE)
        .add_edge(TOOL_NODE, CHAT_NODE)
        .add_edge(CHAT_NODE, END);

    Ok(graph
        .compile_with_checkpointer(Arc::clone(&deps.checkpointer))?
        .with_recursion_limit(deps.recursion_limit))
}

/// `configurable` section forwarded by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardedConfig {
    #[serde(default)]
    pub configurable: Map<String, Value>,
}

/// Client-forwarded request properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardedProps {
    /// Bearer token (with or without the `Bearer ` prefix).
    #[serde(default)]
    pub authorization: Option<String>,
    #[serde(default)]
    pub config: Option<ForwardedConfig>,
}

/// Builds the run config of one turn.
///
/// Later sources override earlier ones key by key: `base.configurable`, then
/// `forwarded.config.configurable`, then the HTTP authorization header, then
/// `forwarded.authorization`. Keys no source mentions keep their value.
pub fn prepare_config(
    base: &RunnableConfig,
    thread_id: &str,
    forwarded: &ForwardedProps,
    header_auth: Option<&str>,
) -> RunnableConfig {
    let mut config = base.clone();
    config.thread_id = Some(thread_id.to_string());
    if let Some(forwarded_config) = &forwarded.config {
        config.merge_configurable(forwarded_config.configurable.clone());
    }
    let authorization = forwarded
        .authorization
        .as_deref()
        .filter(|a| !a.is_empty())
        .or(header_auth.filter(|a| !a.is_empty()));
    if let Some(authorization) = authorization {
        config.configurable.insert(
            AUTHORIZATION_KEY.to_string(),
            Value::String(strip_bearer(authorization).to_string()),
        );
    }
    config
}

/// The compiled agent plus the server-wide base config.
#[derive(Clone)]
pub struct Agent {
    graph: Arc<CompiledStateGraph<AgentState>>,
    base_config: RunnableConfig,
}

impl Agent {
    pub fn new(deps: AgentDeps) -> Result<Self, CompilationError> {
        Ok(Self {
            graph: Arc::new(build_agent_graph(&deps)?),
            base_config: RunnableConfig::default(),
        })
    }

    pub fn with_base_config(mut self, config: RunnableConfig) -> Self {
        self.base_config = config;
        self
    }

    pub fn base_config(&self) -> &RunnableConfig {
        &self.base_config
    }

    pub fn graph(&self) -> &Arc<CompiledStateGraph<AgentState>> {
        &self.graph
    }

    /// Restores the thread's latest state (or a fresh one) and merges `input`.
    ///
    /// The previous turn's identity is cleared; the auth node resolves it anew.
    pub async fn prepare_state(
        &self,
        config: &RunnableConfig,
        input: TurnInput,
    ) -> Result<AgentState, AgentError> {
        let mut state = self.graph.get_state(config).await?.unwrap_or_default();
        state.authorization = None;
        Ok(state.apply_input(input))
    }

    /// Runs one turn to completion and returns the terminal state.
    pub async fn run_turn(
        &self,
        thread_id: &str,
        input: TurnInput,
        forwarded: &ForwardedProps,
        header_auth: Option<&str>,
    ) -> Result<AgentState, AgentError> {
        let config = prepare_config(&self.base_config, thread_id, forwarded, header_auth);
        let state = self.prepare_state(&config, input).await?;
        tracing::debug!(thread_id, messages = state.messages.len(), "running turn");
        self.graph.invoke(state, Some(config)).await
    }

    /// Runs one turn on a background task, streaming one event per node.
    ///
    /// Also returns the length of the history the turn started from (restored
    /// messages plus the new input), so callers can tell which messages each
    /// node appended.
    pub async fn stream_turn(
        &self,
        thread_id: &str,
        input: TurnInput,
        forwarded: &ForwardedProps,
        header_auth: Option<&str>,
    ) -> Result<(usize, ReceiverStream<StreamEvent<AgentState>>), AgentError> {
        let config = prepare_config(&self.base_config, thread_id, forwarded, header_auth);
        let state = self.prepare_state(&config, input).await?;
        let history_len = state.messages.len();
        tracing::debug!(thread_id, messages = history_len, "streaming turn");
        Ok((history_len, self.graph.stream(state, Some(config))))
    }
}
