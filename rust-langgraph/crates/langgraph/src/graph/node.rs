//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::memory::RunnableConfig;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// The run config is the request-scoped configuration bag for the invocation
/// (thread id plus `configurable` values such as a forwarded authorization
/// token). Nodes that do not need it ignore it.
///
/// **Interaction**: registered with `StateGraph::add_node`; executed by
/// `CompiledStateGraph::invoke` / `stream`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Node id (e.g. `"chat"`, `"tool"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// One step: state in, (state out, next step).
    async fn run(&self, state: S, config: &RunnableConfig) -> Result<(S, Next), AgentError>;
}
