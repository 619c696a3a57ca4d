//! Errors raised while running a compiled graph.

use thiserror::Error;

use crate::llm::LlmError;
use crate::memory::CheckpointError;

/// Error that aborts a graph run.
///
/// Nodes return it from `Node::run`; `CompiledStateGraph::invoke` propagates it
/// unchanged to the caller. There is no retry at this layer.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed, with a description.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// A node asked to jump to an id that is not registered.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// The run took more node steps than the graph's recursion limit.
    #[error("recursion limit of {0} node steps exceeded")]
    RecursionLimitExceeded(usize),
    /// Model invocation failed.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),
    /// Loading or saving a checkpoint failed.
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}
