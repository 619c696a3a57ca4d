//! State graph builder: nodes plus static edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` (use `START`
//! and `END` for the virtual entry and exit), then `compile` or
//! `compile_with_checkpointer`. Conditional routing is not declared here: a
//! node returns `Next::Node(id)` to jump.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;
use crate::graph::{END, START};
use crate::memory::Checkpointer;

/// State graph: nodes plus static edges.
///
/// Generic over state type `S`. Each node has at most one static outgoing edge;
/// adding a second edge from the same node replaces the first.
///
/// **Interaction**: accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, String>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// Adds a node; replaces any node already registered under the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds the static edge `from -> to`. `from` may be `START`, `to` may be `END`.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.insert(from.into(), to.into());
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_inner(None)
    }

    /// Builds the executable graph with a checkpointer. When a run's config
    /// carries a `thread_id`, the state is saved after every node.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_inner(Some(checkpointer))
    }

    fn compile_inner(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        let entry = self
            .edges
            .get(START)
            .filter(|to| to.as_str() != END)
            .cloned()
            .ok_or(CompilationError::MissingEntry)?;
        let mut edges = self.edges;
        edges.remove(START);
        Ok(CompiledStateGraph {
            nodes: self.nodes,
            edges,
            entry,
            checkpointer,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}
