//! State graph: nodes, static edges, runtime routing, compile and invoke.
//!
//! Build a [`StateGraph`] with `add_node` / `add_edge(START, ..)` /
//! `add_edge(.., END)`, compile it, then `invoke` or `stream` with a state.
//! Nodes steer execution by returning [`Next`].

mod compile_error;
mod compiled;
mod next;
mod node;
mod state_graph;
mod stream;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
pub use next::Next;
pub use node::Node;
pub use state_graph::StateGraph;
pub use stream::StreamEvent;

/// Virtual entry node; the edge leaving it selects the first node to run.
pub const START: &str = "__start__";

/// Virtual exit node; an edge into it ends the run.
pub const END: &str = "__end__";
