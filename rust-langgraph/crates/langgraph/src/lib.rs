//! LangGraph-style state graphs in Rust: state-in, state-out.
//!
//! A graph is a set of [`Node`]s joined by static edges (`add_edge`) and by
//! routing decisions the nodes return at runtime ([`Next`]). Compiled graphs
//! run one node at a time, optionally persisting the state after every node
//! through a [`Checkpointer`](memory::Checkpointer).
//!
//! Model access goes through [`LlmClient`]; tools through [`ToolSource`].
//! Concrete agents and their state types live in consumer crates.

pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod tool_source;

pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, StateGraph, StreamEvent,
    DEFAULT_RECURSION_LIMIT, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmError, LlmRequest, LlmResponse, MockLlm};
pub use memory::{Checkpointer, MemorySaver, RunnableConfig, AUTHORIZATION_KEY};
pub use message::{Message, ToolCall};
pub use tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};
