//! Graph nodes of one conversation turn: auth → chat ⇢ tool → chat.

mod auth_node;
mod chat_node;
mod tool_node;

pub use auth_node::AuthNode;
pub use chat_node::{route_to_tool_node, tool_rounds_this_turn, ChatNode, DEFAULT_MAX_TOOL_ROUNDS};
pub use tool_node::ToolNode;

pub const AUTH_NODE: &str = "auth_node";
pub const CHAT_NODE: &str = "chat_node";
pub const TOOL_NODE: &str = "tool_node";
