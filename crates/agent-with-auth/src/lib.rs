//! Conversational agent that gates backend tools on the caller's identity.
//!
//! One turn runs `auth_node → chat_node ⇢ tool_node → chat_node` on the
//! `langgraph` state graph. The auth node turns the forwarded bearer token
//! into an [`IdentityRecord`]; the chat node binds backend tools such as
//! `get_weather` only for authenticated callers and tells anonymous callers
//! to sign in.

pub mod agent;
pub mod auth;
pub mod config;
pub mod identity;
pub mod nodes;
pub mod prompt;
pub mod server;
pub mod state;
pub mod token;
pub mod tools;

pub use agent::{build_agent_graph, prepare_config, Agent, AgentDeps, ForwardedConfig, ForwardedProps};
pub use auth::{resolve_identity, strip_bearer};
pub use config::{Args, AuthMode, Config, ConfigError};
pub use identity::{IdentityRecord, ANONYMOUS_USER_ID};
pub use nodes::{AuthNode, ChatNode, ToolNode, AUTH_NODE, CHAT_NODE, TOOL_NODE};
pub use prompt::build_system_prompt;
pub use server::{router, run_server, AppState, RunRequest};
pub use state::{AgentState, TurnInput};
pub use token::{decode_unverified, DecodeError, DisabledDecoder, Hs256Decoder, TokenDecoder, UnverifiedDecoder};
pub use tools::{bind_tools, BackendTool, BackendTools, WeatherTool};
