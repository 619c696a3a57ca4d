//! Run config: thread id, checkpoint selection and the `configurable` bag.
//!
//! Mirrors LangGraph's `config["configurable"]`: the thread/checkpoint keys are
//! typed fields, everything else (e.g. a forwarded `authorization` token) lives
//! in `configurable` as JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which a caller's bearer token is forwarded.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Config for a single run. Identifies the thread and carries request-scoped values.
///
/// **Interaction**: passed to `CompiledStateGraph::invoke(state, config)`, handed
/// to every `Node::run`, and used by `Checkpointer` to key storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnableConfig {
    /// Conversation/thread id. Required for checkpointing.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Load this checkpoint instead of the latest.
    #[serde(default)]
    pub checkpoint_id: Option<String>,
    /// Checkpoint namespace; empty by default.
    #[serde(default)]
    pub checkpoint_ns: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Request-scoped key-value bag.
    #[serde(default)]
    pub configurable: Map<String, Value>,
}

impl RunnableConfig {
    /// Config for the given thread.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    /// Sets one `configurable` value (builder).
    pub fn with_configurable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configurable.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.configurable.get(key)
    }

    /// The forwarded authorization value, when present as a non-empty string.
    pub fn authorization(&self) -> Option<&str> {
        self.get(AUTHORIZATION_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Merges `overrides` into `configurable`: explicit keys replace existing
    /// values, keys not mentioned keep their previous value.
    pub fn merge_configurable(&mut self, overrides: Map<String, Value>) {
        for (k, v) in overrides {
            self.configurable.insert(k, v);
        }
    }
}
