//! Conversation state of the agent graph.
//!
//! **Interaction**: passed into and out of `AuthNode`, `ChatNode` and
//! `ToolNode`; checkpointed per thread between turns. A new turn restores the
//! saved state (or starts from `Default`) and merges the request's
//! [`TurnInput`] with `apply_input`.

use langgraph::{Message, ToolSpec};
use serde::{Deserialize, Serialize};

use crate::identity::{self, IdentityRecord};

/// State of one conversation thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    /// Message history, append-only across turns.
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub proverbs: Vec<String>,
    /// Caller-supplied tools for the current turn; always bound to the model.
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    /// Identity resolved by the auth node for the current turn.
    #[serde(default)]
    pub authorization: Option<IdentityRecord>,
    /// Index in `messages` of the first message of the current turn.
    #[serde(default)]
    pub turn_start: usize,
}

/// What one request contributes to the thread state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnInput {
    /// New messages, appended to the history.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Caller tools for this turn; replace the previous turn's tools.
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
    /// Replaces the proverb list when present.
    #[serde(default)]
    pub proverbs: Option<Vec<String>>,
}

impl TurnInput {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            ..Self::default()
        }
    }
}

impl AgentState {
    pub fn identity(&self) -> Option<&IdentityRecord> {
        self.authorization.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        identity::is_authenticated(self.identity())
    }

    /// Messages appended since the current turn started.
    pub fn current_turn(&self) -> &[Message] {
        let start = self.turn_start.min(self.messages.len());
        &self.messages[start..]
    }

    /// Merges one request into the restored thread state and starts a new turn
    /// at the first of its messages.
    pub fn apply_input(mut self, input: TurnInput) -> Self {
        self.turn_start = self.messages.len();
        self.messages.extend(input.messages);
        self.tools = input.tools;
        if let Some(proverbs) = input.proverbs {
            self.proverbs = proverbs;
        }
        self
    }
}
