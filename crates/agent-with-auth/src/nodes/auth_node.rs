//! Auth node: resolves the caller once per turn and records it in state.

use std::sync::Arc;

use async_trait::async_trait;
use langgraph::{AgentError, Next, Node, RunnableConfig};

use crate::auth::resolve_identity;
use crate::identity::IdentityRecord;
use crate::state::AgentState;
use crate::token::TokenDecoder;

use super::AUTH_NODE;

/// Entry node of the graph.
///
/// Reads the forwarded `authorization` value from the run config and writes
/// the decoded identity, or the anonymous identity, to `state.authorization`.
/// Never fails and never touches the messages.
pub struct AuthNode {
    decoder: Arc<dyn TokenDecoder>,
}

impl AuthNode {
    pub fn new(decoder: Arc<dyn TokenDecoder>) -> Self {
        Self { decoder }
    }
}

#[async_trait]
impl Node<AgentState> for AuthNode {
    fn id(&self) -> &str {
        AUTH_NODE
    }

    async fn run(
        &self,
        mut state: AgentState,
        config: &RunnableConfig,
    ) -> Result<(AgentState, Next), AgentError> {
        let identity = resolve_identity(config, self.decoder.as_ref()).unwrap_or_else(|| {
            tracing::warn!("no authentication found - using anonymous user");
            IdentityRecord::anonymous()
        });
        state.authorization = Some(identity);
        Ok((state, Next::Continue))
    }
}
