//! Compiled state graph: immutable, supports invoke, stream and state lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};

use super::{Next, Node, StreamEvent, END};

/// Default maximum number of node executions per run.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Buffer size of the channel behind `stream`.
const STREAM_BUFFER: usize = 32;

/// Compiled graph: immutable structure built by `StateGraph::compile*`.
///
/// Runs from the entry node; after each node uses its returned `Next` to follow
/// the static edge, jump, or stop. Runs are independent of each other: the only
/// shared state is the optional checkpointer, which isolates threads by
/// `thread_id`.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) edges: HashMap<String, String>,
    pub(super) entry: String,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Sets the maximum number of node executions for one run.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Runs the graph with the given state and returns the terminal state.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        let config = config.unwrap_or_default();
        self.run(state, &config, None).await
    }

    /// Runs the graph on a background task and streams one event per node.
    ///
    /// The stream ends after `StreamEvent::End` or `StreamEvent::Error`.
    /// Dropping the stream does not cancel the run.
    pub fn stream(
        self: &Arc<Self>,
        state: S,
        config: Option<RunnableConfig>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let graph = Arc::clone(self);
        let config = config.unwrap_or_default();
        tokio::spawn(async move {
            match graph.run(state, &config, Some(&tx)).await {
                Ok(state) => {
                    let _ = tx.send(StreamEvent::End { state }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(StreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        });
        ReceiverStream::new(rx)
    }

    /// Latest checkpointed state of the thread in `config`.
    ///
    /// Returns `None` when the graph has no checkpointer, the config has no
    /// `thread_id`, or nothing was saved yet.
    pub async fn get_state(&self, config: &RunnableConfig) -> Result<Option<S>, AgentError> {
        let (Some(checkpointer), Some(_)) = (&self.checkpointer, &config.thread_id) else {
            return Ok(None);
        };
        let tuple = checkpointer.get_tuple(config).await?;
        Ok(tuple.map(|(checkpoint, _)| checkpoint.channel_values))
    }

    async fn run(
        &self,
        mut state: S,
        config: &RunnableConfig,
        events: Option<&mpsc::Sender<StreamEvent<S>>>,
    ) -> Result<S, AgentError> {
        self.save(config, &state, CheckpointSource::Input, 0).await?;

        let mut current_id = self.entry.clone();
        let mut steps = 0usize;
        loop {
            if steps >= self.recursion_limit {
                tracing::warn!(
                    limit = self.recursion_limit,
                    node = %current_id,
                    "graph recursion limit reached"
                );
                return Err(AgentError::RecursionLimitExceeded(self.recursion_limit));
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current_id)
                .ok_or_else(|| AgentError::NodeNotFound(current_id.clone()))?;
            tracing::debug!(node = %current_id, step = steps, "running node");
            let (new_state, next) = node.run(state, config).await?;
            state = new_state;

            self.save(config, &state, CheckpointSource::Loop, steps as u64)
                .await?;
            if let Some(tx) = events {
                let _ = tx
                    .send(StreamEvent::Node {
                        id: current_id.clone(),
                        state: state.clone(),
                    })
                    .await;
            }

            match next {
                Next::End => return Ok(state),
                Next::Node(id) => current_id = id,
                Next::Continue => match self.edges.get(&current_id) {
                    Some(to) if to != END => current_id = to.clone(),
                    _ => return Ok(state),
                },
            }
        }
    }

    async fn save(
        &self,
        config: &RunnableConfig,
        state: &S,
        source: CheckpointSource,
        step: u64,
    ) -> Result<(), AgentError> {
        let (Some(checkpointer), Some(_)) = (&self.checkpointer, &config.thread_id) else {
            return Ok(());
        };
        let checkpoint = Checkpoint::from_state(state.clone(), source, step);
        checkpointer.put(config, &checkpoint).await?;
        Ok(())
    }
}
