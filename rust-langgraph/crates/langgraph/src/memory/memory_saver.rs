//! In-memory checkpointer. Not persistent across restarts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;

type ThreadKey = (String, String);

/// In-memory checkpointer keyed by (thread_id, checkpoint_ns).
///
/// Checkpoints of a thread are kept in insertion order; the last one is the
/// latest. Cloning shares the underlying storage.
///
/// Every `put` stores a full copy of the state and threads are never evicted,
/// so by default memory grows with the number of node steps times the size of
/// the state. Use [`MemorySaver::with_max_checkpoints`] to keep only the most
/// recent checkpoints of each thread; older ones can then no longer be selected
/// by `checkpoint_id`.
pub struct MemorySaver<S> {
    inner: Arc<RwLock<HashMap<ThreadKey, Vec<Checkpoint<S>>>>>,
    max_checkpoints: Option<usize>,
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_checkpoints: None,
        }
    }

    /// Keeps at most `max` checkpoints per thread (at least one), dropping the
    /// oldest on `put`.
    pub fn with_max_checkpoints(mut self, max: usize) -> Self {
        self.max_checkpoints = Some(max.max(1));
        self
    }
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for MemorySaver<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_checkpoints: self.max_checkpoints,
        }
    }
}

fn thread_key(config: &RunnableConfig) -> Result<ThreadKey, CheckpointError> {
    let thread_id = config
        .thread_id
        .clone()
        .ok_or(CheckpointError::ThreadIdRequired)?;
    Ok((thread_id, config.checkpoint_ns.clone()))
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = thread_key(config)?;
        let mut guard = self.inner.write().await;
        let checkpoints = guard.entry(key).or_default();
        checkpoints.push(checkpoint.clone());
        if let Some(max) = self.max_checkpoints {
            let excess = checkpoints.len().saturating_sub(max);
            checkpoints.drain(..excess);
        }
        Ok(checkpoint.id.clone())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let key = thread_key(config)?;
        let guard = self.inner.read().await;
        let Some(checkpoints) = guard.get(&key) else {
            return Ok(None);
        };
        let found = match &config.checkpoint_id {
            Some(id) => Some(
                checkpoints
                    .iter()
                    .find(|c| &c.id == id)
                    .ok_or_else(|| CheckpointError::NotFound(id.clone()))?,
            ),
            None => checkpoints.last(),
        };
        Ok(found.map(|c| (c.clone(), c.metadata.clone())))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = thread_key(config)?;
        let guard = self.inner.read().await;
        let items = guard
            .get(&key)
            .map(|checkpoints| {
                checkpoints
                    .iter()
                    .rev()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(|c| CheckpointListItem {
                        checkpoint_id: c.id.clone(),
                        metadata: c.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }
}
