//! Checkpoint and metadata types.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Process-wide sequence so two checkpoints taken in the same millisecond
/// still get distinct ids.
static CHECKPOINT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Metadata for a single checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Node step within the run that produced the checkpoint; 0 is the input.
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// What produced the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointSource {
    /// State passed to `invoke` / `stream`.
    Input,
    /// State returned by a node.
    Loop,
    /// State written from outside a run.
    Update,
}

/// One checkpoint: state snapshot plus id and timestamp.
///
/// Stored by a `Checkpointer` keyed by (thread_id, checkpoint_ns, id).
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    pub ts: String,
    pub channel_values: S,
    pub channel_versions: HashMap<String, u64>,
    pub metadata: CheckpointMetadata,
}

/// Item returned by `Checkpointer::list`.
#[derive(Debug, Clone)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Builds a checkpoint from the current state, stamped with the current time.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = format!(
            "{}",
            now.duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0)
        );
        let seq = CHECKPOINT_SEQ.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("{ts}-{seq}-{step}"),
            ts,
            channel_values: state,
            channel_versions: HashMap::new(),
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }
}
