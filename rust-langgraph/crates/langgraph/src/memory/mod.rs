//! Memory: run config, checkpoints and checkpointers.
//!
//! A checkpointer persists graph state per conversation thread so a later run
//! can resume it. `MemorySaver` keeps everything in process memory.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::{RunnableConfig, AUTHORIZATION_KEY};
pub use memory_saver::MemorySaver;
