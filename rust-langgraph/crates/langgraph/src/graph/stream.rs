//! Events emitted by `CompiledStateGraph::stream`.

/// One event of a streamed graph run.
///
/// A successful run yields one `Node` event per executed node followed by a
/// single `End`. A failed run yields `Error` as its last event.
#[derive(Debug, Clone)]
pub enum StreamEvent<S> {
    /// A node finished; `state` is the state it returned.
    Node { id: String, state: S },
    /// The run reached its terminal state.
    End { state: S },
    /// The run failed; no further events follow.
    Error { message: String },
}
