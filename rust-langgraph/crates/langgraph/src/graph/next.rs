//! Next-step result from a graph node: follow the static edge, jump, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the static edge leaving the node; no edge (or an edge
///   into `END`) ends the run.
/// - **Node(id)**: run the node with that id next (conditional edge).
/// - **End**: stop and return the current state.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Continue,
    Node(String),
    End,
}
