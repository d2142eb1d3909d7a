//! Arena nodes and traversal identifiers.
use std::fmt;

use crate::actions::Action;

/// Index of a node in its [`ExecutionGraph`](super::ExecutionGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

impl NodeId {
    /// Position in the arena; the root is always `0`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Token scoping "visited" marks to a single walk over the graph. Ids only
/// grow, so a node needs to remember just the latest walk that reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraversalId(pub(super) u64);

/// One action plus its edges.
///
/// `children` are the node's dependencies (they run first); `parents` are
/// the nodes that depend on it.
#[derive(Debug)]
pub struct GraphNode {
    action: Action,
    pub(super) children: Vec<NodeId>,
    pub(super) parents: Vec<NodeId>,
    last_visit: Option<TraversalId>,
}

impl GraphNode {
    pub(super) fn new(action: Action) -> Self {
        Self {
            action,
            children: Vec::new(),
            parents: Vec::new(),
            last_visit: None,
        }
    }

    /// The wrapped action.
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.action
    }

    pub(super) const fn action_mut(&mut self) -> &mut Action {
        &mut self.action
    }

    /// Dependencies of this node, in declaration order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Nodes that declared this one as a dependency.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Whether the walk `traversal` has reached this node. Only the most
    /// recent walk is remembered.
    #[must_use]
    pub fn was_visited(&self, traversal: TraversalId) -> bool {
        self.last_visit == Some(traversal)
    }

    pub(super) const fn mark_visited(&mut self, traversal: TraversalId) {
        self.last_visit = Some(traversal);
    }
}
