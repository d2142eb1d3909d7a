//! Dependency graph of actions: construction, ordering, and execution.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Node `0` is a
//! synthetic root wrapping a null action whose children are every action no
//! other action depends on. Edges point from an action to its dependencies,
//! so a walk from the root reaches dependents before dependencies and the
//! execution order is that walk reversed.
//!
//! Each walk gets a fresh [`TraversalId`]; nodes remember the latest walk
//! that visited them, so the ordering pass and the reachability count used to
//! validate it can run over the same graph any number of times.
mod builder;
mod node;
mod run;

use std::collections::HashSet;

pub use builder::build_graph;
pub use node::{GraphNode, NodeId, TraversalId};
pub use run::{ActionRecord, RunReport, execute_graph};

use crate::actions::{Action, ActionKind, EnvironmentCondition};
use crate::error::BuildError;

/// Key of the synthetic root action.
pub const ROOT_KEY: &str = "<root>";

const ROOT: NodeId = NodeId(0);

/// Actions linked by their dependencies, plus declared conditions.
#[derive(Debug)]
pub struct ExecutionGraph {
    nodes: Vec<GraphNode>,
    conditions: Vec<EnvironmentCondition>,
    next_traversal: u64,
}

impl ExecutionGraph {
    /// A graph holding only the root.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![GraphNode::new(Action::new(ROOT_KEY, ActionKind::Null))],
            conditions: Vec::new(),
            next_traversal: 0,
        }
    }

    /// Attach environment conditions. They are carried along, not evaluated.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Vec<EnvironmentCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Declared environment conditions.
    #[must_use]
    pub fn conditions(&self) -> &[EnvironmentCondition] {
        &self.conditions
    }

    /// The synthetic root.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        ROOT
    }

    /// Node `id`, if it exists.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id.0)
    }

    /// Number of actions, not counting the root.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Ids of every non-root node in declaration order.
    #[must_use]
    pub fn action_ids(&self) -> Vec<NodeId> {
        (1..self.nodes.len()).map(NodeId).collect()
    }

    fn push_node(&mut self, action: Action) -> NodeId {
        self.nodes.push(GraphNode::new(action));
        NodeId(self.nodes.len() - 1)
    }

    /// Record that `from` depends on `to`. Returns `false` if the edge
    /// already existed.
    fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let Some(parent) = self.node_mut(from) else {
            return false;
        };
        if parent.children.contains(&to) {
            return false;
        }
        parent.children.push(to);
        if let Some(child) = self.node_mut(to) {
            child.parents.push(from);
        }
        true
    }

    fn begin_traversal(&mut self) -> TraversalId {
        self.next_traversal += 1;
        TraversalId(self.next_traversal)
    }

    /// Number of nodes reachable from the root, counted under its own
    /// traversal.
    fn reachable_count(&mut self) -> usize {
        let traversal = self.begin_traversal();
        let mut stack = vec![ROOT];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            let Some(node) = self.node_mut(id) else {
                continue;
            };
            if node.was_visited(traversal) {
                continue;
            }
            node.mark_visited(traversal);
            stack.extend_from_slice(&node.children);
            count += 1;
        }
        count
    }

    fn parents_visited(&self, id: NodeId, traversal: TraversalId) -> bool {
        self.node(id).is_some_and(|node| {
            node.parents
                .iter()
                .all(|&p| self.node(p).is_some_and(|parent| parent.was_visited(traversal)))
        })
    }

    /// Order in which the actions must run: every action after all of its
    /// dependencies. The root comes last.
    ///
    /// Independent actions keep their declaration order.
    ///
    /// # Errors
    ///
    /// [`BuildError::CircularDependency`] when some actions can never be
    /// ordered, [`BuildError::InternalInvariantViolation`] when the walk
    /// yields more nodes than are reachable.
    pub fn execution_order(&mut self) -> Result<Vec<NodeId>, BuildError> {
        let known = self.reachable_count();
        let traversal = self.begin_traversal();

        let mut active = vec![ROOT];
        let mut ordered = Vec::with_capacity(self.nodes.len());
        while let Some(id) = active.pop() {
            let Some(node) = self.node_mut(id) else {
                continue;
            };
            node.mark_visited(traversal);
            ordered.push(id);
            let children = node.children.clone();
            for child in children {
                if self.parents_visited(child, traversal) {
                    active.push(child);
                }
            }
        }

        if ordered.len() > known {
            return Err(BuildError::InternalInvariantViolation {
                ordered: ordered.len(),
                known,
            });
        }
        if known < self.nodes.len() || ordered.len() < known {
            return Err(BuildError::CircularDependency {
                keys: self.unordered_keys(&ordered),
            });
        }

        ordered.reverse();
        Ok(ordered)
    }

    /// Keys of the actions in execution order, without the root.
    ///
    /// # Errors
    ///
    /// Same as [`execution_order`](Self::execution_order).
    pub fn planned_keys(&mut self) -> Result<Vec<String>, BuildError> {
        let order = self.execution_order()?;
        Ok(order
            .into_iter()
            .filter(|&id| id != ROOT)
            .filter_map(|id| self.node(id).map(|n| n.action().key().to_string()))
            .collect())
    }

    /// Whether following dependencies from `start` leads back to it.
    fn on_cycle(&self, start: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = self
            .node(start)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            if id == start {
                return true;
            }
            if seen.insert(id)
                && let Some(node) = self.node(id)
            {
                stack.extend_from_slice(&node.children);
            }
        }
        false
    }

    /// Sorted, de-duplicated keys of the unordered nodes that sit on a
    /// cycle. Nodes merely stuck behind a cycle are left out.
    fn unordered_keys(&self, ordered: &[NodeId]) -> Vec<String> {
        let placed: HashSet<NodeId> = ordered.iter().copied().collect();
        let unplaced: Vec<NodeId> = self
            .action_ids()
            .into_iter()
            .filter(|id| !placed.contains(id))
            .collect();
        let cyclic: Vec<NodeId> = unplaced
            .iter()
            .copied()
            .filter(|&id| self.on_cycle(id))
            .collect();
        let culprits = if cyclic.is_empty() { unplaced } else { cyclic };
        let mut keys: Vec<String> = culprits
            .into_iter()
            .filter_map(|id| self.node(id).map(|n| n.action().key().to_string()))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::actions::test_helpers::check_action;

    fn position(keys: &[String], key: &str) -> usize {
        keys.iter()
            .position(|k| k == key)
            .expect("key should be planned")
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn chain_runs_dependencies_first() {
        let mut graph = build_graph(vec![
            check_action("top", &["mid"]),
            check_action("base", &[]),
            check_action("mid", &["base"]),
        ])
        .unwrap();
        assert_eq!(graph.planned_keys().unwrap(), ["base", "mid", "top"]);
    }

    #[test]
    fn diamond_places_shared_dependency_once() {
        let mut graph = build_graph(vec![
            check_action("a", &[]),
            check_action("b", &["a"]),
            check_action("c", &["a"]),
            check_action("d", &["b", "c"]),
        ])
        .unwrap();
        let keys = graph.planned_keys().unwrap();

        assert_eq!(keys.len(), 4);
        assert_eq!(keys.first().map(String::as_str), Some("a"));
        assert_eq!(keys.last().map(String::as_str), Some("d"));
        assert!(position(&keys, "b") < position(&keys, "d"));
        assert!(position(&keys, "c") < position(&keys, "d"));
    }

    #[test]
    fn independent_actions_keep_declaration_order() {
        let mut graph = build_graph(vec![
            check_action("x", &[]),
            check_action("y", &[]),
            check_action("z", &[]),
        ])
        .unwrap();
        assert_eq!(graph.planned_keys().unwrap(), ["x", "y", "z"]);
    }

    #[test]
    fn root_is_ordered_last() {
        let mut graph = build_graph(vec![check_action("only", &[])]).unwrap();
        let order = graph.execution_order().unwrap();
        assert_eq!(order.last(), Some(&graph.root()));
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn every_action_follows_its_transitive_dependencies() {
        let mut graph = build_graph(vec![
            check_action("app", &["lang", "editor"]),
            check_action("editor", &["fonts"]),
            check_action("lang", &["toolchain"]),
            check_action("toolchain", &["fonts"]),
            check_action("fonts", &[]),
            check_action("dotfiles", &[]),
        ])
        .unwrap();
        let keys = graph.planned_keys().unwrap();
        for (dependent, dependency) in [
            ("app", "lang"),
            ("app", "editor"),
            ("app", "toolchain"),
            ("app", "fonts"),
            ("editor", "fonts"),
            ("lang", "toolchain"),
            ("toolchain", "fonts"),
        ] {
            assert!(
                position(&keys, dependency) < position(&keys, dependent),
                "{dependency} should precede {dependent} in {keys:?}"
            );
        }
        assert_eq!(keys.len(), 6);
    }

    // -----------------------------------------------------------------------
    // Reentrant traversal
    // -----------------------------------------------------------------------

    #[test]
    fn repeated_ordering_is_stable() {
        let mut graph = build_graph(vec![
            check_action("base", &[]),
            check_action("mid", &["base"]),
            check_action("top", &["mid"]),
        ])
        .unwrap();
        let first = graph.planned_keys().unwrap();
        let second = graph.planned_keys().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn each_walk_uses_a_fresh_traversal_id() {
        let mut graph = build_graph(vec![check_action("a", &[])]).unwrap();
        let before = graph.next_traversal;
        graph.execution_order().unwrap();
        assert_eq!(graph.next_traversal, before + 2);

        let root = graph.node(graph.root()).unwrap();
        assert!(!root.was_visited(TraversalId(before + 1)));
        assert!(root.was_visited(TraversalId(before + 2)));
        assert!(!root.was_visited(TraversalId(before + 3)));
    }

    #[test]
    fn visit_marks_do_not_accumulate() {
        let mut graph = build_graph(vec![check_action("a", &[]), check_action("b", &["a"])]).unwrap();
        for _ in 0..50 {
            graph.execution_order().unwrap();
        }
        let latest = TraversalId(graph.next_traversal);
        for id in graph.action_ids() {
            let node = graph.node(id).unwrap();
            assert!(node.was_visited(latest));
            assert!(!node.was_visited(TraversalId(latest.0 - 1)));
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn duplicated_edge_is_an_invariant_violation() {
        let mut graph = build_graph(vec![check_action("a", &[])]).unwrap();
        let a = graph.action_ids()[0];
        graph.nodes[0].children.push(a);
        graph.nodes[a.index()].parents.push(ROOT);

        assert_eq!(
            graph.execution_order().unwrap_err(),
            BuildError::InternalInvariantViolation {
                ordered: 3,
                known: 2
            }
        );
    }

    #[test]
    fn add_edge_ignores_repeats() {
        let mut graph = ExecutionGraph::new();
        let a = graph.push_node(check_action("a", &[]));
        let b = graph.push_node(check_action("b", &[]));
        assert!(graph.add_edge(a, b));
        assert!(!graph.add_edge(a, b));
        assert_eq!(graph.node(a).unwrap().children(), [b]);
        assert_eq!(graph.node(b).unwrap().parents(), [a]);
    }

    #[test]
    fn conditions_are_carried() {
        let graph = ExecutionGraph::new()
            .with_conditions(vec![EnvironmentCondition::new("laptop", None)]);
        assert_eq!(graph.conditions().len(), 1);
        assert_eq!(graph.action_count(), 0);
    }
}
