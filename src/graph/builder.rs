//! Link declared actions into an [`ExecutionGraph`].
use std::collections::{HashMap, HashSet};

use super::{ExecutionGraph, NodeId, ROOT};
use crate::actions::Action;
use crate::error::BuildError;

/// Build and validate the graph for `actions`.
///
/// Each dependency key resolves to every other action carrying that key,
/// whatever its kind; only a key that names nothing but the declaring action
/// links it to itself. Actions nobody depends on hang off the root in declaration
/// order. The finished graph is ordered once so cycles surface here rather
/// than at execution time.
///
/// # Errors
///
/// - [`BuildError::DuplicateAction`] if two actions share kind and key.
/// - [`BuildError::BadDependencyReference`] if a dependency key matches no
///   action.
/// - [`BuildError::CircularDependency`] if the dependencies form a cycle.
pub fn build_graph(actions: Vec<Action>) -> Result<ExecutionGraph, BuildError> {
    let mut graph = ExecutionGraph::new();
    let mut identities = HashSet::new();
    let mut by_key: HashMap<String, Vec<NodeId>> = HashMap::new();

    for action in actions {
        let key = action.key().to_string();
        if !identities.insert((action.tag(), key.clone())) {
            return Err(BuildError::DuplicateAction {
                kind: action.tag().as_str(),
                key,
            });
        }
        let id = graph.push_node(action);
        by_key.entry(key).or_default().push(id);
    }

    let mut depended_upon = HashSet::new();
    for id in graph.action_ids() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let key = node.action().key().to_string();
        let dependencies = node.action().dependency_keys().to_vec();

        for dependency in dependencies {
            let targets =
                by_key
                    .get(&dependency)
                    .ok_or_else(|| BuildError::BadDependencyReference {
                        key: dependency.clone(),
                        referenced_by: key.clone(),
                    })?;
            let others: Vec<NodeId> = targets.iter().copied().filter(|&t| t != id).collect();
            let resolved = if others.is_empty() { targets } else { &others };
            for &target in resolved {
                graph.add_edge(id, target);
                depended_upon.insert(target);
            }
        }
    }

    for id in graph.action_ids() {
        if !depended_upon.contains(&id) {
            graph.add_edge(ROOT, id);
        }
    }

    let order = graph.execution_order()?;
    tracing::debug!(
        actions = graph.action_count(),
        roots = graph.node(ROOT).map_or(0, |n| n.children().len()),
        ordered = order.len().saturating_sub(1),
        "dependency graph built"
    );
    Ok(graph)
}
