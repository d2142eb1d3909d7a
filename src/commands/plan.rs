//! `plan`: show the execution order without running anything.
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::fmt::Write as _;

use super::CommandSetup;
use crate::cli::{GlobalOpts, PlanOpts};
use crate::error::BuildError;
use crate::graph::ExecutionGraph;
use crate::logging::Logger;

/// One planned action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    /// 1-based position in the execution order.
    pub step: usize,
    /// Action key.
    pub key: String,
    /// Action kind.
    pub kind: &'static str,
    /// Declared dependency keys.
    pub depends_on: Vec<String>,
}

/// What `run` would do, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Actions in execution order.
    pub actions: Vec<PlanEntry>,
    /// Declared environment conditions, which are not evaluated.
    pub conditions: Vec<String>,
}

impl Plan {
    /// Order `graph` without executing it.
    ///
    /// # Errors
    ///
    /// The graph's ordering errors.
    pub fn from_graph(graph: &mut ExecutionGraph) -> Result<Self, BuildError> {
        let root = graph.root();
        let actions = graph
            .execution_order()?
            .into_iter()
            .filter(|&id| id != root)
            .filter_map(|id| graph.node(id))
            .enumerate()
            .map(|(i, node)| {
                let action = node.action();
                PlanEntry {
                    step: i + 1,
                    key: action.key().to_string(),
                    kind: action.tag().as_str(),
                    depends_on: action.dependency_keys().to_vec(),
                }
            })
            .collect();
        let conditions = graph.conditions().iter().map(|c| c.key.clone()).collect();
        Ok(Self {
            actions,
            conditions,
        })
    }

    /// Human-readable listing, one action per line.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.actions {
            let _ = write!(out, "{:>3}. {} '{}'", entry.step, entry.kind, entry.key);
            if !entry.depends_on.is_empty() {
                let _ = write!(out, " (after: {})", entry.depends_on.join(", "));
            }
            out.push('\n');
        }
        if self.actions.is_empty() {
            out.push_str("nothing to do\n");
        }
        if !self.conditions.is_empty() {
            let _ = writeln!(
                out,
                "environment conditions (not evaluated): {}",
                self.conditions.join(", ")
            );
        }
        out
    }
}

/// Run the `plan` command.
///
/// # Errors
///
/// Returns an error if setup fails or the plan cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(global, log)?;
    let plan = Plan::from_graph(&mut setup.graph)?;

    if opts.json {
        let json = serde_json::to_string_pretty(&plan).context("serializing plan")?;
        println!("{json}");
    } else {
        log.stage("Execution plan");
        print!("{}", plan.render_text());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::actions::test_helpers::check_action;
    use crate::actions::EnvironmentCondition;
    use crate::graph::build_graph;

    fn sample_plan() -> Plan {
        let mut graph = build_graph(vec![
            check_action("zsh", &["git"]),
            check_action("git", &[]),
            check_action("fonts", &[]),
        ])
        .unwrap()
        .with_conditions(vec![EnvironmentCondition::new("laptop", None)]);
        Plan::from_graph(&mut graph).unwrap()
    }

    #[test]
    fn text_plan_lists_actions_in_order() {
        insta::assert_snapshot!(sample_plan().render_text(), @r"
          1. installation 'git'
          2. installation 'zsh' (after: git)
          3. installation 'fonts'
        environment conditions (not evaluated): laptop
        ");
    }

    #[test]
    fn empty_plan_says_so() {
        let mut graph = build_graph(Vec::new()).unwrap();
        let plan = Plan::from_graph(&mut graph).unwrap();
        assert_eq!(plan.render_text(), "nothing to do\n");
    }

    #[test]
    fn json_plan_is_structured() {
        let json = serde_json::to_value(sample_plan()).unwrap();
        assert_eq!(json["actions"][1]["key"], "zsh");
        assert_eq!(json["actions"][1]["kind"], "installation");
        assert_eq!(json["actions"][1]["depends_on"][0], "git");
        assert_eq!(json["conditions"][0], "laptop");
    }
}
