//! Execute a built graph action by action.
use super::{ExecutionGraph, ROOT};
use crate::actions::{ActionError, ActionOutcome, ActionTag};
use crate::context::ExecutionContext;
use crate::error::ExecuteError;
use crate::logging::{ActionStatus, Log};

/// Outcome of one executed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Action key.
    pub key: String,
    /// Action kind.
    pub tag: ActionTag,
    /// What happened.
    pub outcome: ActionOutcome,
}

/// Everything that ran during a successful execution, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One record per executed action; the root is omitted.
    pub records: Vec<ActionRecord>,
}

impl RunReport {
    /// Keys in execution order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.key.as_str()).collect()
    }

    /// Number of actions that changed something.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == ActionOutcome::Applied)
            .count()
    }
}

/// Run every action in dependency order, stopping at the first failure.
///
/// Environment conditions on the graph are reported but not evaluated.
///
/// # Errors
///
/// - [`ExecuteError::Build`] if the graph cannot be ordered.
/// - [`ExecuteError::Action`] for the first action that fails.
/// - [`ExecuteError::Stopped`] when the user stops the run at a conflict.
pub fn execute_graph(
    graph: &mut ExecutionGraph,
    ctx: &mut ExecutionContext,
) -> Result<RunReport, ExecuteError> {
    if !graph.conditions().is_empty() {
        ctx.log.warn(&format!(
            "{} environment condition(s) declared but not evaluated",
            graph.conditions().len()
        ));
    }

    let order = graph.execution_order()?;
    let mut report = RunReport::default();

    for id in order {
        let is_root = id == ROOT;
        let Some(node) = graph.node_mut(id) else {
            continue;
        };
        let action = node.action_mut();
        let name = action.to_string();
        if !is_root {
            ctx.log.stage(&name);
        }

        match action.execute(ctx) {
            Ok(_) if is_root => {}
            Ok(outcome) => {
                record_outcome(ctx.log.as_ref(), &name, &outcome);
                report.records.push(ActionRecord {
                    key: action.key().to_string(),
                    tag: action.tag(),
                    outcome,
                });
            }
            Err(ActionError::Failed(failure)) => {
                let message = failure.to_string();
                ctx.log.error(&format!("{name} failed: {message}"));
                ctx.log
                    .record_action(&name, ActionStatus::Failed, Some(&message));
                return Err(ExecuteError::Action {
                    key: action.key().to_string(),
                    source: failure,
                });
            }
            Err(ActionError::UserStopped) => {
                ctx.log.warn(&format!("execution stopped at {name}"));
                ctx.log.record_action(&name, ActionStatus::Stopped, None);
                return Err(ExecuteError::Stopped {
                    key: action.key().to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn record_outcome(log: &dyn Log, name: &str, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Applied => log.record_action(name, ActionStatus::Ok, None),
        ActionOutcome::AlreadyCorrect => log.record_action(name, ActionStatus::Unchanged, None),
        ActionOutcome::Skipped { reason } => {
            log.record_action(name, ActionStatus::Skipped, Some(reason));
        }
        ActionOutcome::Unverified { reason } => {
            log.record_action(name, ActionStatus::Unverified, Some(reason));
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::actions::test_helpers::{check_action, recording_context, MockExecutor};
    use crate::actions::{Action, ActionFailure, ActionKind, EnvironmentCondition, FileLocation, FileSync};
    use crate::graph::build_graph;
    use chrono::{TimeZone as _, Utc};
    use std::fs::{self, File};
    use std::sync::Arc;
    use std::time::SystemTime;

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[test]
    fn chain_executes_dependencies_first() {
        let executor = Arc::new(MockExecutor::always(true));
        let (mut ctx, log) = recording_context(Arc::clone(&executor));
        let mut graph = build_graph(vec![
            check_action("top", &["mid"]),
            check_action("mid", &["base"]),
            check_action("base", &[]),
        ])
        .unwrap();

        let report = execute_graph(&mut graph, &mut ctx).unwrap();

        assert_eq!(report.keys(), ["base", "mid", "top"]);
        assert_eq!(executor.commands(), ["check base", "check mid", "check top"]);
        assert_eq!(
            log.actions(),
            [
                ("installation 'base'".to_string(), ActionStatus::Unchanged),
                ("installation 'mid'".to_string(), ActionStatus::Unchanged),
                ("installation 'top'".to_string(), ActionStatus::Unchanged),
            ]
        );
    }

    #[test]
    fn root_is_not_recorded() {
        let executor = Arc::new(MockExecutor::always(true));
        let (mut ctx, log) = recording_context(executor);
        let mut graph = build_graph(Vec::new()).unwrap();

        let report = execute_graph(&mut graph, &mut ctx).unwrap();
        assert!(report.records.is_empty());
        assert!(log.actions().is_empty());
    }

    #[test]
    fn install_outcome_is_reported_as_applied() {
        let executor = Arc::new(MockExecutor::with_responses(vec![false, true, true]));
        let (mut ctx, log) = recording_context(Arc::clone(&executor));
        let action = Action::new(
            "rg",
            ActionKind::Installation(crate::actions::Installation::new(
                "which rg",
                Some("cargo install ripgrep".into()),
            )),
        );
        let mut graph = build_graph(vec![action]).unwrap();

        let report = execute_graph(&mut graph, &mut ctx).unwrap();
        assert_eq!(report.applied(), 1);
        assert_eq!(log.actions()[0].1, ActionStatus::Ok);
    }

    // -----------------------------------------------------------------------
    // Failure handling
    // -----------------------------------------------------------------------

    #[test]
    fn first_failure_stops_the_run() {
        let executor = Arc::new(MockExecutor::with_responses(vec![true, false, true]));
        let (mut ctx, log) = recording_context(Arc::clone(&executor));
        let mut graph = build_graph(vec![
            check_action("first", &[]),
            check_action("second", &[]),
            check_action("third", &[]),
        ])
        .unwrap();

        let err = execute_graph(&mut graph, &mut ctx).unwrap_err();

        assert!(matches!(
            err,
            ExecuteError::Action {
                ref key,
                source: ActionFailure::CheckOnlyNotInstalled { .. },
            } if key == "second"
        ));
        assert_eq!(executor.commands(), ["check first", "check second"]);
        assert_eq!(log.errors().len(), 1);
        assert_eq!(
            log.actions().last().map(|(_, s)| *s),
            Some(ActionStatus::Failed)
        );
    }

    #[test]
    fn failed_dependency_prevents_dependent() {
        let executor = Arc::new(MockExecutor::with_responses(vec![false]));
        let (mut ctx, _log) = recording_context(Arc::clone(&executor));
        let mut graph = build_graph(vec![
            check_action("app", &["lib"]),
            check_action("lib", &[]),
        ])
        .unwrap();

        assert!(execute_graph(&mut graph, &mut ctx).is_err());
        assert_eq!(executor.commands(), ["check lib"]);
    }

    #[test]
    fn stop_decision_ends_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.conf");
        let dst = dir.path().join("dst.conf");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "local").unwrap();
        File::options()
            .write(true)
            .open(&dst)
            .unwrap()
            .set_modified(SystemTime::from(
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ))
            .unwrap();

        let executor = Arc::new(MockExecutor::always(true));
        let (mut ctx, log) = recording_context(Arc::clone(&executor));
        let mut graph = build_graph(vec![
            Action::new(
                "conf",
                ActionKind::FileSync(FileSync::new(FileLocation::local(&src), &dst, true)),
            ),
            check_action("after", &[]),
        ])
        .unwrap();

        let err = execute_graph(&mut graph, &mut ctx).unwrap_err();

        assert!(matches!(err, ExecuteError::Stopped { ref key } if key == "conf"));
        assert!(executor.commands().is_empty());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "local");
        assert_eq!(
            log.actions(),
            [("file sync 'conf'".to_string(), ActionStatus::Stopped)]
        );
    }

    // -----------------------------------------------------------------------
    // Conditions
    // -----------------------------------------------------------------------

    #[test]
    fn declared_conditions_are_warned_about() {
        let executor = Arc::new(MockExecutor::always(true));
        let (mut ctx, log) = recording_context(executor);
        let mut graph = build_graph(vec![check_action("a", &[])])
            .unwrap()
            .with_conditions(vec![EnvironmentCondition::new("work-laptop", None)]);

        execute_graph(&mut graph, &mut ctx).unwrap();
        assert!(log.warnings().iter().any(|w| w.contains("not evaluated")));
    }
}
