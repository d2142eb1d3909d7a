//! `run`: execute every configured action in dependency order.
use anyhow::{Context as _, Result};
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, RunOpts};
use crate::context::ExecutionContext;
use crate::error::PersonalizerError;
use crate::exec::{Executor, SystemExecutor};
use crate::graph;
use crate::logging::{Log, Logger};
use crate::prompt::{ConsolePrompt, DecisionProvider, FixedDecision};

/// Run the `run` command.
///
/// # Errors
///
/// Returns an error if setup fails, an action fails, or the user stops the
/// run at a conflict.
pub fn run(global: &GlobalOpts, opts: &RunOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(global, opts, log, Arc::new(SystemExecutor))
}

/// [`run`] with an explicit command executor.
///
/// # Errors
///
/// Same as [`run`].
pub fn run_with(
    global: &GlobalOpts,
    opts: &RunOpts,
    log: &Arc<Logger>,
    executor: Arc<dyn Executor>,
) -> Result<()> {
    let version = option_env!("PERSONALIZER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("personalizer {version}"));

    let CommandSetup {
        app_dir,
        graph: mut execution_graph,
    } = CommandSetup::init(global, log.as_ref())?;

    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("creating app dir {}", app_dir.display()))?;

    let decisions: Box<dyn DecisionProvider> = match opts.on_conflict.decision() {
        Some(decision) => Box::new(FixedDecision::new(decision)),
        None => Box::new(ConsolePrompt),
    };
    let mut ctx = ExecutionContext::new(
        app_dir,
        Arc::clone(log) as Arc<dyn Log>,
        executor,
        decisions,
    )
    .with_ignore_conflicts(opts.ignore_conflicts);

    let result = graph::execute_graph(&mut execution_graph, &mut ctx);
    log.print_summary();

    let report = result.map_err(PersonalizerError::from)?;
    log.debug(&format!(
        "{} of {} action(s) applied changes",
        report.applied(),
        report.records.len()
    ));
    Ok(())
}
