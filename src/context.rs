//! Run-wide state handed to every action.
use std::path::PathBuf;
use std::sync::Arc;

use crate::exec::Executor;
use crate::logging::Log;
use crate::prompt::DecisionProvider;

/// Shared context for one execution of the graph.
pub struct ExecutionContext {
    /// Application directory; remote repositories are checked out here.
    pub app_dir: PathBuf,
    /// Logger for output and action recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    decisions: Box<dyn DecisionProvider>,
    ignore_conflicts: bool,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("app_dir", &self.app_dir)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("decisions", &"<dyn DecisionProvider>")
            .field("ignore_conflicts", &self.ignore_conflicts)
            .finish()
    }
}

impl ExecutionContext {
    /// Create a context that prompts through `decisions` and starts with
    /// conflict checking enabled.
    #[must_use]
    pub fn new(
        app_dir: impl Into<PathBuf>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        decisions: Box<dyn DecisionProvider>,
    ) -> Self {
        Self {
            app_dir: app_dir.into(),
            log,
            executor,
            decisions,
            ignore_conflicts: false,
        }
    }

    /// Start the run with modified-date conflicts already ignored.
    #[must_use]
    pub fn with_ignore_conflicts(mut self, ignore: bool) -> Self {
        self.ignore_conflicts = ignore;
        self
    }

    /// Whether file syncs should skip the modified-date comparison.
    #[must_use]
    pub const fn ignores_conflicts(&self) -> bool {
        self.ignore_conflicts
    }

    /// Ignore every remaining conflict in this run.
    ///
    /// There is no way to turn checking back on.
    pub const fn ignore_future_conflicts(&mut self) {
        self.ignore_conflicts = true;
    }

    /// The provider answering modified-date conflicts.
    #[must_use]
    pub fn decisions(&self) -> &dyn DecisionProvider {
        self.decisions.as_ref()
    }
}
