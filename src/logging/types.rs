//! Core logging types: action entries, status, and the [`Log`] trait.

/// Outcome of one action, kept for the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    /// Action description (e.g. `installation 'git'`).
    pub name: String,
    /// Final status of the action.
    pub status: ActionStatus,
    /// Optional detail such as a skip reason or error text.
    pub message: Option<String>,
}

/// Status of a completed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// The action changed the machine.
    Ok,
    /// The machine was already in the desired state.
    Unchanged,
    /// The action was skipped after a modified-date conflict.
    Skipped,
    /// The install command succeeded but the check still fails.
    Unverified,
    /// The action failed and the run was aborted.
    Failed,
    /// The user stopped the run at this action.
    Stopped,
}

impl ActionStatus {
    /// Lowercase label used in log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
            Self::Unverified => "unverified",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation;
/// tests substitute a recording implementation to assert on warnings.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record an action result for the summary.
    fn record_action(&self, name: &str, status: ActionStatus, message: Option<&str>);
}
