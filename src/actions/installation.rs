//! Check for a piece of software and install it when missing.
use super::error::{ActionError, ActionFailure};
use super::ActionOutcome;
use crate::context::ExecutionContext;
use crate::exec::ExecResult;

/// Where an installation stands after its last check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    /// The check has not run yet.
    NotChecked,
    /// The check command exited zero.
    Installed,
    /// The check command exited non-zero.
    NotInstalled,
}

/// A check command plus an optional install command.
#[derive(Debug)]
pub struct Installation {
    check: String,
    install: Option<String>,
    state: InstallState,
}

impl Installation {
    /// Installation verified by `check` and remedied by `install`, if any.
    #[must_use]
    pub fn new(check: impl Into<String>, install: Option<String>) -> Self {
        Self {
            check: check.into(),
            install,
            state: InstallState::NotChecked,
        }
    }

    /// Check command line.
    #[must_use]
    pub fn check(&self) -> &str {
        &self.check
    }

    /// Install command line, if configured.
    #[must_use]
    pub fn install(&self) -> Option<&str> {
        self.install.as_deref()
    }

    /// State after the most recent check.
    #[must_use]
    pub const fn state(&self) -> InstallState {
        self.state
    }

    /// Run `check`, falling back to `install` when it fails.
    ///
    /// A successful install whose re-check still fails is logged and
    /// reported as [`ActionOutcome::Unverified`] rather than an error.
    ///
    /// # Errors
    ///
    /// [`ActionFailure::CheckOnlyNotInstalled`] when nothing can be
    /// installed, [`ActionFailure::InstallCommandFailed`] when the install
    /// command exits non-zero, and [`ActionFailure::CommandSpawn`] when a
    /// command cannot be started.
    pub fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<ActionOutcome, ActionError> {
        self.state = self.run_check(ctx)?;
        if self.state == InstallState::Installed {
            ctx.log.debug(&format!("check passed: {}", self.check));
            return Ok(ActionOutcome::AlreadyCorrect);
        }

        let Some(install) = &self.install else {
            return Err(ActionFailure::CheckOnlyNotInstalled {
                check: self.check.clone(),
            }
            .into());
        };

        ctx.log.info(&format!("installing: {install}"));
        let result = run(ctx, install)?;
        if !result.success {
            return Err(ActionFailure::InstallCommandFailed {
                command: install.clone(),
                exit_code: result.code.unwrap_or(-1),
                stderr: result.stderr.trim().to_string(),
            }
            .into());
        }

        self.state = self.run_check(ctx)?;
        if self.state == InstallState::Installed {
            return Ok(ActionOutcome::Applied);
        }
        let reason = format!("'{}' still fails after a successful install", self.check);
        ctx.log.warn(&reason);
        Ok(ActionOutcome::Unverified { reason })
    }

    fn run_check(&self, ctx: &ExecutionContext) -> Result<InstallState, ActionFailure> {
        let result = run(ctx, &self.check)?;
        Ok(if result.success {
            InstallState::Installed
        } else {
            InstallState::NotInstalled
        })
    }
}

/// Run `command` through the context's shell.
fn run(ctx: &ExecutionContext, command: &str) -> Result<ExecResult, ActionFailure> {
    ctx.executor
        .run_shell(command)
        .map_err(|e| ActionFailure::CommandSpawn {
            command: command.to_string(),
            reason: format!("{e:#}"),
        })
}
