//! Process execution behind an injectable [`Executor`].
use anyhow::{Context as _, Result};
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, when the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external processes.
///
/// Actions only talk to the operating system through this trait so tests can
/// substitute a scripted implementation.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` with `args`, returning the result even on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only when the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command line through the platform shell (`sh -c` or `cmd /C`).
    ///
    /// # Errors
    ///
    /// Returns an error only when the shell cannot be spawned.
    fn run_shell(&self, command_line: &str) -> Result<ExecResult> {
        let (shell, flag) = platform_shell();
        self.run_unchecked(shell, &[flag, command_line])
    }
}

/// Shell program and its "run this string" flag for the current platform.
#[must_use]
pub const fn platform_shell() -> (&'static str, &'static str) {
    if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") }
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        run_unchecked(program, args)
    }
}

/// Run a command, allowing failure (returns result without bailing).
///
/// # Errors
///
/// Returns an error if the process cannot be spawned.
pub fn run_unchecked(program: &str, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute: {program}"))?;

    Ok(ExecResult::from(output))
}
