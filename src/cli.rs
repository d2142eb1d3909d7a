//! Command-line argument model.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::actions::ModifiedDateDecision;

/// Top-level CLI entry point for the personalizer.
#[derive(Parser, Debug)]
#[command(
    name = "personalizer",
    about = "Dependency-ordered personal environment setup",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file (default: $PERSONALIZER_CONFIG, then ./personalizer.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the application directory used for remote checkouts
    #[arg(long, global = true)]
    pub app_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the dependency graph and execute every action
    Run(RunOpts),
    /// Print the execution order without running anything
    Plan(PlanOpts),
    /// Generate a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

/// How to answer modified-date conflicts during `run`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Prompt on the terminal
    #[default]
    Ask,
    /// Stop the run
    Stop,
    /// Skip the conflicting file
    Skip,
    /// Overwrite the conflicting file
    Proceed,
    /// Overwrite this and every later conflicting file
    Ignore,
}

impl ConflictPolicy {
    /// Fixed answer for every conflict, or `None` to prompt.
    #[must_use]
    pub const fn decision(self) -> Option<ModifiedDateDecision> {
        match self {
            Self::Ask => None,
            Self::Stop => Some(ModifiedDateDecision::StopExecution),
            Self::Skip => Some(ModifiedDateDecision::SkipThisAction),
            Self::Proceed => Some(ModifiedDateDecision::ProceedOnce),
            Self::Ignore => Some(ModifiedDateDecision::IgnoreInFuture),
        }
    }
}

/// Options for the `run` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RunOpts {
    /// Answer for modified-date conflicts
    #[arg(long, value_enum, default_value_t = ConflictPolicy::Ask)]
    pub on_conflict: ConflictPolicy,

    /// Overwrite destinations without comparing modified dates
    #[arg(long)]
    pub ignore_conflicts: bool,
}

/// Options for the `plan` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PlanOpts {
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
