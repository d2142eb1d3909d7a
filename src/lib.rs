//! Dependency-ordered personal environment setup.
//!
//! A configuration file declares actions (file syncs from local paths or git
//! repositories, and software installations guarded by check commands) along
//! with the keys of the actions each one depends on. The engine links them
//! into a graph, rejects unknown keys, duplicates and cycles before anything
//! runs, and then executes every action after all of its dependencies,
//! stopping at the first failure.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: parse and validate the TOML file into [`actions::Action`]s
//! - **[`actions`]**: idempotent units of work and their file locations
//! - **[`graph`]**: dependency resolution, ordering, and execution
//! - **[`commands`]**: top-level subcommand orchestration (`run`, `plan`, …)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod prompt;
