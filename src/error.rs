//! Domain-specific error types for the personalizer engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`], [`BuildError`])
//! while command handlers at the CLI boundary convert them to [`anyhow::Error`]
//! via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! PersonalizerError
//! ├── Config(ConfigError)    — TOML parsing, field validation
//! ├── Build(BuildError)      — dependency resolution, cycles
//! └── Execute(ExecuteError)  — action failure or user stop during a run
//! ```
//!
//! Failures of individual actions are described by
//! [`ActionFailure`](crate::actions::ActionFailure), which
//! [`ExecuteError::Action`] wraps together with the failing action's key.

use thiserror::Error;

use crate::actions::ActionFailure;

/// Top-level error type for the personalizer engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum PersonalizerError {
    /// Configuration-related error (parsing, validation, I/O).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The dependency graph could not be built or ordered.
    #[error("Dependency graph error: {0}")]
    Build(#[from] BuildError),

    /// An action failed or the user stopped the run.
    #[error("Execution error: {0}")]
    Execute(#[from] ExecuteError),
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(String),

    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected layout.
    #[error("Invalid config in {path}: {message}")]
    Parse {
        /// Path to the offending file.
        path: String,
        /// Parser message, including the location of the problem.
        message: String,
    },

    /// An entry omitted a field its location type requires.
    #[error("Action '{key}' is missing required field '{field}'")]
    MissingField {
        /// Key of the incomplete entry.
        key: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A git location names a repository URL that cannot identify a checkout.
    #[error("Action '{key}' has an invalid repository URL '{url}'")]
    InvalidRepositoryUrl {
        /// Key of the entry.
        key: String,
        /// The rejected URL.
        url: String,
    },

    /// A git location's source path escapes the repository checkout.
    #[error("Action '{key}' has source path '{path}', which must stay inside the repository")]
    InvalidSourcePath {
        /// Key of the entry.
        key: String,
        /// The rejected path.
        path: String,
    },

    /// An entry has an empty or whitespace-only key.
    #[error("An entry in [[{section}]] has an empty key")]
    EmptyKey {
        /// Table array the entry belongs to.
        section: &'static str,
    },
}

/// Errors raised while building or ordering the dependency graph.
///
/// All of these are reported before any action has run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A dependency key does not name any configured action.
    #[error("Dependency key '{key}' (required by '{referenced_by}') does not refer to an action that exists")]
    BadDependencyReference {
        /// The unresolved key.
        key: String,
        /// Key of the action that declared the dependency.
        referenced_by: String,
    },

    /// Two actions of the same kind share a key.
    #[error("Duplicate {kind} action with key '{key}'")]
    DuplicateAction {
        /// Action kind (e.g. `"file sync"`).
        kind: &'static str,
        /// The repeated key.
        key: String,
    },

    /// Some actions can never be ordered because they depend on each other.
    #[error("Found circular dependency in dependency graph involving: {}", .keys.join(", "))]
    CircularDependency {
        /// Keys of the actions that could not be ordered, sorted.
        keys: Vec<String>,
    },

    /// The ordering pass visited more nodes than the graph holds.
    #[error("Hit an impossible state ({ordered} nodes ordered, {known} known); this is a scheduler bug")]
    InternalInvariantViolation {
        /// Length of the produced order.
        ordered: usize,
        /// Number of nodes counted by the reachability pass.
        known: usize,
    },
}

/// Errors that end a run of the execution graph.
#[derive(Error, Debug)]
pub enum ExecuteError {
    /// The graph could not be ordered.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// An action failed; remaining actions were not run.
    #[error("Action '{key}' failed: {source}")]
    Action {
        /// Key of the failing action.
        key: String,
        /// What went wrong.
        source: ActionFailure,
    },

    /// The user chose to stop at a modified-date conflict.
    #[error("Execution stopped by user at action '{key}'")]
    Stopped {
        /// Key of the action whose conflict prompt was answered with "stop".
        key: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_missing_field_display() {
        let e = ConfigError::MissingField {
            key: "vimrc".to_string(),
            field: "repository",
        };
        assert_eq!(
            e.to_string(),
            "Action 'vimrc' is missing required field 'repository'"
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/conf/personalizer.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/conf/personalizer.toml"));
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_empty_key_display() {
        let e = ConfigError::EmptyKey {
            section: "installations",
        };
        assert_eq!(e.to_string(), "An entry in [[installations]] has an empty key");
    }

    // -----------------------------------------------------------------------
    // BuildError
    // -----------------------------------------------------------------------

    #[test]
    fn bad_dependency_reference_names_missing_key() {
        let e = BuildError::BadDependencyReference {
            key: "ghost".to_string(),
            referenced_by: "x".to_string(),
        };
        assert!(e.to_string().contains("'ghost'"));
        assert!(e.to_string().contains("'x'"));
    }

    #[test]
    fn circular_dependency_lists_keys() {
        let e = BuildError::CircularDependency {
            keys: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "Found circular dependency in dependency graph involving: a, b"
        );
    }

    #[test]
    fn internal_invariant_violation_display() {
        let e = BuildError::InternalInvariantViolation {
            ordered: 5,
            known: 4,
        };
        assert!(e.to_string().contains("5 nodes ordered, 4 known"));
    }

    // -----------------------------------------------------------------------
    // ExecuteError
    // -----------------------------------------------------------------------

    #[test]
    fn execute_error_action_keeps_failure_as_source() {
        use std::error::Error as StdError;
        let e = ExecuteError::Action {
            key: "bashrc".to_string(),
            source: ActionFailure::FileExists {
                path: PathBuf::from("/home/u/.bashrc"),
            },
        };
        assert!(e.to_string().starts_with("Action 'bashrc' failed:"));
        assert!(e.source().is_some());
    }

    #[test]
    fn execute_error_stopped_display() {
        let e = ExecuteError::Stopped {
            key: "bashrc".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Execution stopped by user at action 'bashrc'"
        );
    }

    // -----------------------------------------------------------------------
    // PersonalizerError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn personalizer_error_from_build_error() {
        let e: PersonalizerError = BuildError::CircularDependency {
            keys: vec!["a".to_string()],
        }
        .into();
        assert!(e.to_string().contains("Dependency graph error"));
    }

    #[test]
    fn personalizer_error_from_config_error() {
        let e: PersonalizerError = ConfigError::NotFound("p.toml".to_string()).into();
        assert!(e.to_string().contains("Configuration error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<PersonalizerError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<BuildError>();
        assert_send_sync::<ExecuteError>();
    }

    #[test]
    fn execute_error_converts_to_anyhow() {
        let e = ExecuteError::Stopped {
            key: "x".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
