//! Typed failures raised while executing a single action.
//!
//! [`ActionFailure`] describes what went wrong; [`ActionError`] adds the
//! non-failure way an action can end a run (the user choosing to stop).
use std::path::PathBuf;

use thiserror::Error;

/// Ways an action can fail.
#[derive(Error, Debug)]
pub enum ActionFailure {
    /// The destination already exists and overwriting was not requested.
    #[error("{} already exists and overwrite is not enabled", .path.display())]
    FileExists {
        /// The existing destination file.
        path: PathBuf,
    },

    /// Copying the source onto the destination failed.
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    CopyFailed {
        /// Source file.
        from: PathBuf,
        /// Destination file.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A check-only installation found the software missing.
    #[error("check '{check}' failed and no install command is configured")]
    CheckOnlyNotInstalled {
        /// The check command line.
        check: String,
    },

    /// The install command exited non-zero.
    #[error("install command '{command}' failed (exit {exit_code}): {stderr}")]
    InstallCommandFailed {
        /// The install command line.
        command: String,
        /// Exit code, `-1` when the process was killed by a signal.
        exit_code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// A check or install command could not be started at all.
    #[error("could not run '{command}': {reason}")]
    CommandSpawn {
        /// The command line.
        command: String,
        /// Why spawning failed.
        reason: String,
    },

    /// Cloning a remote repository or reading its history failed.
    #[error("failed to fetch {repository}: {reason}")]
    FetchFailure {
        /// Repository URL.
        repository: String,
        /// Error text from git.
        reason: String,
    },

    /// A file location's path does not exist.
    #[error("path not found: {}", .path.display())]
    PathNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A file location's content or timestamp could not be read because it
    /// does not exist.
    #[error("file not found: {}", .path.display())]
    NotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// A file exists but reading it failed for another reason.
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The location kind cannot perform the requested operation.
    #[error("operation '{operation}' is not supported for {location}")]
    NotSupported {
        /// Name of the operation (e.g. `"path"`).
        operation: &'static str,
        /// Description of the location.
        location: String,
    },

    /// A source path has no final component to copy into a directory.
    #[error("source {} does not name a file", .path.display())]
    InvalidSource {
        /// The offending source path.
        path: PathBuf,
    },
}

/// Why an action did not complete normally.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The action failed.
    #[error(transparent)]
    Failed(#[from] ActionFailure),

    /// The user answered a conflict prompt with "stop".
    #[error("stopped by user")]
    UserStopped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn file_exists_display() {
        let e = ActionFailure::FileExists {
            path: PathBuf::from("/home/u/.vimrc"),
        };
        assert_eq!(
            e.to_string(),
            "/home/u/.vimrc already exists and overwrite is not enabled"
        );
    }

    #[test]
    fn copy_failed_keeps_io_source() {
        let e = ActionFailure::CopyFailed {
            from: PathBuf::from("a"),
            to: PathBuf::from("b"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("failed to copy a to b"));
        assert!(e.source().is_some());
    }

    #[test]
    fn install_command_failed_display() {
        let e = ActionFailure::InstallCommandFailed {
            command: "apt-get install git".to_string(),
            exit_code: 100,
            stderr: "E: Unable to locate package".to_string(),
        };
        assert!(e.to_string().contains("exit 100"));
        assert!(e.to_string().contains("Unable to locate package"));
    }

    #[test]
    fn not_supported_display() {
        let e = ActionFailure::NotSupported {
            operation: "path",
            location: "remote file".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "operation 'path' is not supported for remote file"
        );
    }

    #[test]
    fn action_error_is_transparent_over_failure() {
        let e: ActionError = ActionFailure::CheckOnlyNotInstalled {
            check: "which zsh".to_string(),
        }
        .into();
        assert_eq!(
            e.to_string(),
            "check 'which zsh' failed and no install command is configured"
        );
    }

    #[test]
    fn user_stopped_display() {
        assert_eq!(ActionError::UserStopped.to_string(), "stopped by user");
    }
}
