//! Idempotent setup actions executed by the dependency graph.
//!
//! An [`Action`] pairs a user-supplied key and its dependency keys with one of
//! the concrete behaviours in [`ActionKind`]. Execution is dispatched with a
//! plain `match`, so adding a kind means adding a variant here.
pub mod condition;
pub mod error;
pub mod file_sync;
pub mod fs;
pub mod installation;
pub mod location;

use std::fmt;

pub use condition::EnvironmentCondition;
pub use error::{ActionError, ActionFailure};
pub use file_sync::FileSync;
pub use installation::{InstallState, Installation};
pub use location::{
    FileLocation, LocalFileLocation, ModifiedDateConflict, ModifiedDateDecision, NewerSide,
    RemoteFileLocation,
};

use crate::context::ExecutionContext;

/// Result of executing an action.
///
/// # Examples
///
/// ```
/// use personalizer_cli::actions::ActionOutcome;
///
/// let applied = ActionOutcome::Applied;
/// let skipped = ActionOutcome::Skipped { reason: "modified-date conflict".into() };
/// assert_ne!(applied, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action changed something.
    Applied,
    /// Nothing needed to change.
    AlreadyCorrect,
    /// The action chose not to run (e.g. the user skipped a conflict).
    Skipped {
        /// Why it was skipped.
        reason: String,
    },
    /// An install succeeded but its check still fails.
    Unverified {
        /// What could not be verified.
        reason: String,
    },
}

/// Kind of an action, part of its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionTag {
    /// The synthetic root.
    Null,
    /// A [`FileSync`].
    FileSync,
    /// An [`Installation`].
    Installation,
}

impl ActionTag {
    /// Human-readable name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::FileSync => "file sync",
            Self::Installation => "installation",
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete behaviour of an action.
#[derive(Debug)]
pub enum ActionKind {
    /// Does nothing; only used for the graph root.
    Null,
    /// Copy a file into place.
    FileSync(FileSync),
    /// Check for and install software.
    Installation(Installation),
}

/// A unit of work identified by its kind and key.
#[derive(Debug)]
pub struct Action {
    key: String,
    dependency_keys: Vec<String>,
    kind: ActionKind,
}

impl Action {
    /// Action `key` performing `kind`, with no dependencies.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            key: key.into(),
            dependency_keys: Vec::new(),
            kind,
        }
    }

    /// Set the keys this action depends on.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// User-supplied key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Keys of the actions that must run first, as declared.
    #[must_use]
    pub fn dependency_keys(&self) -> &[String] {
        &self.dependency_keys
    }

    /// Concrete behaviour.
    #[must_use]
    pub const fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// Kind tag; together with the key this identifies the action.
    #[must_use]
    pub const fn tag(&self) -> ActionTag {
        match self.kind {
            ActionKind::Null => ActionTag::Null,
            ActionKind::FileSync(_) => ActionTag::FileSync,
            ActionKind::Installation(_) => ActionTag::Installation,
        }
    }

    /// Perform the action.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Failed`] when the action fails and
    /// [`ActionError::UserStopped`] when the user asks to stop the run.
    pub fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<ActionOutcome, ActionError> {
        match &mut self.kind {
            ActionKind::Null => Ok(ActionOutcome::AlreadyCorrect),
            ActionKind::FileSync(sync) => sync.execute(ctx),
            ActionKind::Installation(install) => install.execute(ctx),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.tag(), self.key)
    }
}
