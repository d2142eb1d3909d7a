//! Copy a file from a [`FileLocation`] onto the local machine.
use std::path::{Path, PathBuf};

use super::error::{ActionError, ActionFailure};
use super::fs::{copy_with_modified, same_file};
use super::location::{FileLocation, ModifiedDateDecision};
use super::ActionOutcome;
use crate::context::ExecutionContext;

/// Keeps a destination file in sync with a source location.
#[derive(Debug)]
pub struct FileSync {
    source: FileLocation,
    destination: PathBuf,
    overwrite: bool,
}

impl FileSync {
    /// Sync `source` to `destination` (a file, or a directory to copy into).
    #[must_use]
    pub fn new(source: FileLocation, destination: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            source,
            destination: destination.into(),
            overwrite,
        }
    }

    /// Source location.
    #[must_use]
    pub const fn source(&self) -> &FileLocation {
        &self.source
    }

    /// Configured destination path.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Whether an existing destination may be replaced.
    #[must_use]
    pub const fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// File actually written: inside the destination when it is a directory.
    fn target_for(&self, source_path: &Path) -> Result<PathBuf, ActionFailure> {
        if !self.destination.is_dir() {
            return Ok(self.destination.clone());
        }
        let name = source_path
            .file_name()
            .ok_or_else(|| ActionFailure::InvalidSource {
                path: source_path.to_path_buf(),
            })?;
        Ok(self.destination.join(name))
    }

    /// Copy the source into place. Remote sources are checked out under the
    /// context's application directory.
    ///
    /// A destination that resolves to the source file itself is left alone.
    ///
    /// An existing destination is an error unless `overwrite` is set; with
    /// `overwrite`, differing modified times go to the context's decision
    /// provider unless conflicts are being ignored.
    ///
    /// # Errors
    ///
    /// [`ActionError::UserStopped`] when the user picks "stop", otherwise an
    /// [`ActionFailure`] describing the failed step.
    pub fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<ActionOutcome, ActionError> {
        let source_path = self.source.path(&ctx.app_dir)?;
        if source_path.is_dir() {
            return Err(ActionFailure::NotSupported {
                operation: "copy directory",
                location: self.source.to_string(),
            }
            .into());
        }
        let target = self.target_for(&source_path)?;
        if same_file(&source_path, &target) {
            ctx.log.debug(&format!(
                "{} is its own source, nothing to copy",
                target.display()
            ));
            return Ok(ActionOutcome::AlreadyCorrect);
        }

        if target.exists() {
            if !self.overwrite {
                return Err(ActionFailure::FileExists { path: target }.into());
            }
            if ctx.ignores_conflicts() {
                ctx.log
                    .debug(&format!("ignoring modified-date conflicts for {}", target.display()));
            } else if let Some(decision) =
                self.source
                    .compare_modified_date(&ctx.app_dir, &target, ctx.decisions())?
            {
                match decision {
                    ModifiedDateDecision::StopExecution => return Err(ActionError::UserStopped),
                    ModifiedDateDecision::SkipThisAction => {
                        ctx.log.info(&format!("skipping {}", target.display()));
                        return Ok(ActionOutcome::Skipped {
                            reason: "modified-date conflict".to_string(),
                        });
                    }
                    ModifiedDateDecision::ProceedOnce => {}
                    ModifiedDateDecision::IgnoreInFuture => {
                        ctx.log
                            .info("ignoring modified-date conflicts for the rest of this run");
                        ctx.ignore_future_conflicts();
                    }
                }
            }
        }

        let modified = self.source.modified_date(&ctx.app_dir)?;
        ctx.log.debug(&format!(
            "copy {} -> {}",
            source_path.display(),
            target.display()
        ));
        copy_with_modified(&source_path, &target, modified).map_err(|source| {
            ActionFailure::CopyFailed {
                from: source_path.clone(),
                to: target.clone(),
                source,
            }
        })?;
        Ok(ActionOutcome::Applied)
    }
}
