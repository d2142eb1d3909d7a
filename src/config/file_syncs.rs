//! `[[file_syncs]]` entries.
use serde::Deserialize;
use std::path::{Component, Path};

use super::{resolve_path, validate_key};
use crate::actions::{Action, ActionKind, FileLocation, FileSync};
use crate::error::ConfigError;

/// Where the source file of a sync lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// A path on this machine.
    #[default]
    Local,
    /// A file inside a git repository.
    #[serde(alias = "github")]
    Git,
}

/// One file sync as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSyncEntry {
    /// Action key.
    pub key: String,
    /// Kind of source location.
    #[serde(default)]
    pub location_type: LocationType,
    /// Source path; relative to the repository root for git locations.
    pub source_path: String,
    /// Repository URL, required for git locations.
    pub repository: Option<String>,
    /// Destination file or directory.
    pub dest_path: String,
    /// Replace an existing destination.
    #[serde(default)]
    pub overwrite: bool,
    /// Keys of the actions that must run first.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl FileSyncEntry {
    /// Turn the entry into an action.
    ///
    /// Local source paths and the destination are resolved against
    /// `base_dir`. Git sources are checked out under the run's application
    /// directory when the action executes.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyKey`], [`ConfigError::MissingField`] for a git
    /// location without `repository`, [`ConfigError::InvalidSourcePath`] for a
    /// git source path that is absolute or climbs out with `..`, and
    /// [`ConfigError::InvalidRepositoryUrl`].
    pub fn into_action(self, base_dir: &Path) -> Result<Action, ConfigError> {
        validate_key(&self.key, "file_syncs")?;

        let source = match self.location_type {
            LocationType::Local => FileLocation::local(resolve_path(&self.source_path, base_dir)),
            LocationType::Git => {
                let repository = self.repository.ok_or_else(|| ConfigError::MissingField {
                    key: self.key.clone(),
                    field: "repository",
                })?;
                if !stays_inside(&self.source_path) {
                    return Err(ConfigError::InvalidSourcePath {
                        key: self.key,
                        path: self.source_path,
                    });
                }
                let Some(location) =
                    FileLocation::remote(repository.clone(), &self.source_path)
                else {
                    return Err(ConfigError::InvalidRepositoryUrl {
                        key: self.key,
                        url: repository,
                    });
                };
                location
            }
        };

        let sync = FileSync::new(
            source,
            resolve_path(&self.dest_path, base_dir),
            self.overwrite,
        );
        Ok(Action::new(self.key, ActionKind::FileSync(sync)).with_dependencies(self.depends_on))
    }
}

/// Whether `path` is a non-empty relative path made of plain names.
fn stays_inside(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
