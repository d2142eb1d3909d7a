//! `[[installations]]` entries.
use serde::Deserialize;

use super::validate_key;
use crate::actions::{Action, ActionKind, Installation};
use crate::error::ConfigError;

/// One installation as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallationEntry {
    /// Action key.
    pub key: String,
    /// Shell command that exits zero when the software is present.
    pub check: String,
    /// Shell command that installs the software.
    pub install: Option<String>,
    /// Keys of the actions that must run first.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl InstallationEntry {
    /// Turn the entry into an action.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyKey`] for a blank key.
    pub fn into_action(self) -> Result<Action, ConfigError> {
        validate_key(&self.key, "installations")?;
        let install = self.install.filter(|cmd| !cmd.trim().is_empty());
        Ok(
            Action::new(self.key, ActionKind::Installation(Installation::new(self.check, install)))
                .with_dependencies(self.depends_on),
        )
    }
}
