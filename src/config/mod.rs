//! Configuration loading: one TOML file describing every action.
//!
//! ```toml
//! app_dir = "~/.personalizer"
//!
//! [[installations]]
//! key = "git"
//! check = "git --version"
//! install = "sudo apt-get install -y git"
//!
//! [[file_syncs]]
//! key = "gitconfig"
//! location_type = "git"
//! repository = "https://github.com/alice/dotfiles"
//! source_path = "git/config"
//! dest_path = "~/.gitconfig"
//! overwrite = true
//! depends_on = ["git"]
//!
//! [[environment_conditions]]
//! key = "laptop"
//! ```
//!
//! Relative paths are resolved against the directory holding the file, and
//! a leading `~` expands to the home directory.
pub mod file_syncs;
pub mod installations;
mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::actions::{Action, EnvironmentCondition};
use crate::error::ConfigError;
use file_syncs::FileSyncEntry;
use installations::InstallationEntry;

/// Default application directory, before `~` expansion.
pub const DEFAULT_APP_DIR: &str = "~/.personalizer";

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "personalizer.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    app_dir: Option<String>,
    #[serde(default)]
    file_syncs: Vec<FileSyncEntry>,
    #[serde(default)]
    installations: Vec<InstallationEntry>,
    #[serde(default)]
    environment_conditions: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionEntry {
    key: String,
    description: Option<String>,
}

/// A loaded and validated configuration.
#[derive(Debug)]
pub struct Config {
    /// File the configuration was read from.
    pub path: PathBuf,
    /// Directory for remote checkouts.
    pub app_dir: PathBuf,
    /// Installations first, then file syncs, each in file order.
    pub actions: Vec<Action>,
    /// Declared environment conditions.
    pub conditions: Vec<EnvironmentCondition>,
}

impl Config {
    /// Read and validate the file at `path`.
    ///
    /// `app_dir_override` wins over the file's `app_dir`.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]: a missing or unreadable file, invalid TOML,
    /// unknown fields, or an entry that fails validation.
    pub fn load(path: &Path, app_dir_override: Option<&Path>) -> Result<Self, ConfigError> {
        let content = toml_loader::read_config(path)?;
        Self::parse(&content, path, app_dir_override)
    }

    /// Validate already-read `content` as if it came from `path`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the I/O errors.
    pub fn parse(
        content: &str,
        path: &Path,
        app_dir_override: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml_loader::parse_config(content, path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let app_dir = app_dir_override.map_or_else(
            || resolve_path(file.app_dir.as_deref().unwrap_or(DEFAULT_APP_DIR), base_dir),
            Path::to_path_buf,
        );

        let mut actions = Vec::with_capacity(file.installations.len() + file.file_syncs.len());
        for entry in file.installations {
            actions.push(entry.into_action()?);
        }
        for entry in file.file_syncs {
            actions.push(entry.into_action(base_dir)?);
        }

        let conditions = file
            .environment_conditions
            .into_iter()
            .map(|c| {
                validate_key(&c.key, "environment_conditions")?;
                Ok(EnvironmentCondition::new(c.key, c.description))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        tracing::debug!(
            path = %path.display(),
            actions = actions.len(),
            conditions = conditions.len(),
            "configuration loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            app_dir,
            actions,
            conditions,
        })
    }
}

/// Reject blank keys.
fn validate_key(key: &str, section: &'static str) -> Result<(), ConfigError> {
    if key.trim().is_empty() {
        return Err(ConfigError::EmptyKey { section });
    }
    Ok(())
}

/// The current user's home directory, from `HOME` or `USERPROFILE`.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
///
/// The path is returned unchanged when it has no `~` prefix or no home
/// directory is known.
#[must_use]
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw {
        "~" => Some(""),
        _ => raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")),
    };
    match (rest, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Expand `~` and anchor relative paths at `base_dir`.
fn resolve_path(raw: &str, base_dir: &Path) -> PathBuf {
    let path = expand_home(raw);
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path
    }
}
