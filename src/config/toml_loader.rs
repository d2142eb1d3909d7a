//! TOML file reading and deserialization with typed errors.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read `path` and deserialize it into `T`.
///
/// # Errors
///
/// [`ConfigError::NotFound`] if the file is missing, [`ConfigError::Io`] if
/// it cannot be read, and [`ConfigError::Parse`] if it is not valid TOML for
/// `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = read_config(path)?;
    parse_config(&content, path)
}

/// Read the raw text of a configuration file.
///
/// # Errors
///
/// [`ConfigError::NotFound`] or [`ConfigError::Io`].
pub fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.display().to_string())
        } else {
            ConfigError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })
}

/// Deserialize `content`, attributing errors to `path`.
///
/// # Errors
///
/// [`ConfigError::Parse`] with the parser's message.
pub fn parse_config<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string().trim().to_string(),
    })
}
