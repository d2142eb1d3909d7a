//! Subcommand orchestration.
pub mod completions;
pub mod plan;
pub mod run;

use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::PersonalizerError;
use crate::graph::{self, ExecutionGraph};
use crate::logging::Log;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PERSONALIZER_CONFIG";

/// Configuration file to use: `--config`, then [`CONFIG_ENV`], then
/// `./personalizer.toml`.
#[must_use]
pub fn resolve_config_path(flag: Option<&Path>, env: Option<OsString>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// State produced by the setup shared by `run` and `plan`.
#[derive(Debug)]
pub struct CommandSetup {
    /// Directory for remote checkouts.
    pub app_dir: PathBuf,
    /// Validated dependency graph with its conditions attached.
    pub graph: ExecutionGraph,
}

impl CommandSetup {
    /// Load the configuration and build the graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or the graph
    /// has bad references, duplicates, or cycles.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let path = resolve_config_path(global.config.as_deref(), std::env::var_os(CONFIG_ENV));

        log.stage("Loading configuration");
        log.debug(&format!("config file: {}", path.display()));
        let config =
            Config::load(&path, global.app_dir.as_deref()).map_err(PersonalizerError::from)?;
        log.info(&format!(
            "loaded {} action(s) from {}",
            config.actions.len(),
            config.path.display()
        ));
        log.debug(&format!("app dir: {}", config.app_dir.display()));
        if !config.conditions.is_empty() {
            log.debug(&format!(
                "{} environment condition(s) declared",
                config.conditions.len()
            ));
        }

        log.stage("Resolving dependencies");
        let graph = graph::build_graph(config.actions)
            .map_err(PersonalizerError::from)?
            .with_conditions(config.conditions);
        log.info(&format!("{} action(s) ordered", graph.action_count()));

        Ok(Self {
            app_dir: config.app_dir,
            graph,
        })
    }
}
