// Shared helpers for integration tests.
//
// Provides a temporary directory holding a `personalizer.toml` and a fluent
// builder for its entries, so each test can describe its configuration
// without repeating TOML boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use personalizer_cli::actions::ModifiedDateDecision;
use personalizer_cli::config::Config;
use personalizer_cli::context::ExecutionContext;
use personalizer_cli::exec::SystemExecutor;
use personalizer_cli::logging::{Log, Logger};
use personalizer_cli::prompt::FixedDecision;

/// An isolated configuration directory backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    /// Temporary directory containing the config file and fixtures.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create an empty context; write a configuration with
    /// [`ConfigBuilder::write_to`].
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the temporary directory.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("personalizer.toml")
    }

    /// Directory used for remote checkouts.
    pub fn app_dir(&self) -> PathBuf {
        self.root.path().join("apps")
    }

    /// Write `content` to `name` inside the directory.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    /// Load the configuration file.
    pub fn load_config(&self) -> Config {
        Config::load(&self.config_path(), Some(&self.app_dir())).expect("load config")
    }

    /// Execution context running real shell commands, answering every
    /// conflict with `decision`.
    pub fn execution_context(
        &self,
        decision: ModifiedDateDecision,
    ) -> (ExecutionContext, Arc<Logger>) {
        let log = Arc::new(Logger::new("integration-test"));
        let ctx = ExecutionContext::new(
            self.app_dir(),
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::new(SystemExecutor),
            Box::new(FixedDecision::new(decision)),
        );
        (ctx, log)
    }
}

/// Fluent builder for a `personalizer.toml`.
pub struct ConfigBuilder {
    toml: String,
}

impl ConfigBuilder {
    /// Start from an empty file.
    pub fn new() -> Self {
        Self {
            toml: String::new(),
        }
    }

    /// Add an `[[installations]]` entry.
    pub fn installation(
        mut self,
        key: &str,
        check: &str,
        install: Option<&str>,
        depends_on: &[&str],
    ) -> Self {
        let _ = writeln!(self.toml, "[[installations]]");
        let _ = writeln!(self.toml, "key = {key:?}");
        let _ = writeln!(self.toml, "check = {check:?}");
        if let Some(install) = install {
            let _ = writeln!(self.toml, "install = {install:?}");
        }
        self.depends_on(depends_on)
    }

    /// Add a local `[[file_syncs]]` entry.
    pub fn local_sync(
        mut self,
        key: &str,
        source: &str,
        dest: &str,
        overwrite: bool,
        depends_on: &[&str],
    ) -> Self {
        let _ = writeln!(self.toml, "[[file_syncs]]");
        let _ = writeln!(self.toml, "key = {key:?}");
        let _ = writeln!(self.toml, "location_type = \"local\"");
        let _ = writeln!(self.toml, "source_path = {source:?}");
        let _ = writeln!(self.toml, "dest_path = {dest:?}");
        let _ = writeln!(self.toml, "overwrite = {overwrite}");
        self.depends_on(depends_on)
    }

    /// Add an `[[environment_conditions]]` entry.
    pub fn condition(mut self, key: &str) -> Self {
        let _ = writeln!(self.toml, "[[environment_conditions]]\nkey = {key:?}\n");
        self
    }

    fn depends_on(mut self, keys: &[&str]) -> Self {
        let quoted: Vec<String> = keys.iter().map(|k| format!("{k:?}")).collect();
        let _ = writeln!(self.toml, "depends_on = [{}]\n", quoted.join(", "));
        self
    }

    /// Raw TOML text.
    pub fn render(&self) -> &str {
        &self.toml
    }

    /// Write the file into `ctx`, replacing any earlier configuration.
    pub fn write_to(&self, ctx: &IntegrationTestContext) {
        std::fs::write(ctx.config_path(), &self.toml).expect("write personalizer.toml");
    }

    /// Write the file into a fresh temporary directory.
    pub fn build(self) -> IntegrationTestContext {
        let ctx = IntegrationTestContext::new();
        self.write_to(&ctx);
        ctx
    }
}

/// Shell command appending `label` to the file at `path`.
pub fn append_command(path: &Path, label: &str) -> String {
    format!("echo {label} >> '{}'", path.display())
}

/// Lines written by [`append_command`] so far.
pub fn recorded_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
