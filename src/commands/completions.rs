//! `completions`: shell completion scripts.
use anyhow::Result;
use clap::CommandFactory as _;
use clap_complete::Shell;
use std::io::Write;

use crate::cli::{Cli, CompletionsOpts};

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
}

/// Run the `completions` command.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn run(opts: &CompletionsOpts) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_completions(opts.shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_subcommands() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("personalizer"));
        assert!(script.contains("plan"));
        assert!(script.contains("--on-conflict"));
    }
}
