//! `personalizer` command-line entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use personalizer_cli::{cli, commands, logging};

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Run(opts) => {
            logging::init_subscriber(args.verbose, "run");
            let log = Arc::new(logging::Logger::new("run"));
            commands::run::run(&args.global, &opts, &log)
        }
        cli::Command::Plan(opts) => {
            if !opts.json {
                logging::init_subscriber(args.verbose, "plan");
            }
            let log = logging::Logger::new("plan");
            commands::plan::run(&args.global, &opts, &log)
        }
        cli::Command::Completions(opts) => commands::completions::run(&opts),
        cli::Command::Version => {
            let version = option_env!("PERSONALIZER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("personalizer {version}");
            Ok(())
        }
    }
}
