//! Syncgate CLI: the `syncgate` command.

mod cli;
mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use cli::{Cli, Commands};
use std::io::IsTerminal;
use syncgate_core::EXIT_FATAL;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() {
    // Help and usage errors both exit 2; only --version exits 0.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        if err.kind() == ErrorKind::DisplayVersion {
            err.exit();
        }
        eprintln!("{}", err.render());
        std::process::exit(EXIT_FATAL);
    });
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Verify {
            tool,
            format,
            repo_root,
            config,
        } => commands::verify::run(commands::verify::Args {
            tool,
            format,
            repo_root,
            config,
        }),
    }
}
