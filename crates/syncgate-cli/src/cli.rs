use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "syncgate",
    about = "Syncgate: verify that declared command schemas agree with native dispatch handlers",
    version
)]
pub struct Cli {
    /// Emit debug logs on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check schema command/action enums against native registrations and handler branches
    Verify {
        /// Only check this command name
        #[arg(long)]
        tool: Option<String>,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Repository root the layout paths are relative to
        #[arg(long, default_value = ".")]
        repo_root: String,

        /// Layout config (TOML); defaults to <repo-root>/syncgate.toml when present
        #[arg(long)]
        config: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
