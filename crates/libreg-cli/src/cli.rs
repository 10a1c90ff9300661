use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "libreg",
    about = "Library registry: librarians, books and custody transfers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply a script of operations to a fresh library
    Run(RunArgs),
    /// Parse and print a gate configuration file
    CheckConfig(CheckConfigArgs),
    /// Run the built-in lending walkthrough
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// TOML script with a `genesis` label and `[[step]]` entries
    pub script: PathBuf,
    /// Gate configuration (overrides the script's `[gate]` table)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    pub path: PathBuf,
}

#[derive(Args)]
pub struct DemoArgs {
    /// Let librarians transfer books they do not hold
    #[arg(long)]
    pub librarian_override: bool,
}
