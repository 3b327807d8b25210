//! Clap derive structures for the `vigia` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use vigia_core::WatchMode;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vigia -- status monitor for Bluemix-style status pages
#[derive(Debug, Parser)]
#[command(
    name = "vigia",
    version,
    about = "Query and watch cloud service status pages",
    long_about = "Query and watch cloud service status pages.\n\n\
        Known regions: US South, United Kingdom, Sydney.\n\
        Multi-word region names must be quoted (e.g. \"US South\").",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, env = "VIGIA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VIGIA_OUTPUT",
        default_value = "text",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text and tables
    Text,
    /// Pretty-printed JSON
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the status of every service in a region
    #[command(alias = "r")]
    Region(RegionArgs),

    /// Show the status of one service in a region
    #[command(alias = "s")]
    Service(ServiceArgs),

    /// Watch services and print notifications until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RegionArgs {
    /// Region name (e.g. "US South")
    pub region: String,
}

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Region name (e.g. "US South")
    pub region: String,

    /// Service name, matched case-insensitively
    pub service: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Region name (e.g. "US South")
    pub region: String,

    /// Watch mode: up and down fire once, any reports every flip
    #[arg(value_parser = parse_watch_mode)]
    pub mode: WatchMode,

    /// Services to watch
    #[arg(required = true)]
    pub services: Vec<String>,

    /// Override the tick period in milliseconds
    #[arg(long)]
    pub period_ms: Option<u64>,

    /// Override the one-shot watch expiry in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Label quoted verbatim in timeout notifications
    #[arg(long)]
    pub timeout_label: Option<String>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_watch_mode(value: &str) -> Result<WatchMode, String> {
    value
        .parse()
        .map_err(|_| format!("expected 'up', 'down', or 'any', got '{value}'"))
}
