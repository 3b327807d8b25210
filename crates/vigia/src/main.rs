mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigia_core::{MonitorEngine, RegionDirectory, StaticSpaceDirectory};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Completions need no configuration or engine.
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "vigia", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let engine = build_engine(&cli.global, &cmd)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &engine, &cli.global).await
        }
    }
}

/// Build the engine from config file + environment, with `watch` flag
/// overrides applied on top.
fn build_engine(global: &cli::GlobalOpts, cmd: &Command) -> Result<MonitorEngine, CliError> {
    let config = match &global.config {
        Some(path) => vigia_config::load_config_from(path)?,
        None => vigia_config::load_config()?,
    };
    let mut settings = config.into_settings();

    if let Command::Watch(args) = cmd {
        if let Some(ms) = args.period_ms {
            settings.notification_period = Duration::from_millis(ms);
        }
        if let Some(ms) = args.timeout_ms {
            settings.notification_timeout = Duration::from_millis(ms);
        }
        if let Some(label) = &args.timeout_label {
            settings.notification_timeout_label = label.clone();
        }
    }

    let regions = RegionDirectory::builtin()?;
    let engine = MonitorEngine::new(settings, regions, Arc::new(StaticSpaceDirectory::new()))?;
    Ok(engine)
}
