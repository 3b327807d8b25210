//! Command handlers.

mod region;
mod service;
mod watch;

use vigia_core::MonitorEngine;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler. `Completions` is handled
/// in `main` before an engine exists.
pub async fn dispatch(
    command: Command,
    engine: &MonitorEngine,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Region(args) => region::handle(engine, args, global).await,
        Command::Service(args) => service::handle(engine, args, global).await,
        Command::Watch(args) => watch::handle(engine, args, global).await,
        Command::Completions(_) => Ok(()),
    }
}
