//! `vigia watch` — run the monitor until interrupted, printing
//! notifications as they arrive.

use tokio::sync::broadcast::error::RecvError;

use vigia_core::{MonitorEngine, SubscriberId, UpsertOutcome};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Subscriber identity for watches registered from this process.
const CLI_SUBSCRIBER: &str = "cli";

pub async fn handle(
    engine: &MonitorEngine,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let subscriber = SubscriberId::new(CLI_SUBSCRIBER);

    for service in &args.services {
        let outcome = engine
            .watch_service(&args.region, subscriber.clone(), service, args.mode)
            .await?;
        if !global.quiet {
            match outcome {
                UpsertOutcome::Created => {
                    eprintln!("Watching {service} for '{}' in {}", args.mode, args.region);
                }
                UpsertOutcome::Updated => {
                    eprintln!("Updated watch on {service} in {}", args.region);
                }
            }
        }
    }

    // Subscribe before starting so the first tick cannot race past us.
    let mut rx = engine.subscribe();
    engine.start().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            received = rx.recv() => match received {
                Ok(notification) => output::print_output(
                    &output::render_notification(&global.output, &notification),
                    global.quiet,
                ),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "notification stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown().await;
    Ok(())
}
