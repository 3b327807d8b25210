//! `vigia service` — status of a single service in a region.

use vigia_core::MonitorEngine;

use crate::cli::{GlobalOpts, ServiceArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    engine: &MonitorEngine,
    args: ServiceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = engine.service_status(&args.region, &args.service).await?;
    output::print_output(
        &output::render_service(&global.output, &args.region, &args.service, state),
        global.quiet,
    );
    Ok(())
}
