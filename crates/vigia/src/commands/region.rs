//! `vigia region` — full status summary for one region.

use vigia_core::MonitorEngine;

use crate::cli::{GlobalOpts, RegionArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    engine: &MonitorEngine,
    args: RegionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let status = engine.region_status(&args.region).await?;
    output::print_output(
        &output::render_region(&global.output, &status),
        global.quiet,
    );
    Ok(())
}
