//! `ovnode restart`: restart the OV-Node service and OpenVPN.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::restart::restart_node;
use crate::output::TerminalReporter;

/// # Errors
///
/// Returns an error if nothing is installed or either restart fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let reporter = TerminalReporter::animated(&app.output);
    restart_node(&app.config, &app.host.fs, &app.host.supervisor, &reporter).await?;
    Ok(())
}
