//! `ovnode update`: replace the node code with the latest release.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::update::update_node;
use crate::output::TerminalReporter;

/// Run an update.
///
/// # Errors
///
/// Returns the update failure; a degraded node is named in the error chain.
pub async fn run(app: &AppContext) -> Result<()> {
    let reporter = TerminalReporter::animated(&app.output);
    let summary = update_node(&app.config, &app.host, &reporter).await?;
    drop(reporter);
    app.renderer().render_update(&summary);
    Ok(())
}
