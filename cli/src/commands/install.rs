//! `ovnode install`: install OpenVPN and the OV-Node service.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::install::install_node;
use crate::output::TerminalReporter;

/// Run an install and print the node details.
///
/// # Errors
///
/// Returns the install failure, including the already-installed guard.
pub async fn run(app: &AppContext) -> Result<()> {
    // Line-oriented: the settings stage prompts the operator.
    let reporter = TerminalReporter::new(&app.output);
    let summary =
        install_node(&app.config, &app.host, &app.prompter, &app.address, &reporter).await?;
    drop(reporter);
    app.renderer().render_install(&summary);
    Ok(())
}
