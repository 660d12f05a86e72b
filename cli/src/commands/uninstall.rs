//! `ovnode uninstall`: remove the node, OpenVPN and their files.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::uninstall::uninstall_node;
use crate::domain::ProvisionError;
use crate::output::TerminalReporter;

/// Arguments for the uninstall command.
#[derive(Args, Default)]
pub struct UninstallArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Run an uninstall. A declined confirmation is not an error.
///
/// # Errors
///
/// Returns an error if nothing is installed or the confirmation cannot be
/// read.
pub async fn run(app: &AppContext, args: &UninstallArgs) -> Result<()> {
    let reporter = TerminalReporter::new(&app.output);
    match uninstall_node(&app.config, &app.host, &app.prompter, &reporter, args.yes).await {
        Ok(report) => {
            app.renderer().render_uninstall(&report);
            Ok(())
        }
        Err(err) if matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::UserCancelled)
        ) => {
            app.output.info("Uninstallation canceled.");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
