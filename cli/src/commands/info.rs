//! `ovnode info`: show the node's connection details and service status.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::node_info::show_info;
use crate::output::json;

/// Arguments for the info command.
#[derive(Args, Default)]
pub struct InfoArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run `ovnode info`.
///
/// # Errors
///
/// Returns an error if the node is not installed or the state file cannot be
/// read.
pub async fn run(app: &AppContext, args: &InfoArgs) -> Result<()> {
    let info = show_info(&app.config, &app.host.fs, &app.host.supervisor).await?;
    if args.json {
        println!("{}", json::format_info(&info)?);
    } else {
        app.renderer().render_info(&info);
    }
    Ok(())
}
