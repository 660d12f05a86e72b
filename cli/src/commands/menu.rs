//! Interactive menu shown when `ovnode` runs without a subcommand.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::Prompter;
use crate::commands::{info, install, restart, uninstall, update};

const PAUSE_PROMPT: &str = "Press Enter to return to the menu...";

/// One menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Install,
    Update,
    Restart,
    Info,
    Uninstall,
    Exit,
}

impl Choice {
    /// Parse the number typed at the menu prompt.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Install),
            "2" => Some(Self::Update),
            "3" => Some(Self::Restart),
            "4" => Some(Self::Info),
            "5" => Some(Self::Uninstall),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Loop until the operator exits or input ends. Procedure failures are
/// printed and the menu is shown again.
///
/// # Errors
///
/// Returns an error only if stdin cannot be read.
pub async fn run(app: &AppContext) -> Result<()> {
    let renderer = app.renderer();
    loop {
        app.output.clear_screen();
        renderer.render_menu();
        let Some(line) = app.prompter.read_line("Enter your choice: ")? else {
            return Ok(());
        };
        let outcome = match Choice::parse(&line) {
            Some(Choice::Exit) => return Ok(()),
            Some(Choice::Install) => install::run(app).await,
            Some(Choice::Update) => update::run(app).await,
            Some(Choice::Restart) => restart::run(app).await,
            Some(Choice::Info) => info::run(app, &info::InfoArgs::default()).await,
            Some(Choice::Uninstall) => {
                uninstall::run(app, &uninstall::UninstallArgs::default()).await
            }
            None => {
                app.output
                    .error(&format!("Invalid choice '{}'. Enter a number from 1 to 6.", line.trim()));
                Ok(())
            }
        };
        if let Err(err) = outcome {
            tracing::debug!(error = ?err, "menu operation failed");
            renderer.render_failure(&err);
        }
        app.prompter.pause(PAUSE_PROMPT)?;
    }
}
