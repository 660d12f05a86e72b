//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::output::{OutputContext, json};

/// Provision and manage an OV-Node OpenVPN tunnel node
#[derive(Parser)]
#[command(name = "ovnode", version, propagate_version = true)]
pub struct Cli {
    /// Installer configuration file (YAML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run one procedure instead of the interactive menu
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install OpenVPN and the OV-Node service
    Install,

    /// Update OV-Node to the latest release
    Update,

    /// Restart OV-Node and OpenVPN
    Restart,

    /// Show node connection details
    Info(commands::info::InfoArgs),

    /// Remove OV-Node and OpenVPN
    Uninstall(commands::uninstall::UninstallArgs),
}

impl Cli {
    /// Execute the CLI command and map the outcome to an exit code.
    ///
    /// The menu exits 0 whatever its operations do; a subcommand exits 1 on
    /// failure.
    pub async fn run(self) -> ExitCode {
        let Cli {
            config,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let json_errors = matches!(&command, Some(Command::Info(args)) if args.json);
        let flags = AppFlags {
            output: OutputFlags { no_color, quiet },
            config,
        };

        let app = match AppContext::new(&flags) {
            Ok(app) => app,
            Err(err) => {
                report_error(&OutputContext::new(no_color, quiet), &err, json_errors);
                return ExitCode::FAILURE;
            }
        };

        let outcome = match command {
            None => commands::menu::run(&app).await,
            Some(Command::Install) => commands::install::run(&app).await,
            Some(Command::Update) => commands::update::run(&app).await,
            Some(Command::Restart) => commands::restart::run(&app).await,
            Some(Command::Info(args)) => commands::info::run(&app, &args).await,
            Some(Command::Uninstall(args)) => commands::uninstall::run(&app, &args).await,
        };

        match outcome {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                report_error(&app.output, &err, json_errors);
                ExitCode::FAILURE
            }
        }
    }
}

fn report_error(ctx: &OutputContext, err: &anyhow::Error, as_json: bool) {
    tracing::debug!(error = ?err, "command failed");
    if as_json {
        match json::format_error(err) {
            Ok(body) => println!("{body}"),
            Err(_) => eprintln!("Error: {err:#}"),
        }
    } else {
        crate::output::HumanRenderer::new(ctx).render_failure(err);
    }
}
