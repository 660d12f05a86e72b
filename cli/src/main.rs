//! ovnode - provision and manage an OV-Node OpenVPN tunnel node

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ovnode_cli::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run().await
}

/// Events go to stderr so they never interleave with menu prompts.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
