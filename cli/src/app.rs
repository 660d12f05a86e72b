//! Application context: unified state passed to every command handler.
//!
//! `AppContext` owns the loaded installer configuration and the production
//! adapters, so command handlers never construct infrastructure themselves.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::NodeHost;
use crate::domain::InstallerConfig;
use crate::infra::archive::TarGzExtractor;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::ConfigSources;
use crate::infra::fs::LocalFs;
use crate::infra::network::HostnameResolver;
use crate::infra::prompt::TerminalPrompter;
use crate::infra::pty::PtyDriver;
use crate::infra::release::HttpRemote;
use crate::infra::systemd::SystemdSupervisor;
use crate::output::{HumanRenderer, OutputContext};

/// The adapters a real host is provisioned through.
pub type ProductionHost = NodeHost<
    LocalFs,
    SystemdSupervisor<TokioCommandRunner, LocalFs>,
    PtyDriver,
    TokioCommandRunner,
    HttpRemote,
    TarGzExtractor,
>;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Explicit `--config` path; overrides every other source.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    pub config: InstallerConfig,
    pub host: ProductionHost,
    pub prompter: TerminalPrompter,
    pub address: HostnameResolver,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the installer configuration cannot be loaded.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let config = ConfigSources::standard(flags.config.as_deref()).load()?;
        let host = build_host(&config);
        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            config,
            host,
            prompter: TerminalPrompter::default(),
            address: HostnameResolver,
        })
    }

    #[must_use]
    pub fn renderer(&self) -> HumanRenderer<'_> {
        HumanRenderer::new(&self.output)
    }
}

fn build_host(config: &InstallerConfig) -> ProductionHost {
    let timeouts = &config.timeouts;
    let sources = &config.sources;
    NodeHost {
        fs: LocalFs,
        supervisor: SystemdSupervisor::new(
            TokioCommandRunner::new(timeouts.command()),
            LocalFs,
            config.paths.unit_dir.clone(),
        ),
        driver: PtyDriver,
        runner: TokioCommandRunner::new(timeouts.command()),
        remote: HttpRemote::new(timeouts.http(), &sources.user_agent, sources.github_token.clone()),
        archive: TarGzExtractor,
    }
}
