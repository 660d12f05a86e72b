//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::install::InstallSummary;
use crate::application::services::stage::SessionReport;
use crate::application::services::update::UpdateSummary;
use crate::domain::info::ValueSource;
use crate::domain::{NodeInfo, ServiceStatus, StageFailed};
use crate::output::OutputContext;

/// Menu entries in display order; the number is the choice to type.
pub const MENU_ENTRIES: [(&str, &str); 6] = [
    ("1", "Install"),
    ("2", "Update"),
    ("3", "Restart"),
    ("4", "Show Node Info"),
    ("5", "Uninstall"),
    ("6", "Exit"),
];

const NOT_SET: &str = "N/A";

/// Renders procedure results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the main menu.
    pub fn render_menu(&self) {
        println!();
        println!("  {}", "OV-Node Installer".style(self.ctx.styles.header));
        println!();
        for (choice, label) in MENU_ENTRIES {
            println!("  {}) {label}", choice.style(self.ctx.styles.choice));
        }
        println!();
    }

    /// Render the details an operator needs to register the node on the panel.
    pub fn render_install(&self, summary: &InstallSummary) {
        let desired = &summary.desired;
        println!();
        self.ctx.header("Node details");
        self.ctx.kv("Address:", &desired.tunnel_address);
        self.ctx.kv("Protocol:", desired.protocol.as_str());
        self.ctx.kv("OpenVPN port:", &desired.vpn_port.to_string());
        self.ctx.kv("Service port:", &desired.service_port.to_string());
        self.ctx.kv("API key:", &desired.api_key);
        println!();
        // Shown even with --quiet; the details are lost otherwise.
        println!(
            "  {} Save these details to add this node to OV-Panel!",
            "⚠ IMPORTANT:".style(self.ctx.styles.warning)
        );
    }

    /// Render what an update carried over.
    pub fn render_update(&self, summary: &UpdateSummary) {
        self.ctx.kv("Release:", &summary.tarball_url);
        if summary.settings_restored {
            self.ctx.info("Node settings carried over from the previous install");
        } else {
            self.ctx
                .warn("No previous node settings found; review the state file");
        }
    }

    /// Render the inspect view.
    pub fn render_info(&self, info: &NodeInfo) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("OV-Node information");
        self.ctx.kv(
            "Address:",
            &with_source(&info.tunnel_address, info.sources.tunnel_address),
        );
        self.ctx.kv(
            "Protocol:",
            &with_source(info.protocol.as_str(), info.sources.protocol),
        );
        self.ctx.kv(
            "OpenVPN port:",
            &with_source(&info.vpn_port.to_string(), info.sources.vpn_port),
        );
        self.ctx
            .kv("Service port:", info.service_port.as_deref().unwrap_or(NOT_SET));
        self.ctx
            .kv("API key:", info.api_key.as_deref().unwrap_or(NOT_SET));
        let status = info.service_status.as_str();
        match info.service_status {
            ServiceStatus::Running => self.ctx.kv("Service:", status),
            _ => println!(
                "  {:<16}{}",
                "Service:".style(self.ctx.styles.dim),
                status.style(self.ctx.styles.warning)
            ),
        }
    }

    /// Repeat the warnings raised during uninstall.
    pub fn render_uninstall(&self, report: &SessionReport) {
        if report.warnings.is_empty() {
            return;
        }
        println!();
        self.ctx.header(&format!(
            "Completed with {} warning(s):",
            report.warnings.len()
        ));
        for warning in &report.warnings {
            self.ctx.warn(warning);
        }
    }

    /// Render a failed procedure, naming the stages that were not rolled back.
    pub fn render_failure(&self, err: &anyhow::Error) {
        eprintln!("{} {err:#}", "Error:".style(self.ctx.styles.error));
        if let Some(failed) = err
            .downcast_ref::<StageFailed>()
            .filter(|f| !f.completed.is_empty())
        {
            eprintln!(
                "  {} {}",
                "Completed stages (not rolled back):".style(self.ctx.styles.dim),
                failed.completed.join(", ")
            );
        }
    }
}

fn with_source(value: &str, source: ValueSource) -> String {
    match source {
        ValueSource::StateFile => value.to_string(),
        ValueSource::ServerConfig => format!("{value} (from server config)"),
        ValueSource::ClientTemplate => format!("{value} (from client template)"),
        ValueSource::Default => format!("{value} (default)"),
    }
}
