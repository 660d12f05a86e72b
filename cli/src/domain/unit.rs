//! systemd unit definitions.

use std::fmt::Write as _;

use crate::domain::config::InstallerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUnit {
    pub name: String,
    pub description: String,
    pub exec_command: String,
    pub working_directory: String,
    /// Rendered in order, one `Environment=` line each.
    pub environment: Vec<(String, String)>,
    pub restart_secs: u32,
    pub user: String,
    pub wanted_by: String,
    pub after: String,
}

impl ServiceUnit {
    /// The OV-Node management service, run from its virtualenv with `uv`.
    #[must_use]
    pub fn management(config: &InstallerConfig) -> Self {
        let venv = config.paths.venv_dir.display().to_string();
        Self {
            name: config.services.node_unit.clone(),
            description: config.services.description.clone(),
            exec_command: format!("{venv}/bin/uv run {}", config.services.entrypoint),
            working_directory: config.paths.install_dir.display().to_string(),
            environment: vec![
                ("PATH".to_string(), format!("{venv}/bin")),
                ("VIRTUAL_ENV".to_string(), venv),
            ],
            restart_secs: 5,
            user: "root".to_string(),
            wanted_by: "multi-user.target".to_string(),
            after: "network.target".to_string(),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        unit_file_name(&self.name)
    }

    /// Render as a unit file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[Unit]");
        let _ = writeln!(out, "Description={}", self.description);
        let _ = writeln!(out, "After={}", self.after);
        let _ = writeln!(out);
        let _ = writeln!(out, "[Service]");
        let _ = writeln!(out, "WorkingDirectory={}", self.working_directory);
        let _ = writeln!(out, "ExecStart={}", self.exec_command);
        let _ = writeln!(out, "Restart=always");
        let _ = writeln!(out, "RestartSec={}", self.restart_secs);
        let _ = writeln!(out, "User={}", self.user);
        for (key, value) in &self.environment {
            let _ = writeln!(out, "Environment=\"{key}={value}\"");
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "[Install]");
        let _ = writeln!(out, "WantedBy={}", self.wanted_by);
        out
    }
}

/// File name of a unit given as `ov-node` or `ov-node.service`.
#[must_use]
pub fn unit_file_name(name: &str) -> String {
    if name.ends_with(".service") {
        name.to_string()
    } else {
        format!("{name}.service")
    }
}
