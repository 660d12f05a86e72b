//! Installer configuration schema.
//!
//! Pure types only; loading lives in `infra::config`. Every field has a
//! default matching the stock deployment, so an empty YAML document is valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration, usually `/etc/ov-node/installer.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InstallerConfig {
    pub paths: PathsConfig,
    pub services: ServicesConfig,
    pub sources: SourcesConfig,
    pub timeouts: TimeoutsConfig,
    pub dependencies: DependencyConfig,
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Host paths touched by the procedures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Daemon config root; its presence means the daemon is installed.
    pub daemon_dir: PathBuf,
    pub server_conf: PathBuf,
    pub client_template: PathBuf,
    pub ccd_dir: PathBuf,
    pub installer_script: PathBuf,
    pub install_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub unit_dir: PathBuf,
    pub archive_path: PathBuf,
    pub backup_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            daemon_dir: "/etc/openvpn".into(),
            server_conf: "/etc/openvpn/server/server.conf".into(),
            client_template: "/etc/openvpn/server/client-common.txt".into(),
            ccd_dir: "/etc/openvpn/ccd".into(),
            installer_script: "/root/openvpn-install.sh".into(),
            install_dir: "/opt/ov-node".into(),
            venv_dir: "/opt/ov-node_venv".into(),
            unit_dir: "/etc/systemd/system".into(),
            archive_path: "/tmp/ov-node-latest.tar.gz".into(),
            backup_path: "/tmp/ovnode_env_backup".into(),
        }
    }
}

impl PathsConfig {
    /// The node state file.
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.install_dir.join(".env")
    }

    /// The template shipped with each release.
    #[must_use]
    pub fn state_template(&self) -> PathBuf {
        self.install_dir.join(".env.example")
    }
}

// ── Services ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServicesConfig {
    pub node_unit: String,
    pub daemon_unit: String,
    pub description: String,
    /// Script run by `uv run` inside the install dir.
    pub entrypoint: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            node_unit: "ov-node".to_string(),
            daemon_unit: "openvpn-server@server.service".to_string(),
            description: "OV-Node App".to_string(),
            entrypoint: "main.py".to_string(),
        }
    }
}

// ── Sources ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SourcesConfig {
    pub installer_url: String,
    /// Release descriptor endpoint (GitHub "latest release" API).
    pub release_url: String,
    /// Bearer token for the release API; `$GITHUB_TOKEN` is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            installer_url: "https://git.io/vpn".to_string(),
            release_url: "https://api.github.com/repos/primeZdev/ov-node/releases/latest"
                .to_string(),
            github_token: None,
            user_agent: concat!("ovnode-cli/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

/// All values in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub install_prompt_secs: u64,
    /// `None` waits for the installer indefinitely.
    pub installer_secs: Option<u64>,
    pub uninstall_prompt_secs: u64,
    pub uninstall_secs: u64,
    pub command_secs: u64,
    pub http_secs: u64,
    pub dependency_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            install_prompt_secs: 10,
            installer_secs: None,
            uninstall_prompt_secs: 30,
            uninstall_secs: 60,
            command_secs: 30,
            http_secs: 120,
            dependency_secs: 600,
        }
    }
}

impl TimeoutsConfig {
    #[must_use]
    pub fn install_prompt(&self) -> Duration {
        Duration::from_secs(self.install_prompt_secs)
    }

    #[must_use]
    pub fn installer(&self) -> Option<Duration> {
        self.installer_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn uninstall_prompt(&self) -> Duration {
        Duration::from_secs(self.uninstall_prompt_secs)
    }

    #[must_use]
    pub fn uninstall(&self) -> Duration {
        Duration::from_secs(self.uninstall_secs)
    }

    #[must_use]
    pub fn command(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }

    #[must_use]
    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http_secs)
    }

    #[must_use]
    pub fn dependency(&self) -> Duration {
        Duration::from_secs(self.dependency_secs)
    }
}

// ── Dependencies ─────────────────────────────────────────────────────────────

/// Command run in the install dir after an update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DependencyConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            program: "uv".to_string(),
            args: vec!["sync".to_string()],
        }
    }
}
