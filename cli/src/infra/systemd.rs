//! systemd implementation of the `ServiceSupervisor` port.
//!
//! Unit files are written through `HostFs`; every `systemctl` call goes
//! through the `CommandRunner` port.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::{CommandRunner, HostFs, ServiceSupervisor};
use crate::domain::{ProvisionError, ServiceStatus, ServiceUnit, unit_file_name};

pub struct SystemdSupervisor<C, F> {
    runner: C,
    fs: F,
    unit_dir: PathBuf,
}

impl<C: CommandRunner, F: HostFs> SystemdSupervisor<C, F> {
    #[must_use]
    pub fn new(runner: C, fs: F, unit_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            fs,
            unit_dir: unit_dir.into(),
        }
    }

    fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(unit_file_name(name))
    }

    async fn systemctl(&self, action: &str, unit: &str) -> Result<()> {
        let args: Vec<&str> = if unit.is_empty() {
            vec![action]
        } else {
            vec![action, unit]
        };
        let failure = |reason: String| ProvisionError::ServiceManager {
            action: action.to_string(),
            unit: unit.to_string(),
            reason,
        };
        let output = self
            .runner
            .run("systemctl", &args)
            .await
            .map_err(|e| failure(format!("{e:#}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(failure(reason).into());
        }
        tracing::debug!(action, unit, "systemctl ok");
        Ok(())
    }
}

impl<C: CommandRunner, F: HostFs> ServiceSupervisor for SystemdSupervisor<C, F> {
    async fn install(&self, unit: &ServiceUnit) -> Result<()> {
        self.fs.create_dir_all(&self.unit_dir, None)?;
        self.fs
            .write(&self.unit_dir.join(unit.file_name()), &unit.render())?;
        self.reload().await?;
        self.systemctl("enable", &unit.name).await?;
        self.systemctl("start", &unit.name).await
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.systemctl("restart", name).await
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.systemctl("stop", name).await
    }

    async fn disable(&self, name: &str) -> Result<()> {
        self.systemctl("disable", name).await
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let path = self.unit_path(name);
        if self.fs.exists(&path) {
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.systemctl("daemon-reload", "").await
    }

    async fn query_status(&self, name: &str) -> ServiceStatus {
        match self.runner.run("systemctl", &["is-active", name]).await {
            Ok(output) => ServiceStatus::from_is_active(&String::from_utf8_lossy(&output.stdout)),
            Err(err) => {
                tracing::debug!(unit = name, error = %format!("{err:#}"), "status query failed");
                ServiceStatus::Unknown
            }
        }
    }
}
