//! Application service: restart the management service and the daemon.

use anyhow::Result;

use crate::application::ports::{HostFs, ProgressReporter, ServiceSupervisor};
use crate::application::services::stage::{Session, SessionReport};
use crate::domain::{InstallerConfig, ProvisionError};

/// Restart both units; the first failure aborts.
///
/// # Errors
///
/// `ProvisionError::NotInstalled` if neither the install dir nor the daemon
/// dir exists, or the failing restart's error.
pub async fn restart_node(
    config: &InstallerConfig,
    fs: &impl HostFs,
    supervisor: &impl ServiceSupervisor,
    reporter: &impl ProgressReporter,
) -> Result<SessionReport> {
    let paths = &config.paths;
    if !fs.exists(&paths.install_dir) && !fs.exists(&paths.daemon_dir) {
        return Err(ProvisionError::NotInstalled {
            marker: paths.install_dir.clone(),
        }
        .into());
    }

    let session = Session::new("restart", 2, reporter);
    session
        .run("restart management service", supervisor.restart(&config.services.node_unit))
        .await?;
    session
        .run("restart OpenVPN", supervisor.restart(&config.services.daemon_unit))
        .await?;
    reporter.success("OV-Node restarted");
    Ok(session.finish())
}
