//! Application service: fresh node install.
//!
//! Stages run in order and are not rolled back on failure; the error names
//! the stages that had already completed.

use anyhow::{Result, bail};
use uuid::Uuid;

use crate::application::ports::{
    HostAddress, HostFs, InteractiveDriver, ProgressReporter, Prompter, RemoteSource,
    ServiceSupervisor,
};
use crate::application::services::NodeHost;
use crate::application::services::config_patcher::{ensure_directives, patch_directive_file};
use crate::application::services::node_state;
use crate::application::services::stage::{Session, SessionReport};
use crate::domain::expect::install_script;
use crate::domain::patch::{ccd_directives, client_updates, server_updates};
use crate::domain::{DesiredNodeConfig, InstallerConfig, ProvisionError, ServiceUnit};

const STAGES: usize = 8;

/// What an install produced.
#[derive(Debug, Clone)]
pub struct InstallSummary {
    pub desired: DesiredNodeConfig,
    pub report: SessionReport,
}

/// Install the daemon and the management service.
///
/// # Errors
///
/// `ProvisionError::AlreadyInstalled` (with no side effects) if the daemon
/// marker directory exists; otherwise the first failing stage's error with a
/// `StageFailed` context.
pub async fn install_node<F, S, D, C, R, A>(
    config: &InstallerConfig,
    host: &NodeHost<F, S, D, C, R, A>,
    prompter: &impl Prompter,
    address: &impl HostAddress,
    reporter: &impl ProgressReporter,
) -> Result<InstallSummary>
where
    F: HostFs,
    S: ServiceSupervisor,
    D: InteractiveDriver,
    R: RemoteSource,
{
    let paths = &config.paths;
    if host.fs.exists(&paths.daemon_dir) {
        return Err(ProvisionError::AlreadyInstalled {
            marker: paths.daemon_dir.clone(),
        }
        .into());
    }

    let session = Session::new("install", STAGES, reporter);

    session
        .run("fetch installer", async {
            let bytes = host
                .remote
                .download(&config.sources.installer_url, &paths.installer_script)?;
            tracing::debug!(bytes, path = %paths.installer_script.display(), "installer saved");
            Ok(())
        })
        .await?;

    session
        .run("run installer", async {
            let script = install_script(config.timeouts.install_prompt())?;
            let script_path = paths.installer_script.display().to_string();
            let outcome = host
                .driver
                .drive("bash", &[script_path.as_str()], &script, config.timeouts.installer())
                .await?;
            if !outcome.skipped.is_empty() {
                tracing::info!(skipped = ?outcome.skipped, "installer prompts not answered");
            }
            if !outcome.status.success() {
                bail!("installer exited with {}", outcome.status);
            }
            Ok(())
        })
        .await?;

    session
        .run("enable per-client config", async {
            let created = !host.fs.exists(&paths.ccd_dir);
            if created {
                host.fs.create_dir_all(&paths.ccd_dir, Some(0o755))?;
            }
            let required = ccd_directives(&paths.ccd_dir.display().to_string());
            ensure_directives(&host.fs, &paths.server_conf, &required)?;
            if created {
                host.supervisor.restart(&config.services.daemon_unit).await?;
            }
            Ok(())
        })
        .await?;

    let generated_key = Uuid::new_v4().to_string();
    session
        .run("seed node settings", async {
            node_state::seed_state_file(&host.fs, paths, &session)
        })
        .await?;

    let desired = session
        .run("collect node settings", async {
            node_state::collect_desired(prompter, address, &session, &generated_key)
        })
        .await?;

    session
        .run("save node settings", async {
            node_state::persist(&host.fs, &paths.state_file(), &desired)
        })
        .await?;

    session
        .run("apply tunnel settings", async {
            apply_daemon_config(config, host, &desired, &session).await
        })
        .await?;

    session
        .run("start management service", async {
            host.supervisor
                .install(&ServiceUnit::management(config))
                .await
        })
        .await?;

    reporter.success("OV-Node installed");
    Ok(InstallSummary {
        desired,
        report: session.finish(),
    })
}

/// Project the desired settings onto the server config and client template,
/// then restart the daemon. A missing file is skipped with a warning.
async fn apply_daemon_config<F, S, D, C, R, A, P>(
    config: &InstallerConfig,
    host: &NodeHost<F, S, D, C, R, A>,
    desired: &DesiredNodeConfig,
    session: &Session<'_, P>,
) -> Result<()>
where
    F: HostFs,
    S: ServiceSupervisor,
    P: ProgressReporter,
{
    let paths = &config.paths;
    let server = server_updates(desired.protocol, desired.vpn_port)?;
    let client = client_updates(
        Some(desired.tunnel_address.as_str()),
        desired.protocol,
        desired.vpn_port,
    )?;
    for (path, updates) in [(&paths.server_conf, &server), (&paths.client_template, &client)] {
        if host.fs.exists(path) {
            patch_directive_file(&host.fs, path, updates)?;
        } else {
            session.warn(format!("{} not found; skipped", path.display()));
        }
    }
    host.supervisor.restart(&config.services.daemon_unit).await?;
    session.reporter().success(&format!(
        "OpenVPN configured: {}://{}:{}",
        desired.protocol, desired.tunnel_address, desired.vpn_port
    ));
    Ok(())
}
