//! Application service: remove the node and the daemon.
//!
//! Every stage is best-effort: a failure is reported as a warning and the
//! remaining stages still run.

use anyhow::{Result, bail};

use crate::application::ports::{
    HostFs, InteractiveDriver, ProgressReporter, Prompter, ServiceSupervisor,
};
use crate::application::services::NodeHost;
use crate::application::services::stage::{Session, SessionReport};
use crate::domain::expect::uninstall_script;
use crate::domain::{InstallerConfig, ProvisionError};

const STAGES: usize = 6;

/// Remove everything the installer created.
///
/// Unless `assume_yes`, the operator must answer `y`.
///
/// # Errors
///
/// `ProvisionError::NotInstalled` if nothing is installed,
/// `ProvisionError::UserCancelled` (with no side effects) if the operator
/// declines, or an error if reading the answer fails.
pub async fn uninstall_node<F, S, D, C, R, A>(
    config: &InstallerConfig,
    host: &NodeHost<F, S, D, C, R, A>,
    prompter: &impl Prompter,
    reporter: &impl ProgressReporter,
    assume_yes: bool,
) -> Result<SessionReport>
where
    F: HostFs,
    S: ServiceSupervisor,
    D: InteractiveDriver,
{
    let paths = &config.paths;
    if !host.fs.exists(&paths.install_dir) && !host.fs.exists(&paths.daemon_dir) {
        return Err(ProvisionError::NotInstalled {
            marker: paths.install_dir.clone(),
        }
        .into());
    }
    if !assume_yes && !prompter.confirm("Do you want to uninstall OV-Node?")? {
        return Err(ProvisionError::UserCancelled.into());
    }

    let session = Session::new("uninstall", STAGES, reporter);
    let unit = config.services.node_unit.as_str();

    session
        .best_effort("remove management service", async {
            session.attempt("stop", host.supervisor.stop(unit)).await;
            session.attempt("disable", host.supervisor.disable(unit)).await;
            session.attempt("remove unit file", host.supervisor.remove(unit)).await;
            session.attempt("reload", host.supervisor.reload()).await;
            Ok(())
        })
        .await;

    session
        .best_effort("remove node files", async {
            remove_dir_if_present(&host.fs, &paths.install_dir)
        })
        .await;

    session
        .best_effort("remove virtual environment", async {
            remove_dir_if_present(&host.fs, &paths.venv_dir)
        })
        .await;

    let driven = session
        .best_effort("uninstall OpenVPN", async {
            if !host.fs.exists(&paths.installer_script) {
                tracing::debug!("installer script absent; skipping driven removal");
                return Ok(());
            }
            let script = uninstall_script(config.timeouts.uninstall_prompt())?;
            let script_path = paths.installer_script.display().to_string();
            let outcome = host
                .driver
                .drive(
                    "bash",
                    &[script_path.as_str()],
                    &script,
                    Some(config.timeouts.uninstall()),
                )
                .await?;
            if !outcome.skipped.is_empty() {
                bail!("installer did not offer removal (prompts {:?} not seen)", outcome.skipped);
            }
            if !outcome.status.success() {
                bail!("installer exited with {}", outcome.status);
            }
            Ok(())
        })
        .await;
    if !driven {
        reporter.step("Removing OpenVPN manually");
    }

    session
        .best_effort("remove OpenVPN configuration", async {
            remove_dir_if_present(&host.fs, &paths.daemon_dir)
        })
        .await;

    session
        .best_effort("remove leftovers", async {
            for file in [&paths.installer_script, &paths.state_file()] {
                if host.fs.exists(file) {
                    host.fs.remove_file(file)?;
                }
            }
            Ok(())
        })
        .await;

    reporter.success("OV-Node uninstalled");
    Ok(session.finish())
}

fn remove_dir_if_present(fs: &impl HostFs, path: &std::path::Path) -> Result<()> {
    if fs.exists(path) {
        fs.remove_dir_all(path)?;
    }
    Ok(())
}
