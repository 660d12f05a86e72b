//! Application service: replace the node code with the latest release.
//!
//! The state file is carried over through a backup copy. Once the install
//! directory has been removed, a failure leaves the node degraded; the error
//! then names the backup, if one was taken, for manual recovery.

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::application::ports::{
    ArchiveExtractor, CommandRunner, HostFs, ProgressReporter, RemoteSource, ServiceSupervisor,
};
use crate::application::services::NodeHost;
use crate::application::services::stage::{Session, SessionReport};
use crate::domain::{InstallerConfig, ProvisionError};

const STAGES: usize = 8;

#[derive(Debug, Clone)]
pub struct UpdateSummary {
    pub tarball_url: String,
    /// Whether a previous state file was carried over.
    pub settings_restored: bool,
    pub report: SessionReport,
}

/// Update the node code in place.
///
/// # Errors
///
/// `ProvisionError::NotInstalled` if the install dir is absent; otherwise the
/// failing stage's error, wrapped in `ProvisionError::Degraded` once the
/// install dir has been touched and until the settings are restored.
pub async fn update_node<F, S, D, C, R, A>(
    config: &InstallerConfig,
    host: &NodeHost<F, S, D, C, R, A>,
    reporter: &impl ProgressReporter,
) -> Result<UpdateSummary>
where
    F: HostFs,
    S: ServiceSupervisor,
    C: CommandRunner,
    R: RemoteSource,
    A: ArchiveExtractor,
{
    let paths = &config.paths;
    if !host.fs.exists(&paths.install_dir) {
        return Err(ProvisionError::NotInstalled {
            marker: paths.install_dir.clone(),
        }
        .into());
    }

    let session = Session::new("update", STAGES, reporter);

    let release = session
        .run("fetch release", async {
            host.remote.fetch_release(&config.sources.release_url)
        })
        .await?;

    session
        .run("download release", async {
            tracing::info!(url = %release.tarball_url, "downloading release");
            host.remote.download(&release.tarball_url, &paths.archive_path)?;
            Ok(())
        })
        .await?;

    let backup: Option<PathBuf> = session
        .run("back up node settings", async {
            let state = paths.state_file();
            if !host.fs.exists(&state) {
                tracing::debug!(path = %state.display(), "no state file to back up");
                return Ok(None);
            }
            host.fs.copy(&state, &paths.backup_path)?;
            Ok(Some(paths.backup_path.clone()))
        })
        .await?;

    let degrade = |err: anyhow::Error| {
        err.context(ProvisionError::Degraded {
            backup: backup.clone(),
        })
    };

    session
        .run("recreate install dir", async {
            if host.fs.exists(&paths.install_dir) {
                host.fs.remove_dir_all(&paths.install_dir)?;
            }
            host.fs.create_dir_all(&paths.install_dir, None)
        })
        .await
        .map_err(degrade)?;

    session
        .run("extract release", async {
            host.archive
                .extract_stripped(&paths.archive_path, &paths.install_dir)
        })
        .await
        .map_err(degrade)?;

    let settings_restored = session
        .run("restore node settings", async {
            let Some(path) = &backup else {
                return Ok(false);
            };
            host.fs.copy(path, &paths.state_file())?;
            if let Err(err) = host.fs.remove_file(path) {
                tracing::debug!(error = %format!("{err:#}"), "backup left in place");
            }
            Ok(true)
        })
        .await
        .map_err(degrade)?;

    session
        .run("install dependencies", async {
            let deps = &config.dependencies;
            let args: Vec<&str> = deps.args.iter().map(String::as_str).collect();
            let output = host
                .runner
                .run_in_dir(&deps.program, &args, &paths.install_dir, config.timeouts.dependency())
                .await?;
            if !output.status.success() {
                bail!(
                    "{} {} failed: {}",
                    deps.program,
                    deps.args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(())
        })
        .await?;

    session
        .run("restart management service", async {
            host.supervisor.restart(&config.services.node_unit).await
        })
        .await?;

    reporter.success("OV-Node updated");
    Ok(UpdateSummary {
        tarball_url: release.tarball_url,
        settings_restored,
        report: session.finish(),
    })
}
