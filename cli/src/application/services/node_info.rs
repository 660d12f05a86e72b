//! Application service: inspect the node.

use anyhow::Result;

use crate::application::ports::{HostFs, ServiceSupervisor};
use crate::application::services::node_state::read_state;
use crate::domain::info::{InfoInputs, resolve};
use crate::domain::{InstallerConfig, NodeInfo, ProvisionError};

/// Gather the node view. Unreadable daemon files and an unknown service
/// state degrade to fallbacks rather than failing.
///
/// # Errors
///
/// `ProvisionError::NotInstalled` if the state file is absent, or an error if
/// it cannot be read.
pub async fn show_info(
    config: &InstallerConfig,
    fs: &impl HostFs,
    supervisor: &impl ServiceSupervisor,
) -> Result<NodeInfo> {
    let paths = &config.paths;
    let state_path = paths.state_file();
    if !fs.exists(&state_path) {
        return Err(ProvisionError::NotInstalled { marker: state_path }.into());
    }
    let state = read_state(fs, &state_path)?;

    let read_optional = |path: &std::path::Path| match fs.read_to_string(path) {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %format!("{err:#}"), "fallback source unavailable");
            None
        }
    };
    let server_conf = read_optional(&paths.server_conf);
    let client_template = read_optional(&paths.client_template);
    let service_status = supervisor.query_status(&config.services.node_unit).await;

    Ok(resolve(&InfoInputs {
        state: &state,
        server_conf: server_conf.as_deref(),
        client_template: client_template.as_deref(),
        service_status,
    }))
}
