//! Node state store: seeding, reading and persisting the state file, and
//! collecting the desired configuration from the operator.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{HostAddress, HostFs, Prompter};
use crate::application::services::config_patcher::patch_key_value_file;
use crate::application::services::stage::Session;
use crate::application::ports::ProgressReporter;
use crate::domain::config::PathsConfig;
use crate::domain::env_file::{self, FALLBACK_TEMPLATE};
use crate::domain::node::{
    ADDRESS_PLACEHOLDER, DEFAULT_SERVICE_PORT, DEFAULT_VPN_PORT, DesiredNodeConfig, Protocol,
    parse_port,
};

/// Write a fresh state file from the release template, or from the built-in
/// template when the release does not ship one.
///
/// # Errors
///
/// Returns an error if the template exists but cannot be read, or the state
/// file cannot be written.
pub fn seed_state_file<R: ProgressReporter>(
    fs: &impl HostFs,
    paths: &PathsConfig,
    session: &Session<'_, R>,
) -> Result<()> {
    let template = paths.state_template();
    let content = if fs.exists(&template) {
        fs.read_to_string(&template)?
    } else {
        session.warn(format!(
            "{} not found; using the built-in template",
            template.display()
        ));
        FALLBACK_TEMPLATE.to_string()
    };
    let state = paths.state_file();
    if let Some(parent) = state.parent() {
        fs.create_dir_all(parent, None)?;
    }
    fs.write(&state, &content)
}

/// Parse the state file.
///
/// # Errors
///
/// `ProvisionError::FileAccess` if it cannot be read.
pub fn read_state(fs: &impl HostFs, path: &Path) -> Result<BTreeMap<String, String>> {
    Ok(env_file::parse(&fs.read_to_string(path)?))
}

/// Store the desired configuration in the state file.
///
/// # Errors
///
/// `ProvisionError::FileAccess` if the state file cannot be read or written.
pub fn persist(fs: &impl HostFs, path: &Path, desired: &DesiredNodeConfig) -> Result<()> {
    patch_key_value_file(fs, path, &desired.state_entries())
        .with_context(|| format!("saving node settings to {}", path.display()))?;
    Ok(())
}

/// Ask the operator for each setting. Empty answers select the default;
/// unusable ports fall back to the default with a warning.
///
/// # Errors
///
/// Returns an error if reading operator input fails.
pub fn collect_desired<R: ProgressReporter>(
    prompter: &impl Prompter,
    host: &impl HostAddress,
    session: &Session<'_, R>,
    generated_key: &str,
) -> Result<DesiredNodeConfig> {
    let address_default = host
        .primary_ipv4()
        .unwrap_or_else(|| ADDRESS_PLACEHOLDER.to_string());
    let tunnel_address = prompter.ask("Tunnel Address", &address_default)?;

    let protocol_answer = prompter.ask("Protocol - tcp or udp", Protocol::default().as_str())?;
    let protocol = Protocol::parse(&protocol_answer).unwrap_or_else(|| {
        session.warn(format!("unknown protocol {protocol_answer:?}; using udp"));
        Protocol::Udp
    });

    let vpn_port = ask_port(prompter, session, "OpenVPN Port", DEFAULT_VPN_PORT)?;
    let service_port = ask_port(prompter, session, "OV-Node service port", DEFAULT_SERVICE_PORT)?;
    let api_key = prompter.ask("OV-Node API key", generated_key)?;

    Ok(DesiredNodeConfig {
        tunnel_address: tunnel_address.trim().to_string(),
        protocol,
        vpn_port,
        service_port,
        api_key: api_key.trim().to_string(),
    })
}

fn ask_port<R: ProgressReporter>(
    prompter: &impl Prompter,
    session: &Session<'_, R>,
    label: &str,
    default: u16,
) -> Result<u16> {
    let answer = prompter.ask(label, &default.to_string())?;
    Ok(parse_port(&answer, default).unwrap_or_else(|| {
        session.warn(format!("{label} {answer:?} is not a valid port; using {default}"));
        default
    }))
}
