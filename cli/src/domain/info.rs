//! The node inspect view and how each field is resolved.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::node::{
    DEFAULT_VPN_PORT, KEY_API_KEY, KEY_PROTOCOL, KEY_SERVICE_PORT, KEY_TUNNEL_ADDRESS,
    KEY_VPN_PORT, Protocol, UNKNOWN_ADDRESS,
};
use crate::domain::patch::directive_argument;

/// Live state of a systemd unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Unknown,
}

impl ServiceStatus {
    /// Map a `systemctl is-active` answer.
    #[must_use]
    pub fn from_is_active(stdout: &str) -> Self {
        if stdout.trim() == "active" {
            Self::Running
        } else {
            Self::Stopped
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        }
    }
}

/// Where a displayed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    StateFile,
    ServerConfig,
    ClientTemplate,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoSources {
    pub tunnel_address: ValueSource,
    pub protocol: ValueSource,
    pub vpn_port: ValueSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub tunnel_address: String,
    pub protocol: Protocol,
    pub vpn_port: u16,
    pub service_port: Option<String>,
    pub api_key: Option<String>,
    pub service_status: ServiceStatus,
    pub sources: InfoSources,
}

/// Inputs to [`resolve`]; the daemon files are `None` when unreadable.
pub struct InfoInputs<'a> {
    pub state: &'a BTreeMap<String, String>,
    pub server_conf: Option<&'a str>,
    pub client_template: Option<&'a str>,
    pub service_status: ServiceStatus,
}

/// Resolve every field: state file first, then daemon config, then default.
#[must_use]
pub fn resolve(inputs: &InfoInputs<'_>) -> NodeInfo {
    let state = |key: &str| {
        inputs
            .state
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let (vpn_port, port_src) = state(KEY_VPN_PORT)
        .and_then(|v| v.parse::<u16>().ok())
        .map(|p| (p, ValueSource::StateFile))
        .or_else(|| {
            inputs
                .server_conf
                .and_then(|c| directive_argument(c, "port"))
                .and_then(|v| v.parse::<u16>().ok())
                .map(|p| (p, ValueSource::ServerConfig))
        })
        .unwrap_or((DEFAULT_VPN_PORT, ValueSource::Default));

    let (protocol, proto_src) = state(KEY_PROTOCOL)
        .and_then(Protocol::parse)
        .map(|p| (p, ValueSource::StateFile))
        .or_else(|| {
            inputs
                .server_conf
                .and_then(|c| directive_argument(c, "proto"))
                .and_then(Protocol::parse)
                .map(|p| (p, ValueSource::ServerConfig))
        })
        .unwrap_or((Protocol::default(), ValueSource::Default));

    let (tunnel_address, addr_src) = state(KEY_TUNNEL_ADDRESS)
        .map(|a| (a.to_string(), ValueSource::StateFile))
        .or_else(|| {
            inputs
                .client_template
                .and_then(|c| directive_argument(c, "remote"))
                .map(|a| (a.to_string(), ValueSource::ClientTemplate))
        })
        .unwrap_or_else(|| (UNKNOWN_ADDRESS.to_string(), ValueSource::Default));

    NodeInfo {
        tunnel_address,
        protocol,
        vpn_port,
        service_port: state(KEY_SERVICE_PORT).map(str::to_string),
        api_key: state(KEY_API_KEY).map(str::to_string),
        service_status: inputs.service_status,
        sources: InfoSources {
            tunnel_address: addr_src,
            protocol: proto_src,
            vpn_port: port_src,
        },
    }
}
