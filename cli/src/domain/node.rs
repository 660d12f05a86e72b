//! Desired node configuration and the protocol projection onto daemon directives.
//!
//! Pure types only: no I/O, no async, no filesystem access.

use std::fmt;

use serde::Serialize;

// ── State-file keys and defaults ─────────────────────────────────────────────

pub const KEY_TUNNEL_ADDRESS: &str = "TUNNEL_ADDRESS";
pub const KEY_PROTOCOL: &str = "PROTOCOL";
pub const KEY_VPN_PORT: &str = "OVPN_PORT";
pub const KEY_SERVICE_PORT: &str = "SERVICE_PORT";
pub const KEY_API_KEY: &str = "API_KEY";

pub const DEFAULT_VPN_PORT: u16 = 1194;
pub const DEFAULT_SERVICE_PORT: u16 = 9090;
/// Shown when no tunnel address can be resolved.
pub const UNKNOWN_ADDRESS: &str = "N/A";
/// Offered as the tunnel address when the host address cannot be resolved.
pub const ADDRESS_PLACEHOLDER: &str = "YOUR_SERVER_IP";

// ── Protocol ─────────────────────────────────────────────────────────────────

/// Transport protocol of the tunnel. Anything unrecognised means `Udp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    #[default]
    Udp,
}

impl Protocol {
    /// Parse a protocol token, accepting the daemon's directive forms.
    ///
    /// `tcp`, `tcp-server` and `tcp-client` all mean TCP.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "tcp" | "tcp-server" | "tcp-client" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            _ => None,
        }
    }

    /// Token written to the server config `proto` directive.
    #[must_use]
    pub fn server_token(self) -> &'static str {
        match self {
            Self::Tcp => "tcp-server",
            Self::Udp => "udp",
        }
    }

    /// Token written to the client template `proto` directive.
    #[must_use]
    pub fn client_token(self) -> &'static str {
        match self {
            Self::Tcp => "tcp-client",
            Self::Udp => "udp",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Desired node configuration ───────────────────────────────────────────────

/// The node's desired state, persisted in the state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesiredNodeConfig {
    pub tunnel_address: String,
    pub protocol: Protocol,
    pub vpn_port: u16,
    pub service_port: u16,
    pub api_key: String,
}

impl DesiredNodeConfig {
    /// Key/value pairs in the order they are written to the state file.
    #[must_use]
    pub fn state_entries(&self) -> Vec<(String, String)> {
        vec![
            (KEY_SERVICE_PORT.to_string(), self.service_port.to_string()),
            (KEY_API_KEY.to_string(), self.api_key.clone()),
            (KEY_TUNNEL_ADDRESS.to_string(), self.tunnel_address.clone()),
            (KEY_PROTOCOL.to_string(), self.protocol.to_string()),
            (KEY_VPN_PORT.to_string(), self.vpn_port.to_string()),
        ]
    }
}

/// Parse a port answer. Empty input selects `default`; `None` means the
/// input was not a valid port.
#[must_use]
pub fn parse_port(input: &str, default: u16) -> Option<u16> {
    let input = input.trim();
    if input.is_empty() {
        return Some(default);
    }
    input.parse::<u16>().ok().filter(|p| *p != 0)
}
