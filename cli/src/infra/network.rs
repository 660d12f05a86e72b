//! Network infrastructure: implements `HostAddress` by resolving the hostname.

use std::net::{IpAddr, ToSocketAddrs};

use crate::application::ports::HostAddress;

/// Resolves this host's own name and picks the first non-loopback IPv4.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameResolver;

impl HostAddress for HostnameResolver {
    fn primary_ipv4(&self) -> Option<String> {
        let name = nix::unistd::gethostname().ok()?;
        let name = name.to_str()?.to_string();
        let addrs = match (name.as_str(), 0).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                tracing::debug!(host = %name, error = %err, "hostname did not resolve");
                return None;
            }
        };
        first_public_v4(addrs.map(|a| a.ip()))
    }
}

fn first_public_v4(addrs: impl IntoIterator<Item = IpAddr>) -> Option<String> {
    addrs.into_iter().find_map(|ip| match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4.to_string()),
        _ => None,
    })
}
