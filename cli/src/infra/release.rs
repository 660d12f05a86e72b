//! HTTP implementation of the `RemoteSource` port (blocking `ureq`).

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ReleaseDescriptor, RemoteSource};
use crate::domain::ProvisionError;

pub struct HttpRemote {
    agent: ureq::Agent,
    token: Option<String>,
}

impl HttpRemote {
    #[must_use]
    pub fn new(timeout: Duration, user_agent: &str, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self {
            agent,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Only the release API sees the token; downloads may be redirected to
    /// other hosts.
    fn request(&self, url: &str, authorized: bool) -> ureq::Request {
        let request = self.agent.get(url);
        match &self.token {
            Some(token) if authorized => request.set("Authorization", &format!("Bearer {token}")),
            _ => request,
        }
    }

    fn get(&self, url: &str, authorized: bool) -> Result<ureq::Response> {
        self.request(url, authorized)
            .call()
            .map_err(|e| network(url, &e).into())
    }
}

fn network(url: &str, err: &dyn std::fmt::Display) -> ProvisionError {
    ProvisionError::Network {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

impl RemoteSource for HttpRemote {
    fn fetch_release(&self, url: &str) -> Result<ReleaseDescriptor> {
        let body = self.get(url, true)?.into_string().map_err(|e| network(url, &e))?;
        parse_descriptor(url, &body)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.get(url, false)?;
        let mut file = std::fs::File::create(dest)
            .map_err(|e| ProvisionError::file_access(dest, &e))?;
        let bytes = io::copy(&mut response.into_reader(), &mut file).map_err(|e| network(url, &e))?;
        file.flush().map_err(|e| ProvisionError::file_access(dest, &e))?;
        tracing::debug!(url, bytes, dest = %dest.display(), "downloaded");
        Ok(bytes)
    }
}

fn parse_descriptor(url: &str, body: &str) -> Result<ReleaseDescriptor> {
    serde_json::from_str(body).map_err(|e| network(url, &format!("unexpected release descriptor: {e}")).into())
}
