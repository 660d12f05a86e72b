//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::domain::{ExpectScript, ServiceStatus, ServiceUnit};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program in `dir` with a custom timeout.
    async fn run_in_dir(
        &self,
        program: &str,
        args: &[&str],
        dir: &Path,
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Interactive Driver Port ───────────────────────────────────────────────────

/// Result of driving an interactive program to completion.
#[derive(Debug, Clone)]
pub struct DriveOutcome {
    pub status: ExitStatus,
    /// Indices of script steps whose prompt appeared and was answered.
    pub answered: Vec<usize>,
    /// Indices of script steps that timed out or were never reached.
    pub skipped: Vec<usize>,
}

/// Runs a program on a pseudo-terminal and answers its prompts.
#[allow(async_fn_in_trait)]
pub trait InteractiveDriver {
    /// Spawn `program`, work through `script`, then wait for it to exit.
    ///
    /// `overall_timeout` bounds the wait after the script; `None` waits
    /// indefinitely.
    ///
    /// # Errors
    ///
    /// `ProvisionError::ProcessSpawn` if the program or terminal cannot be
    /// set up, `ProvisionError::ProcessTimeout` if the program outlives
    /// `overall_timeout` (it is killed first).
    async fn drive(
        &self,
        program: &str,
        args: &[&str],
        script: &ExpectScript,
        overall_timeout: Option<Duration>,
    ) -> Result<DriveOutcome>;
}

// ── Service Supervisor Port ───────────────────────────────────────────────────

/// Service-manager operations on named units.
#[allow(async_fn_in_trait)]
pub trait ServiceSupervisor {
    /// Write the unit file, reload, enable and start it.
    async fn install(&self, unit: &ServiceUnit) -> Result<()>;
    async fn restart(&self, name: &str) -> Result<()>;
    async fn stop(&self, name: &str) -> Result<()>;
    async fn disable(&self, name: &str) -> Result<()>;
    /// Delete the unit file.
    async fn remove(&self, name: &str) -> Result<()>;
    /// Reload unit definitions.
    async fn reload(&self) -> Result<()>;
    /// Never fails; an unanswerable query is `ServiceStatus::Unknown`.
    async fn query_status(&self, name: &str) -> ServiceStatus;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Host filesystem operations used by the procedures.
pub trait HostFs {
    fn exists(&self, path: &Path) -> bool;
    /// # Errors
    ///
    /// `ProvisionError::FileAccess` if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Replace `path` atomically (temp file in the same directory + rename).
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    /// Create `path` and its parents; apply `mode` to `path` when given.
    fn create_dir_all(&self, path: &Path, mode: Option<u32>) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

// ── Prompt Port ───────────────────────────────────────────────────────────────

/// Operator interaction.
pub trait Prompter {
    /// Ask for a value; empty input returns `default`.
    fn ask(&self, prompt: &str, default: &str) -> Result<String>;
    /// Ask a yes/no question; only `y`/`Y` counts as yes.
    fn confirm(&self, prompt: &str) -> Result<bool>;
    /// Wait for Enter.
    fn pause(&self, prompt: &str) -> Result<()>;
}

// ── Remote Source Port ────────────────────────────────────────────────────────

/// Release metadata; every field except `tarball_url` is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub tarball_url: String,
}

/// HTTP access to release metadata and downloads.
pub trait RemoteSource {
    /// Fetch and parse the release descriptor at `url`.
    ///
    /// # Errors
    ///
    /// `ProvisionError::Network` on transport or HTTP failure, or if the body
    /// has no `tarball_url`.
    fn fetch_release(&self, url: &str) -> Result<ReleaseDescriptor>;
    /// Download `url` to `dest`, returning the number of bytes written.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

// ── Archive Port ──────────────────────────────────────────────────────────────

pub trait ArchiveExtractor {
    /// Unpack a gzip tarball into `dest`, dropping the first path component
    /// of every entry.
    fn extract_stripped(&self, archive: &Path, dest: &Path) -> Result<()>;
}

// ── Host Address Port ─────────────────────────────────────────────────────────

pub trait HostAddress {
    /// This host's primary IPv4 address, if it can be resolved.
    fn primary_ipv4(&self) -> Option<String>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
