//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Failures raised by the provisioning procedures and the adapters they drive.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to start {program}: {reason}")]
    ProcessSpawn { program: String, reason: String },

    #[error("{program} did not finish within {secs}s and was killed")]
    ProcessTimeout { program: String, secs: u64 },

    #[error("cannot access {}: {reason}", .path.display())]
    FileAccess { path: PathBuf, reason: String },

    #[error("service manager failed to {action} {unit}: {reason}")]
    ServiceManager {
        action: String,
        unit: String,
        reason: String,
    },

    #[error("network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("operation cancelled by operator")]
    UserCancelled,

    #[error("OV-Node is already installed ({} exists).", .marker.display())]
    AlreadyInstalled { marker: PathBuf },

    #[error("OV-Node is not installed ({} not found).", .marker.display())]
    NotInstalled { marker: PathBuf },

    #[error(
        "node left in a degraded state; restore the configuration manually{}",
        .backup.as_ref().map(|p| format!(" from {}", p.display())).unwrap_or_default()
    )]
    Degraded { backup: Option<PathBuf> },
}

impl ProvisionError {
    /// Build a `FileAccess` error from an I/O failure.
    pub fn file_access(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

// ── Stage errors ──────────────────────────────────────────────────────────────

/// Context attached to the error of a failed stage.
///
/// Recoverable with `anyhow::Error::downcast_ref::<StageFailed>()`.
#[derive(Debug, Error)]
#[error("{procedure} aborted at stage {index}/{total} ({stage})")]
pub struct StageFailed {
    pub procedure: String,
    pub stage: String,
    pub index: usize,
    pub total: usize,
    /// Stages that completed before the failure; they are not rolled back.
    pub completed: Vec<String>,
}
