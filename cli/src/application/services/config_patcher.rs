//! File-level wrappers around the pure patch transforms.
//!
//! Each function reads the file through `HostFs`, applies the transform and
//! writes back atomically. Unchanged content is not rewritten.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::HostFs;
use crate::domain::env_file::patch_assignments;
use crate::domain::patch::{DirectiveUpdate, ensure_lines, patch_directives};

fn rewrite(fs: &impl HostFs, path: &Path, transform: impl FnOnce(&str) -> String) -> Result<bool> {
    let before = fs.read_to_string(path)?;
    let after = transform(&before);
    if after == before {
        tracing::debug!(path = %path.display(), "already up to date");
        return Ok(false);
    }
    fs.write(path, &after)?;
    tracing::debug!(path = %path.display(), "rewritten");
    Ok(true)
}

/// Rewrite `KEY = VALUE` assignments; keys absent from the file are ignored.
///
/// # Errors
///
/// `ProvisionError::FileAccess` if the file cannot be read or written.
pub fn patch_key_value_file(
    fs: &impl HostFs,
    path: &Path,
    replacements: &[(String, String)],
) -> Result<bool> {
    rewrite(fs, path, |text| patch_assignments(text, replacements))
}

/// Apply line-anchored directive updates.
///
/// # Errors
///
/// `ProvisionError::FileAccess` if the file cannot be read or written.
pub fn patch_directive_file(
    fs: &impl HostFs,
    path: &Path,
    updates: &[DirectiveUpdate],
) -> Result<bool> {
    rewrite(fs, path, |text| patch_directives(text, updates))
}

/// Append each required directive line that is not already present.
///
/// # Errors
///
/// `ProvisionError::FileAccess` if the file cannot be read or written.
pub fn ensure_directives(fs: &impl HostFs, path: &Path, required: &[String]) -> Result<bool> {
    rewrite(fs, path, |text| ensure_lines(text, required))
}
