//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};

use crate::domain::NodeInfo;

/// Serialize the inspect view.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_info(info: &NodeInfo) -> Result<String> {
    serde_json::to_string_pretty(info).context("JSON serialization failed")
}

/// Format the error object printed when a `--json` command fails.
///
/// ```json
/// {
///   "error": true,
///   "message": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(err: &anyhow::Error) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": format!("{err:#}"),
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
