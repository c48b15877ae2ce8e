//! JSON output helpers.
//!
//! Provides the error-object formatter used by `--json` code paths when a
//! command fails.

use anyhow::{Context, Result};

use crate::domain::DeployError;

/// Machine-readable category of a failure.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<DeployError>() {
        Some(e) if e.is_configuration() => "configuration",
        Some(DeployError::ConfigFormat { .. }) => "config_format",
        Some(DeployError::Io { .. }) => "io",
        Some(DeployError::Command { .. }) => "command",
        _ => "internal",
    }
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
