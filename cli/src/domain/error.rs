//! Typed domain error enum.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::process`, or `std::net`.
//! `DeployError` implements `thiserror::Error` and converts to `anyhow::Error`
//! via the `?` operator; callers that need the category use `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

/// Every fatal condition a build or deploy run can hit.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Platform environment is missing, undecodable, or lacks a relationship.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A route lookup needed by the installer found nothing.
    #[error("Configuration error: no {bucket} route for suffix '{suffix}'")]
    MissingRoute { bucket: String, suffix: String },

    /// The persisted configuration document does not have the expected shape.
    #[error("Malformed configuration document {}: {reason}", .path.display())]
    ConfigFormat { path: PathBuf, reason: String },

    /// A filesystem operation failed.
    #[error("I/O error while {op} {}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external command exited with a non-zero status.
    #[error("Command {command} returned code {code}{}", stderr_suffix(.stderr))]
    Command {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl DeployError {
    /// Shorthand for a `Configuration` error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// `true` for both configuration variants.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::MissingRoute { .. })
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
