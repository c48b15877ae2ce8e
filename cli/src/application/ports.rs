//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::DeploySettings;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// A non-zero exit is not an error at this level; callers inspect
    /// `Output::status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or awaited.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Filesystem primitives the build and deploy phases need.
pub trait DeployFs {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Recursively remove `path`. A missing path is not an error.
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    /// Recursively copy everything inside `from`, hidden entries included,
    /// into the existing directory `to`.
    fn copy_dir_contents(&self, from: &Path, to: &Path) -> Result<()>;
    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Replace the content of a file.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

// ── Environment Port ──────────────────────────────────────────────────────────

/// Read access to the process environment.
pub trait EnvSource {
    /// Value of `name`, if set and valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

// ── Settings Port ─────────────────────────────────────────────────────────────

/// Abstracts where deployment settings come from.
pub trait SettingsStore {
    /// Load settings, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed.
    fn load(&self) -> Result<DeploySettings>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a diagnostic line, shown only in verbose mode.
    fn detail(&self, message: &str);
}
