//! Application context: unified state passed to every command handler.
//!
//! `AppContext` bundles the output context, the resolved deployment settings
//! and the production port implementations, so command handlers take a
//! single `&AppContext`.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::SettingsStore;
use crate::domain::DeploySettings;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlSettingsStore;
use crate::infra::env::ProcessEnv;
use crate::infra::fs::LocalFs;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
#[derive(Debug, Default)]
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Trace every external command.
    pub verbose: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Settings sources and overrides.
#[derive(Debug, Default)]
pub struct SettingsFlags {
    /// Explicit settings file.
    pub config: Option<PathBuf>,
    /// Overrides `app_root` from the file.
    pub app_root: Option<PathBuf>,
    /// Overrides `staging_dir` from the file.
    pub staging_dir: Option<PathBuf>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
#[derive(Debug, Default)]
pub struct AppFlags {
    pub output: OutputFlags,
    pub settings: SettingsFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet and verbose modes).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Resolved deployment settings.
    pub settings: DeploySettings,
    pub runner: TokioCommandRunner,
    pub fs: LocalFs,
    pub env: ProcessEnv,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be parsed.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let store = YamlSettingsStore::resolve(flags.settings.config.as_deref());
        let settings = apply_overrides(store.load()?, &flags.settings);

        Ok(Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet,
                flags.output.verbose,
            ),
            mode,
            settings,
            runner: TokioCommandRunner::new(),
            fs: LocalFs,
            env: ProcessEnv,
        })
    }

    /// Progress reporter bound to this context's output settings.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}

/// Command-line overrides win over the settings file.
#[must_use]
pub fn apply_overrides(mut settings: DeploySettings, flags: &SettingsFlags) -> DeploySettings {
    if let Some(root) = &flags.app_root {
        settings.app_root.clone_from(root);
    }
    if let Some(staging) = &flags.staging_dir {
        settings.staging_dir.clone_from(staging);
    }
    settings
}
