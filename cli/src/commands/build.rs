//! `platform-deploy build`: the build hook.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::Orchestrator;

/// Clear staging, compile the application, quarantine writable directories.
///
/// # Errors
///
/// Returns the first failing step, annotated with the last completed phase.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let reporter = app.reporter();
    let mut orchestrator = Orchestrator::new(&app.runner, &app.fs, &reporter, &app.settings);

    let result = orchestrator.build().await;
    result.with_context(|| format!("build stopped after phase '{}'", orchestrator.build_phase()))?;
    Ok(ExitCode::SUCCESS)
}
