//! `platform-deploy deploy`: the deploy hook.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::Orchestrator;

/// Restore writable directories, install or update, set the mode and
/// deploy static content.
///
/// # Errors
///
/// Returns the first failing step, annotated with the last completed phase.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let reporter = app.reporter();
    let mut orchestrator = Orchestrator::new(&app.runner, &app.fs, &reporter, &app.settings);

    let result = orchestrator.deploy(&app.env).await;
    result.with_context(|| {
        format!("deploy stopped after phase '{}'", orchestrator.deploy_phase())
    })?;
    Ok(ExitCode::SUCCESS)
}
