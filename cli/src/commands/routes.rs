//! `platform-deploy routes`: show how the platform routes are classified.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::app::{AppContext, OutputMode};
use crate::application::load_environment;
use crate::domain::EnvironmentContext;
use crate::domain::routes::RouteTable;

#[derive(Serialize)]
struct RoutesReport<'a> {
    #[serde(flatten)]
    routes: &'a RouteTable,
    branch: Option<&'a str>,
    primary_branch: bool,
}

/// Decode the platform environment and print the route table.
///
/// # Errors
///
/// Returns a configuration error if the platform variables are missing or
/// malformed.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let ctx = load_environment(&app.env, &app.settings)?;
    match app.mode {
        OutputMode::Json => print_json(app, &ctx)?,
        OutputMode::Human => print_human(app, &ctx),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json(app: &AppContext, ctx: &EnvironmentContext) -> Result<()> {
    let report = RoutesReport {
        routes: &ctx.routes,
        branch: ctx.branch.as_deref(),
        primary_branch: ctx.is_primary_branch(&app.settings.primary_branch),
    };
    let text = serde_json::to_string_pretty(&report).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}

fn print_human(app: &AppContext, ctx: &EnvironmentContext) {
    let out = &app.output;
    for (bucket, urls) in ctx.routes.iter_buckets() {
        out.header(bucket.as_str());
        if urls.is_empty() {
            out.kv("(none)", "");
        }
        for (suffix, url) in urls {
            let label = if suffix.is_empty() { "(primary)" } else { suffix.as_str() };
            out.kv(label, url);
        }
    }
    if let Some(branch) = &ctx.branch {
        let kind = if ctx.is_primary_branch(&app.settings.primary_branch) {
            "primary"
        } else {
            "non-primary"
        };
        out.kv("branch", &format!("{branch} ({kind})"));
    }
}
