//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags, SettingsFlags};
use crate::commands;

/// Build and deploy hooks for a Magento application on a managed hosting platform
#[derive(Parser)]
#[command(
    name = "platform-deploy",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Trace every external command with its status and output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Settings file (YAML)
    #[arg(long, global = true, env = "PLATFORM_DEPLOY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Application root directory
    #[arg(long, global = true, value_name = "DIR")]
    pub app_root: Option<PathBuf>,

    /// Staging directory for writable directories between build and deploy
    #[arg(long, global = true, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the build hook: compile and park writable directories
    Build,

    /// Run the deploy hook: restore, install or update, set mode, deploy static content
    Deploy,

    /// Show the classified platform routes
    Routes,

    /// Show version
    Version,
}

impl Cli {
    /// Whether `--json` was requested.
    #[must_use]
    pub fn json(&self) -> bool {
        self.json
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded or the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            verbose,
            no_color,
            config,
            app_root,
            staging_dir,
            command,
        } = self;

        if matches!(command, Command::Version) {
            commands::version::run(json);
            return Ok(ExitCode::SUCCESS);
        }

        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                verbose,
                json,
            },
            settings: SettingsFlags {
                config,
                app_root,
                staging_dir,
            },
        })?;

        match command {
            Command::Build => commands::build::run(&app).await,
            Command::Deploy => commands::deploy::run(&app).await,
            Command::Routes => commands::routes::run(&app),
            Command::Version => Ok(ExitCode::SUCCESS),
        }
    }
}
