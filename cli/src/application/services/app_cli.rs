//! Application service: wrapper around the application's management CLI.

use anyhow::Result;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::exec::{CliFlag, CommandLine, run_checked};
use crate::domain::environment::EnvironmentContext;
use crate::domain::routes::UrlBucket;
use crate::domain::{ApplicationMode, DeploySettings};

/// Runs `<app_root>/bin/magento` subcommands.
pub struct AppCli<'a, R, P> {
    runner: &'a R,
    reporter: &'a P,
    program: String,
}

impl<'a, R: CommandRunner, P: ProgressReporter> AppCli<'a, R, P> {
    pub fn new(runner: &'a R, reporter: &'a P, settings: &DeploySettings) -> Self {
        Self {
            runner,
            reporter,
            program: settings.cli_tool_path().to_string_lossy().into_owned(),
        }
    }

    /// Run `command` with `flags`, returning stdout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::DeployError::Command`] on a non-zero exit.
    pub async fn run(&self, command: &str, flags: &[CliFlag]) -> Result<String> {
        let cmd = CommandLine::new(self.program.as_str()).arg(command).flags(flags);
        self.exec(&cmd).await
    }

    async fn exec(&self, cmd: &CommandLine) -> Result<String> {
        self.reporter.step(&format!("Running {cmd}"));
        run_checked(self.runner, self.reporter, cmd).await
    }

    pub async fn enable_all_modules(&self) -> Result<String> {
        self.run("module:enable", &[CliFlag::bare("all")]).await
    }

    pub async fn compile_di(&self) -> Result<String> {
        self.run("setup:di:compile", &[]).await
    }

    pub async fn install(&self, flags: &[CliFlag]) -> Result<String> {
        self.run("setup:install", flags).await
    }

    pub async fn upgrade(&self) -> Result<String> {
        self.run("setup:upgrade", &[CliFlag::bare("keep-generated")])
            .await
    }

    pub async fn flush_cache(&self) -> Result<String> {
        self.run("cache:flush", &[]).await
    }

    /// Switch the application mode without recompiling.
    pub async fn set_mode(&self, mode: ApplicationMode) -> Result<String> {
        let cmd = CommandLine::new(self.program.as_str())
            .arg("deploy:mode:set")
            .arg(mode.as_str())
            .flags(&[CliFlag::bare("skip-compliation")]);
        self.exec(&cmd).await
    }

    pub async fn deploy_static_content(&self) -> Result<String> {
        self.run("setup:static-content:deploy", &[]).await
    }
}

/// Flags for a fresh `setup:install`, in the order the installer receives them.
///
/// # Errors
///
/// Returns [`crate::domain::DeployError::MissingRoute`] when either bucket
/// lacks the primary (empty suffix) URL.
pub fn install_flags(ctx: &EnvironmentContext, settings: &DeploySettings) -> Result<Vec<CliFlag>> {
    let base_url = ctx.routes.url(UrlBucket::Unsecure, "")?;
    let base_url_secure = ctx.routes.url(UrlBucket::Secure, "")?;
    let admin = &ctx.admin;

    let mut flags = vec![
        CliFlag::value("session-save", "db"),
        CliFlag::bare("cleanup-database"),
        CliFlag::value("currency", &settings.currency),
        CliFlag::value("base-url", base_url),
        CliFlag::value("base-url-secure", base_url_secure),
        CliFlag::value("use-rewrites", "1"),
        CliFlag::value("language", &settings.language),
        CliFlag::value("timezone", &settings.timezone),
        CliFlag::value("db-host", &ctx.db.host),
        CliFlag::value("db-name", &ctx.db.name),
        CliFlag::value("db-user", &ctx.db.user),
        CliFlag::value("backend-frontname", &admin.url),
        CliFlag::value("admin-user", &admin.username),
        CliFlag::value("admin-firstname", &admin.firstname),
        CliFlag::value("admin-lastname", &admin.lastname),
        CliFlag::value("admin-email", &admin.email),
        CliFlag::secret("admin-password", &admin.password),
    ];
    if !ctx.db.password.is_empty() {
        flags.push(CliFlag::secret("db-password", &ctx.db.password));
    }
    Ok(flags)
}
