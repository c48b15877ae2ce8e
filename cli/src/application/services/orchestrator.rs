//! Application service: build and deploy hooks.
//!
//! Imports only from `crate::domain` and `crate::application`. Every
//! external effect goes through the injected ports, one step at a time;
//! the first failure aborts the run and leaves the last completed phase
//! observable.

use anyhow::Result;

use crate::application::ports::{CommandRunner, DeployFs, EnvSource, ProgressReporter};
use crate::application::services::app_cli::{AppCli, install_flags};
use crate::application::services::config_document::{read_installed_flag, rewrite};
use crate::application::services::database::Database;
use crate::domain::credential::Credential;
use crate::domain::sql::{update_admin_user, update_base_urls};
use crate::domain::{BuildPhase, DeployPhase, DeploySettings, EnvironmentContext};

/// Decode the platform environment through `env`.
///
/// # Errors
///
/// Returns [`crate::domain::DeployError::Configuration`] when the platform
/// variables are missing or malformed.
pub fn load_environment(
    env: &impl EnvSource,
    settings: &DeploySettings,
) -> Result<EnvironmentContext> {
    Ok(EnvironmentContext::load(|name| env.var(name), settings)?)
}

/// Drives the build and deploy hooks against injected ports.
pub struct Orchestrator<'a, R, F, P> {
    runner: &'a R,
    fs: &'a F,
    reporter: &'a P,
    settings: &'a DeploySettings,
    build_phase: BuildPhase,
    deploy_phase: DeployPhase,
}

impl<'a, R, F, P> Orchestrator<'a, R, F, P>
where
    R: CommandRunner,
    F: DeployFs,
    P: ProgressReporter,
{
    pub fn new(runner: &'a R, fs: &'a F, reporter: &'a P, settings: &'a DeploySettings) -> Self {
        Self {
            runner,
            fs,
            reporter,
            settings,
            build_phase: BuildPhase::default(),
            deploy_phase: DeployPhase::default(),
        }
    }

    /// Last build phase that completed.
    #[must_use]
    pub fn build_phase(&self) -> BuildPhase {
        self.build_phase
    }

    /// Last deploy phase that completed.
    #[must_use]
    pub fn deploy_phase(&self) -> DeployPhase {
        self.deploy_phase
    }

    fn app_cli(&self) -> AppCli<'a, R, P> {
        AppCli::new(self.runner, self.reporter, self.settings)
    }

    fn advance_build(&mut self, next: BuildPhase) {
        debug_assert!(self.build_phase.can_advance_to(next));
        self.build_phase = next;
    }

    fn advance_deploy(&mut self, next: DeployPhase) {
        debug_assert!(self.deploy_phase.can_advance_to(next));
        self.deploy_phase = next;
    }

    // ── Build ────────────────────────────────────────────────────────────────

    /// Run the build hook: clear staging, compile, quarantine writable dirs.
    ///
    /// # Errors
    ///
    /// Returns the first filesystem or command failure.
    pub async fn build(&mut self) -> Result<()> {
        self.reporter.step("Start build.");

        self.clear_staging()?;
        self.advance_build(BuildPhase::StagingCleared);

        self.compile().await?;
        self.advance_build(BuildPhase::Compiled);

        self.quarantine()?;
        self.advance_build(BuildPhase::Quarantined);

        self.reporter.success("Build complete.");
        Ok(())
    }

    fn clear_staging(&self) -> Result<()> {
        self.reporter.step("Clearing temporary directory.");
        self.fs.remove_dir_all(&self.settings.staging_dir)
    }

    async fn compile(&self) -> Result<()> {
        let cli = self.app_cli();
        self.reporter.step("Enable all modules.");
        cli.enable_all_modules().await?;
        self.reporter.step("Compiling generated files.");
        cli.compile_di().await?;
        Ok(())
    }

    fn quarantine(&self) -> Result<()> {
        self.reporter
            .step("Copying read/write directories to temp directory.");
        for dir in &self.settings.writable_dirs {
            let live = self.settings.app_path(dir);
            let staged = self.settings.staged_path(dir);
            self.reporter.step(&format!(
                "Copying {} to {}",
                live.display(),
                staged.display()
            ));
            self.fs.create_dir_all(&staged)?;
            self.fs.copy_dir_contents(&live, &staged)?;
            self.fs.remove_dir_all(&live)?;
            self.fs.create_dir_all(&live)?;
        }
        Ok(())
    }

    // ── Deploy ───────────────────────────────────────────────────────────────

    /// Run the deploy hook: restore writable dirs, install or update, set
    /// the application mode, deploy static content.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the environment cannot be decoded,
    /// or the first filesystem or command failure after that.
    pub async fn deploy(&mut self, env: &impl EnvSource) -> Result<()> {
        self.reporter.step("Start deploy.");

        let ctx = self.init(env)?;
        self.advance_deploy(DeployPhase::Initialized);

        self.restore()?;
        self.advance_deploy(DeployPhase::Restored);

        let env_file = self.settings.env_file();
        if read_installed_flag(self.fs, &env_file)? {
            self.update(&ctx).await?;
            self.advance_deploy(DeployPhase::Updated);
        } else {
            self.install(&ctx).await?;
            self.advance_deploy(DeployPhase::Installed);
        }

        let mode = ctx.desired_mode();
        self.reporter
            .step(&format!("Setting application mode to: {mode}"));
        self.app_cli().set_mode(mode).await?;
        self.advance_deploy(DeployPhase::ModeSet);

        self.app_cli().deploy_static_content().await?;
        self.advance_deploy(DeployPhase::StaticDeployed);

        self.reporter.success("Deploy complete.");
        Ok(())
    }

    fn init(&self, env: &impl EnvSource) -> Result<EnvironmentContext> {
        self.reporter.step("Preparing environment specific data.");
        let ctx = load_environment(env, self.settings)?;

        for (bucket, urls) in ctx.routes.iter_buckets() {
            for (suffix, url) in urls {
                let suffix = if suffix.is_empty() { "(primary)" } else { suffix.as_str() };
                self.reporter
                    .detail(&format!("Route {} {suffix}: {url}", bucket.as_str()));
            }
        }
        match ctx.branch.as_deref() {
            Some(branch) if ctx.is_primary_branch(&self.settings.primary_branch) => {
                self.reporter
                    .step(&format!("Deploying primary branch {branch}."));
            }
            Some(branch) => self.reporter.step(&format!("Deploying branch {branch}.")),
            None => {}
        }
        Ok(ctx)
    }

    fn restore(&self) -> Result<()> {
        self.reporter.step("Copying read/write directories back.");
        for dir in &self.settings.writable_dirs {
            let live = self.settings.app_path(dir);
            let staged = self.settings.staged_path(dir);
            self.fs.create_dir_all(&live)?;
            self.reporter.step(&format!(
                "Copying back {} to {}",
                staged.display(),
                live.display()
            ));
            match self.fs.copy_dir_contents(&staged, &live) {
                Ok(()) => self
                    .reporter
                    .step(&format!("Copied directory: {}", live.display())),
                Err(e) => self
                    .reporter
                    .warn(&format!("Could not restore {}: {e:#}", live.display())),
            }
        }
        Ok(())
    }

    async fn install(&self, ctx: &EnvironmentContext) -> Result<()> {
        self.reporter.step("Installing Magento.");
        let flags = install_flags(ctx, self.settings)?;
        self.app_cli().install(&flags).await?;
        Ok(())
    }

    async fn update(&self, ctx: &EnvironmentContext) -> Result<()> {
        self.reporter.step("Updating Magento.");

        self.reporter
            .step("Updating env.php with new configuration from environment.");
        let report = rewrite(
            self.fs,
            &self.settings.env_file(),
            &ctx.db,
            &ctx.redis,
            &ctx.admin.url,
        )?;
        for frontend in &report.redis_frontends {
            let label = if frontend == "page_cache" { "page cache" } else { "cache" };
            self.reporter
                .step(&format!("Updating env.php Redis {label} configuration."));
        }
        for path in &report.skipped {
            self.reporter
                .detail(&format!("env.php has no {path} section; left unchanged"));
        }

        let db = Database::new(self.runner, self.reporter, self.settings, &ctx.db);

        self.reporter.step("Updating admin credentials.");
        let credential = Credential::generate(&ctx.admin.password)?;
        db.execute(&update_admin_user(&ctx.admin, &credential)).await?;

        self.reporter.step("Updating secure and unsecure URLs.");
        for statement in update_base_urls(&ctx.routes) {
            db.execute(&statement).await?;
        }

        let cli = self.app_cli();
        cli.upgrade().await?;
        cli.flush_cache().await?;
        Ok(())
    }
}
