//! Application service: one-shot statements through the database client.

use anyhow::Result;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::application::services::exec::{CommandLine, run_checked};
use crate::domain::sql::terminate;
use crate::domain::{DbCredentials, DeploySettings};

/// Runs statements with `mysql -e` against the platform database.
pub struct Database<'a, R, P> {
    runner: &'a R,
    reporter: &'a P,
    client: &'a str,
    credentials: &'a DbCredentials,
}

impl<'a, R: CommandRunner, P: ProgressReporter> Database<'a, R, P> {
    pub fn new(
        runner: &'a R,
        reporter: &'a P,
        settings: &'a DeploySettings,
        credentials: &'a DbCredentials,
    ) -> Self {
        Self {
            runner,
            reporter,
            client: &settings.db_client,
            credentials,
        }
    }

    /// Client invocation for `statement`. The password flag is left out
    /// entirely when the service has no password.
    #[must_use]
    pub fn command(&self, statement: &str) -> CommandLine {
        let db = self.credentials;
        let mut cmd = CommandLine::new(self.client)
            .arg("-u")
            .arg(db.user.as_str())
            .arg("-h")
            .arg(db.host.as_str())
            .arg("-e")
            .arg(terminate(statement));
        if !db.password.is_empty() {
            cmd = cmd.secret_arg("-p", &db.password);
        }
        cmd.arg(db.name.as_str())
    }

    /// # Errors
    ///
    /// Returns [`crate::domain::DeployError::Command`] if the client fails.
    pub async fn execute(&self, statement: &str) -> Result<String> {
        run_checked(self.runner, self.reporter, &self.command(statement)).await
    }
}
