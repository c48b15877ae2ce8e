//! Checked command execution.
//!
//! Builds argv for external tools, runs it through the [`CommandRunner`]
//! port, and turns a non-zero exit into [`DeployError::Command`]. Secret
//! arguments are masked wherever a command line is displayed.

use std::fmt;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::DeployError;

const MASK: &str = "****";

/// A `--flag` or `--key=value` option for the application CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliFlag {
    Bare(String),
    Value {
        key: String,
        value: String,
        secret: bool,
    },
}

impl CliFlag {
    #[must_use]
    pub fn bare(name: &str) -> Self {
        Self::Bare(name.to_string())
    }

    #[must_use]
    pub fn value(key: &str, value: &str) -> Self {
        Self::Value {
            key: key.to_string(),
            value: value.to_string(),
            secret: false,
        }
    }

    /// A keyed flag whose value is masked in logs and errors.
    #[must_use]
    pub fn secret(key: &str, value: &str) -> Self {
        Self::Value {
            key: key.to_string(),
            value: value.to_string(),
            secret: true,
        }
    }

    fn arg(&self) -> Arg {
        match self {
            Self::Bare(name) => Arg::plain(format!("--{name}")),
            Self::Value { key, value, secret } => Arg {
                value: format!("--{key}={value}"),
                masked: secret.then(|| format!("--{key}={MASK}")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Arg {
    value: String,
    masked: Option<String>,
}

impl Arg {
    fn plain(value: String) -> Self {
        Self {
            value,
            masked: None,
        }
    }
}

/// Program plus arguments, with display masking for secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<Arg>,
}

impl CommandLine {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::plain(arg.into()));
        self
    }

    /// `prefix` followed by a secret, e.g. `-p<password>`.
    #[must_use]
    pub fn secret_arg(mut self, prefix: &str, secret: &str) -> Self {
        self.args.push(Arg {
            value: format!("{prefix}{secret}"),
            masked: Some(format!("{prefix}{MASK}")),
        });
        self
    }

    #[must_use]
    pub fn flags<'f>(mut self, flags: impl IntoIterator<Item = &'f CliFlag>) -> Self {
        self.args.extend(flags.into_iter().map(CliFlag::arg));
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments as passed to the process, secrets included.
    #[must_use]
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.value.as_str()).collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.masked.as_deref().unwrap_or(&arg.value))?;
        }
        Ok(())
    }
}

/// Run `cmd` and return its stdout, failing on a non-zero exit.
///
/// # Errors
///
/// Returns [`DeployError::Command`] carrying the (masked) command line and
/// exit code if the command fails, or a spawn error if it cannot start.
pub async fn run_checked(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    cmd: &CommandLine,
) -> Result<String> {
    reporter.detail(&format!("Command: {cmd}"));

    let output = runner
        .run(cmd.program(), &cmd.argv())
        .await
        .with_context(|| format!("running {cmd}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let code = output.status.code().unwrap_or(-1);
    reporter.detail(&format!("Status: {code}"));
    if !stdout.trim().is_empty() {
        reporter.detail(&format!("Output: {}", stdout.trim_end()));
    }

    if !output.status.success() {
        return Err(DeployError::Command {
            command: cmd.to_string(),
            code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }
    Ok(stdout)
}
