//! Shared test helpers: recording mocks, output constructors and a platform
//! environment builder.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Output};

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use platform_deploy::application::ports::{CommandRunner, EnvSource, ProgressReporter};
use platform_deploy::domain::DeploySettings;
use platform_deploy::domain::environment::{RELATIONSHIPS_VAR, ROUTES_VAR, VARIABLES_VAR};
use serde_json::{Value, json};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Recording command runner ─────────────────────────────────────────────────

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
}

impl Call {
    /// Program and arguments joined by single spaces.
    pub fn line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Records every call and succeeds, unless a call's line contains the
/// configured failure pattern.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Call>>,
    fail_on: Option<(String, i32)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail (with `code`) the first and every later call whose line contains `pattern`.
    pub fn failing_on(pattern: &str, code: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some((pattern.to_string(), code)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::line).collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let call = Call {
            program: program.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
        };
        let line = call.line();
        self.calls.borrow_mut().push(call);
        match &self.fail_on {
            Some((pattern, code)) if line.contains(pattern.as_str()) => {
                Ok(err_output(*code, b"simulated failure"))
            }
            _ => Ok(ok_output(b"")),
        }
    }
}

// ── Recording reporter ───────────────────────────────────────────────────────

/// Collects reporter events as `kind: message` lines.
#[derive(Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(String::from))
            .collect()
    }

    fn push(&self, kind: &str, message: &str) {
        self.events.borrow_mut().push(format!("{kind}: {message}"));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
    fn detail(&self, message: &str) {
        self.push("detail", message);
    }
}

// ── Platform environment ─────────────────────────────────────────────────────

/// In-memory `EnvSource`.
#[derive(Default, Clone)]
pub struct MapEnv(pub HashMap<String, String>);

impl MapEnv {
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

pub fn encode(value: &Value) -> String {
    STANDARD.encode(value.to_string())
}

/// A complete platform environment with both http and https primary routes.
pub fn platform_env(db_password: &str, variables: &Value) -> MapEnv {
    let mut env = MapEnv::default();
    env.set(
        ROUTES_VAR,
        encode(&json!({
            "http://example.com/": {"type": "upstream", "original_url": "http://{default}/"},
            "https://example.com/": {"type": "upstream", "original_url": "https://{default}/"},
            "https://www.example.com/": {"type": "redirect", "original_url": "https://www.{default}/"},
        })),
    );
    env.set(
        RELATIONSHIPS_VAR,
        encode(&json!({
            "mysql": [{"host": "database.internal", "path": "main", "username": "user",
                       "password": db_password, "scheme": "mysql", "port": 3306}],
            "redis": [{"host": "redis.internal", "scheme": "redis", "port": 6379}],
        })),
    );
    env.set(VARIABLES_VAR, encode(variables));
    env
}

// ── Filesystem layout ────────────────────────────────────────────────────────

/// Settings rooted inside `root` (a temp dir).
pub fn settings_in(root: &Path) -> DeploySettings {
    DeploySettings {
        app_root: root.join("magento"),
        staging_dir: root.join("init"),
        ..DeploySettings::default()
    }
}

/// An installed `env.php` with Redis cache frontends.
pub const INSTALLED_ENV_PHP: &str = r"<?php
return array (
  'backend' =>
  array (
    'frontName' => 'admin_old',
  ),
  'db' =>
  array (
    'table_prefix' => '',
    'connection' =>
    array (
      'default' =>
      array (
        'host' => 'old-host',
        'dbname' => 'old',
        'username' => 'old',
        'password' => 'old',
        'active' => '1',
      ),
      'indexer' =>
      array (
        'host' => 'old-host',
        'dbname' => 'old',
        'username' => 'old',
        'password' => 'old',
        'persistent' => NULL,
      ),
    ),
  ),
  'cache' =>
  array (
    'frontend' =>
    array (
      'default' =>
      array (
        'backend' => 'Cm_Cache_Backend_Redis',
        'backend_options' =>
        array (
          'server' => 'old-redis',
          'port' => 1234,
        ),
      ),
      'page_cache' =>
      array (
        'backend' => 'Cm_Cache_Backend_Redis',
        'backend_options' =>
        array (
          'server' => 'old-redis',
          'port' => 1234,
          'database' => '1',
        ),
      ),
    ),
  ),
  'install' =>
  array (
    'date' => 'Mon, 01 Jan 2024 00:00:00 +0000',
  ),
);
";
