//! Infrastructure implementation of the `SettingsStore` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::SettingsStore;
use crate::domain::DeploySettings;

/// Environment variable naming the settings file when `--config` is absent.
pub const CONFIG_ENV: &str = "PLATFORM_DEPLOY_CONFIG";

/// Default settings file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".platform-deploy.yaml";

/// Loads `DeploySettings` from a YAML file on disk.
#[derive(Debug, Clone)]
pub struct YamlSettingsStore {
    path: PathBuf,
}

impl YamlSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `explicit`, else `$PLATFORM_DEPLOY_CONFIG`, else the default
    /// file name.
    #[must_use]
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::new(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for YamlSettingsStore {
    fn load(&self) -> Result<DeploySettings> {
        if !self.path.exists() {
            return Ok(DeploySettings::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(DeploySettings::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}
