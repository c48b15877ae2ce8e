//! Deployment settings.
//!
//! Pure types only, no I/O. The defaults
//! describe the stock Magento layout on the platform; a YAML file may
//! override any of them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunables for a build or deploy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    /// Application root, relative to the working directory.
    pub app_root: PathBuf,
    /// Where writable directories are parked between build and deploy.
    pub staging_dir: PathBuf,
    /// Directories (relative to `app_root`) whose content must survive the build.
    pub writable_dirs: Vec<String>,
    /// Relationship name of the database service.
    pub database_service: String,
    /// Relationship name of the Redis service.
    pub cache_service: String,
    /// Management CLI, relative to `app_root`.
    pub cli_tool: String,
    /// Database client executable.
    pub db_client: String,
    pub currency: String,
    pub language: String,
    pub timezone: String,
    /// Branch name the platform uses for production.
    pub primary_branch: String,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            app_root: PathBuf::from("magento"),
            staging_dir: PathBuf::from("init"),
            writable_dirs: vec![
                "generated/code".to_string(),
                "generated/metadata".to_string(),
                "app/etc".to_string(),
            ],
            database_service: "mysql".to_string(),
            cache_service: "redis".to_string(),
            cli_tool: "bin/magento".to_string(),
            db_client: "mysql".to_string(),
            currency: "USD".to_string(),
            language: "en_US".to_string(),
            timezone: "America/Los_Angeles".to_string(),
            primary_branch: "master".to_string(),
        }
    }
}

impl DeploySettings {
    /// Path of `relative` under the application root.
    #[must_use]
    pub fn app_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.app_root.join(relative)
    }

    /// The persisted runtime configuration (`app/etc/env.php`).
    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        self.app_path("app/etc/env.php")
    }

    /// Staging location for one writable directory.
    #[must_use]
    pub fn staged_path(&self, dir: &str) -> PathBuf {
        self.staging_dir.join(dir)
    }

    #[must_use]
    pub fn cli_tool_path(&self) -> PathBuf {
        self.app_path(&self.cli_tool)
    }
}
