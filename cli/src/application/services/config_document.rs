//! Application service: reading and rewriting `app/etc/env.php`.
//!
//! Filesystem access goes through [`DeployFs`]; the parsing and rewrite
//! rules live in the domain layer.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::DeployFs;
use crate::domain::php_config::PhpConfigDocument;
use crate::domain::rewrite::{RewriteReport, apply_environment, is_installed};
use crate::domain::{DbCredentials, DeployError, RedisConfig};

/// Whether the document at `path` records a completed installation.
///
/// A missing file counts as not installed.
///
/// # Errors
///
/// Returns [`DeployError::Io`] if the file exists but cannot be read and
/// [`DeployError::ConfigFormat`] if it does not parse.
pub fn read_installed_flag(fs: &impl DeployFs, path: &Path) -> Result<bool> {
    if !fs.exists(path) {
        return Ok(false);
    }
    let doc = load(fs, path)?;
    Ok(is_installed(&doc))
}

/// Write the platform's database, Redis and admin URL values into the
/// document at `path`.
///
/// # Errors
///
/// Returns [`DeployError::Io`] if the file cannot be read or written and
/// [`DeployError::ConfigFormat`] if it does not parse.
pub fn rewrite(
    fs: &impl DeployFs,
    path: &Path,
    db: &DbCredentials,
    redis: &RedisConfig,
    admin_url: &str,
) -> Result<RewriteReport> {
    let mut doc = load(fs, path)?;
    let report = apply_environment(&mut doc, db, redis, admin_url);
    fs.write(path, &doc.render())?;
    Ok(report)
}

fn load(fs: &impl DeployFs, path: &Path) -> Result<PhpConfigDocument> {
    let source = fs.read_to_string(path)?;
    let doc = PhpConfigDocument::parse(&source).map_err(|e| DeployError::ConfigFormat {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(doc)
}
