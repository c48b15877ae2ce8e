//! Environment-to-`env.php` rewrite rules.
//!
//! Pure functions only. Values are written into arrays that already exist;
//! missing parent arrays are reported, never created.

use crate::domain::environment::{DbCredentials, RedisConfig};
use crate::domain::php_config::{PhpConfigDocument, PhpValue};

/// Backend class that marks a cache frontend as Redis-backed.
pub const REDIS_CACHE_BACKEND: &str = "Cm_Cache_Backend_Redis";

/// Database connections that receive the platform credentials.
pub const DB_CONNECTIONS: &[&str] = &["default", "indexer"];

/// Cache frontends checked for a Redis backend.
pub const CACHE_FRONTENDS: &[&str] = &["default", "page_cache"];

/// What a rewrite touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Database connections whose credentials were written.
    pub db_connections: Vec<String>,
    /// Cache frontends pointed at the Redis service.
    pub redis_frontends: Vec<String>,
    /// Whether `backend.frontName` was written.
    pub admin_url: bool,
    /// Dotted paths that were expected but absent.
    pub skipped: Vec<String>,
}

/// Apply platform values to the document in place.
pub fn apply_environment(
    doc: &mut PhpConfigDocument,
    db: &DbCredentials,
    redis: &RedisConfig,
    admin_url: &str,
) -> RewriteReport {
    let mut report = RewriteReport::default();

    for &connection in DB_CONNECTIONS {
        let parent = ["db", "connection", connection];
        let fields = [
            ("username", db.user.as_str()),
            ("host", db.host.as_str()),
            ("dbname", db.name.as_str()),
            ("password", db.password.as_str()),
        ];
        if doc.root().array_at(&parent).is_none() {
            report.skipped.push(parent.join("."));
            continue;
        }
        for (key, value) in fields {
            doc.set_in_existing(&parent, key, value.into());
        }
        report.db_connections.push(connection.to_string());
    }

    for &frontend in CACHE_FRONTENDS {
        let base = ["cache", "frontend", frontend];
        let is_redis = doc
            .root()
            .array_at(&base)
            .and_then(|f| f.get("backend"))
            .and_then(PhpValue::as_str)
            == Some(REDIS_CACHE_BACKEND);
        let options = ["cache", "frontend", frontend, "backend_options"];
        if !is_redis || doc.root().array_at(&options).is_none() {
            continue;
        }
        doc.set_in_existing(&options, "server", redis.host.as_str().into());
        doc.set_in_existing(&options, "port", redis.port.into());
        report.redis_frontends.push(frontend.to_string());
    }

    report.admin_url = doc.set_in_existing(&["backend"], "frontName", admin_url.into());
    if !report.admin_url {
        report.skipped.push("backend".to_string());
    }

    report
}

/// `true` when the document records a completed installation.
#[must_use]
pub fn is_installed(doc: &PhpConfigDocument) -> bool {
    doc.root()
        .get_path(&["install", "date"])
        .is_some_and(PhpValue::is_truthy)
}
