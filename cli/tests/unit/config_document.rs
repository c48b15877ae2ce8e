//! `env.php` service tests against a real temp directory.

#![allow(clippy::expect_used)]

use std::fs;

use platform_deploy::application::services::config_document::{read_installed_flag, rewrite};
use platform_deploy::domain::{DbCredentials, DeployError, RedisConfig};
use platform_deploy::infra::fs::LocalFs;

use crate::helpers::INSTALLED_ENV_PHP;

fn db() -> DbCredentials {
    DbCredentials {
        host: "database.internal".to_string(),
        name: "main".to_string(),
        user: "user".to_string(),
        password: "pw".to_string(),
    }
}

fn redis() -> RedisConfig {
    RedisConfig {
        host: "redis.internal".to_string(),
        scheme: "redis".to_string(),
        port: 6380,
    }
}

#[test]
fn test_installed_flag_false_without_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let installed = read_installed_flag(&LocalFs, &tmp.path().join("env.php")).expect("ok");
    assert!(!installed);
}

#[test]
fn test_installed_flag_follows_install_date() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("env.php");

    for (body, expected) in [
        ("<?php\nreturn ['install' => ['date' => 'Mon, 01 Jan 2024']];", true),
        ("<?php\nreturn ['install' => ['date' => '']];", false),
        ("<?php\nreturn ['install' => ['date' => null]];", false),
        ("<?php\nreturn ['install' => []];", false),
        ("<?php\nreturn ['db' => []];", false),
        ("<?php\nreturn ['install' => ['date' => getenv('INSTALL_DATE')]];", true),
    ] {
        fs::write(&path, body).expect("write");
        assert_eq!(
            read_installed_flag(&LocalFs, &path).expect("ok"),
            expected,
            "{body}"
        );
    }
}

#[test]
fn test_unparseable_document_is_format_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("env.php");
    fs::write(&path, "<?php\nreturn array('db' => $config);").expect("write");

    let err = read_installed_flag(&LocalFs, &path).expect_err("must not guess");
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ConfigFormat { .. })
    ));
}

#[test]
fn test_rewrite_is_idempotent_and_reports_touched_sections() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("env.php");
    fs::write(&path, INSTALLED_ENV_PHP).expect("write");

    let report = rewrite(&LocalFs, &path, &db(), &redis(), "admin").expect("rewrite");
    let first = fs::read_to_string(&path).expect("read");
    rewrite(&LocalFs, &path, &db(), &redis(), "admin").expect("rewrite again");
    let second = fs::read_to_string(&path).expect("read");

    assert_eq!(first, second);
    assert_eq!(report.db_connections, vec!["default", "indexer"]);
    assert_eq!(report.redis_frontends, vec!["default", "page_cache"]);
    assert!(report.admin_url);
    assert!(report.skipped.is_empty());
    assert!(first.contains("'password' => 'pw'"));
    assert!(first.contains("'port' => 6380"));
    assert!(first.contains("'database' => '1'"), "unrelated keys preserved");
}

#[test]
fn test_rewrite_missing_file_is_io_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = rewrite(&LocalFs, &tmp.path().join("env.php"), &db(), &redis(), "admin")
        .expect_err("missing file");
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::Io { .. })
    ));
}

#[test]
fn test_rewrite_malformed_file_is_format_error_and_untouched() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("env.php");
    let body = "<?php\nreturn array('db' => $config);";
    fs::write(&path, body).expect("write");

    let err = rewrite(&LocalFs, &path, &db(), &redis(), "admin").expect_err("malformed");
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::ConfigFormat { .. })
    ));
    assert_eq!(fs::read_to_string(&path).expect("read"), body);
}

#[test]
fn test_rewrite_changes_only_the_platform_values() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("env.php");
    fs::write(&path, INSTALLED_ENV_PHP).expect("write");

    rewrite(&LocalFs, &path, &db(), &redis(), "admin").expect("rewrite");

    let expected = INSTALLED_ENV_PHP
        .replace("'frontName' => 'admin_old'", "'frontName' => 'admin'")
        .replace("'host' => 'old-host'", "'host' => 'database.internal'")
        .replace("'dbname' => 'old'", "'dbname' => 'main'")
        .replace("'username' => 'old'", "'username' => 'user'")
        .replace("'password' => 'old'", "'password' => 'pw'")
        .replace("'server' => 'old-redis'", "'server' => 'redis.internal'")
        .replace("'port' => 1234", "'port' => 6380");
    assert_eq!(fs::read_to_string(&path).expect("read"), expected);
}
