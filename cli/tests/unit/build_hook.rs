//! Build hook tests: real filesystem in a temp dir, recorded commands.

#![allow(clippy::expect_used)]

use std::fs;

use platform_deploy::application::Orchestrator;
use platform_deploy::domain::{BuildPhase, DeployError};
use platform_deploy::infra::fs::LocalFs;

use crate::helpers::{RecordingReporter, RecordingRunner, settings_in};

fn seed_app(root: &std::path::Path) {
    let app = root.join("magento");
    fs::create_dir_all(app.join("generated/code/Vendor")).expect("mkdir");
    fs::create_dir_all(app.join("generated/metadata")).expect("mkdir");
    fs::create_dir_all(app.join("app/etc")).expect("mkdir");
    fs::write(app.join("generated/code/Vendor/Proxy.php"), "<?php // proxy").expect("write");
    fs::write(app.join("app/etc/config.php"), "<?php return [];").expect("write");
    fs::write(app.join("app/etc/.htaccess"), "Deny from all").expect("write");
}

#[tokio::test]
async fn test_build_compiles_then_quarantines_writable_dirs() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_app(tmp.path());
    fs::create_dir_all(tmp.path().join("init/stale")).expect("mkdir");

    let settings = settings_in(tmp.path());
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::default();
    let mut orchestrator = Orchestrator::new(&runner, &LocalFs, &reporter, &settings);

    orchestrator.build().await.expect("build succeeds");

    let cli = settings.cli_tool_path().display().to_string();
    assert_eq!(
        runner.lines(),
        vec![
            format!("{cli} module:enable --all"),
            format!("{cli} setup:di:compile"),
        ]
    );
    assert_eq!(orchestrator.build_phase(), BuildPhase::Quarantined);

    let init = tmp.path().join("init");
    assert!(!init.join("stale").exists(), "staging must be cleared first");
    assert!(init.join("generated/code/Vendor/Proxy.php").is_file());
    assert!(init.join("app/etc/config.php").is_file());
    assert!(init.join("app/etc/.htaccess").is_file(), "hidden files are copied");
    assert!(init.join("generated/metadata").is_dir());

    let app = tmp.path().join("magento");
    for dir in ["generated/code", "generated/metadata", "app/etc"] {
        let live = app.join(dir);
        assert!(live.is_dir(), "{dir} recreated");
        assert_eq!(fs::read_dir(&live).expect("read_dir").count(), 0, "{dir} emptied");
    }
}

#[tokio::test]
async fn test_build_stops_at_failing_compile() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_app(tmp.path());

    let settings = settings_in(tmp.path());
    let runner = RecordingRunner::failing_on("setup:di:compile", 255);
    let reporter = RecordingReporter::default();
    let mut orchestrator = Orchestrator::new(&runner, &LocalFs, &reporter, &settings);

    let err = orchestrator.build().await.expect_err("compile fails");

    assert_eq!(orchestrator.build_phase(), BuildPhase::StagingCleared);
    match err.downcast_ref::<DeployError>() {
        Some(DeployError::Command { command, code, .. }) => {
            assert_eq!(*code, 255);
            assert!(command.ends_with("setup:di:compile"), "got: {command}");
        }
        other => panic!("expected command error, got {other:?}"),
    }
    assert!(
        tmp.path().join("magento/app/etc/config.php").is_file(),
        "writable dirs untouched before quarantine"
    );
}

#[tokio::test]
async fn test_build_fails_when_writable_dir_is_missing() {
    let tmp = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(tmp.path().join("magento/generated/code")).expect("mkdir");

    let settings = settings_in(tmp.path());
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::default();
    let mut orchestrator = Orchestrator::new(&runner, &LocalFs, &reporter, &settings);

    let err = orchestrator.build().await.expect_err("metadata dir missing");

    assert_eq!(orchestrator.build_phase(), BuildPhase::Compiled);
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::Io { .. })
    ));
}
