//! Behaviour of the `lax` version report

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn lax() -> Command {
    let mut cmd = Command::cargo_bin("lax").unwrap();
    cmd.env_remove("LAX_CONFIG").env_remove("LAX_DATA_DIR");
    cmd
}

#[test]
fn lists_cut_sets() {
    lax()
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "lax version: {}",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("sciencerun1 CutLowEnergyAmBe version"))
        .stdout(predicate::str::contains("    CutAmBeFiducial version 2"));
}

#[test]
fn missing_configuration_file_still_reports() {
    lax()
        .env("LAX_CONFIG", "/nonexistent/lax.cfg")
        .assert()
        .success()
        .stdout(predicate::str::contains("lax version:"));
}

#[test]
fn invalid_configuration_file_still_reports() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lax.cfg");
    fs::write(&path, "drift_velocity_liquid -1\n").unwrap();
    lax()
        .env("LAX_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("sciencerun2 CutAllEnergy version"));
}
