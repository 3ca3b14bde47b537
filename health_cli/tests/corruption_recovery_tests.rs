//! Corruption recovery tests for htrack.
//!
//! These tests verify the system can handle:
//! - Malformed collection files
//! - Malformed water keys
//! - Truncated writes and wrong-shaped JSON
//! - A stale session token

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("htrack"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_readings_file_starts_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("bpReadings.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted readings");

    cli(data_dir)
        .args(["bp", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No readings recorded yet"));

    // The next save replaces the corrupt file with valid JSON
    cli(data_dir)
        .args(["bp", "add", "--systolic", "120", "--diastolic", "80"])
        .assert()
        .success();
    let contents = fs::read_to_string(data_dir.join("bpReadings.json")).unwrap();
    let readings: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(readings.as_array().unwrap().len(), 1);
}

#[test]
fn test_corrupted_seeded_collection_falls_back_to_seeds() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("doctors.json"), "[{\"id\": ").unwrap();

    cli(data_dir)
        .args(["doctor", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dr. Sarah Johnson"));
}

#[test]
fn test_wrong_shape_is_treated_as_missing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // Valid JSON, but not a list of contacts
    fs::write(data_dir.join("emergencyContacts.json"), "{\"name\": \"x\"}").unwrap();

    cli(data_dir)
        .args(["contact", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Emergency Services"));
}

#[test]
fn test_corrupted_water_keys_use_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("waterIntake.json"), "lots").unwrap();
    fs::write(data_dir.join("waterGoal.json"), "99").unwrap();
    fs::write(data_dir.join("waterHistory.json"), "[{\"amount\":").unwrap();

    cli(data_dir)
        .args(["water", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Water: 0 / 8 glasses"));
}

#[test]
fn test_one_bad_water_key_keeps_the_others() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("waterIntake.json"), "3").unwrap();
    fs::write(data_dir.join("waterGoal.json"), "not a number").unwrap();

    cli(data_dir)
        .args(["water", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Water: 3 / 8 glasses"));
}

#[test]
fn test_empty_file_is_treated_as_missing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("heartbeatReadings.json"), "").unwrap();

    cli(data_dir)
        .args(["hr", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Average: 0 BPM"));
}

#[test]
fn test_stale_session_token_is_cleared() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("healthTrackerToken.json"), "expired-token").unwrap();

    cli(data_dir)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));

    assert!(!data_dir.join("healthTrackerToken.json").exists());
}

#[test]
fn test_missing_data_dir_is_created() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does").join("not").join("exist");

    cli(&data_dir)
        .args(["hr", "add", "72"])
        .assert()
        .success();

    assert!(data_dir.join("heartbeatReadings.json").exists());
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let config_dir = data_dir.join("config").join("htrack");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[water]\nmax_glasses = -1.0\n").unwrap();

    cli(data_dir)
        .args(["water", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_glasses"));
}
