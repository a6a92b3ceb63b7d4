use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_autohub_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("autohub")
}

fn autohub(home: &TempDir) -> Command {
    let mut cmd = Command::new(get_autohub_bin());
    cmd.env("AUTOHUB_HOME", home.path());
    cmd
}

#[test]
fn test_settings_list_shows_defaults() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("settings")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("browser_path"))
        .stdout(predicate::str::contains("retry_count"))
        .stdout(predicate::str::contains("3 (default)"));
}

#[test]
fn test_settings_set_then_get() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("settings")
        .arg("set")
        .arg("timeout")
        .arg("25")
        .assert()
        .success();

    autohub(&home)
        .arg("settings")
        .arg("get")
        .arg("timeout")
        .assert()
        .success()
        .stdout("25\n");

    let saved = std::fs::read_to_string(home.path().join("config").join("settings.json")).unwrap();
    assert!(saved.contains("\"timeout\": \"25\""));
}

#[test]
fn test_settings_get_default() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("settings")
        .arg("get")
        .arg("theme")
        .assert()
        .success()
        .stdout("light\n");
}

#[test]
fn test_settings_accept_dashed_keys() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("settings")
        .arg("set")
        .arg("retry-count")
        .arg("5")
        .assert()
        .success()
        .stdout(predicate::str::contains("retry_count = 5"));
}

#[test]
fn test_settings_reject_bad_values() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("settings")
        .arg("set")
        .arg("timeout")
        .arg("soon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("whole number"));

    autohub(&home)
        .arg("settings")
        .arg("set")
        .arg("colour")
        .arg("blue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}

#[test]
fn test_settings_unset_restores_default() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["settings", "set", "theme", "dark"])
        .assert()
        .success();

    autohub(&home)
        .args(["settings", "unset", "theme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset to light"));

    autohub(&home)
        .args(["settings", "get", "theme"])
        .assert()
        .success()
        .stdout("light\n");
}

#[test]
fn test_settings_path_uses_home() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["settings", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("settings.json"))
        .stdout(predicate::str::contains(home.path().to_string_lossy().to_string()));
}
