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
fn test_script_list_empty() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["script", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No scripts found"));
}

#[test]
fn test_script_new_list_show() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["script", "new", "links", "--url", "https://news.ycombinator.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created script 'links'"));

    assert!(home.path().join("data").join("scripts").join("links.json").is_file());

    autohub(&home)
        .args(["script", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("links"))
        .stdout(predicate::str::contains("3 step(s)"));

    autohub(&home)
        .args(["script", "show", "links"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"action\": \"goto\""))
        .stdout(predicate::str::contains("https://news.ycombinator.com/"));
}

#[test]
fn test_script_new_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["script", "new", "links"])
        .assert()
        .success();

    autohub(&home)
        .args(["script", "new", "links"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    autohub(&home)
        .args(["script", "new", "links", "--force"])
        .assert()
        .success();
}

#[test]
fn test_script_new_rejects_bad_url() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["script", "new", "broken", "--url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_script_run_unknown() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .args(["script", "run", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load script"));
}

#[test]
fn test_script_run_invalid_script_fails_before_launch() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("empty.json");
    std::fs::write(&file, r#"{ "name": "empty", "steps": [] }"#).unwrap();

    autohub(&home)
        .args(["script", "run"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no steps"));
}
