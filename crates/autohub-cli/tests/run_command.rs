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
    cmd.env("AUTOHUB_HOME", home.path())
        .env_remove("AUTOHUB_BROWSER_PATH")
        .env_remove("AUTOHUB_PROXY");
    cmd
}

#[test]
fn test_search_help() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("search")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search Google"))
        .stdout(predicate::str::contains("--max-results"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("--browser-path"));
}

#[test]
fn test_search_with_empty_keyword_fails_before_launch() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("search")
        .arg("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a keyword"))
        .stderr(predicate::str::contains("Launching browser").not());
}

#[test]
fn test_missing_browser_reports_one_error() {
    let home = TempDir::new().unwrap();
    let output = autohub(&home)
        .arg("search")
        .arg("rust")
        .arg("--browser-path")
        .arg("/nonexistent/brave-browser")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Could not start the browser").count(), 1);
    assert!(!home.path().join("data").join("results.json").exists());
}

#[test]
fn test_json_output_ends_with_finished() {
    let home = TempDir::new().unwrap();
    let output = autohub(&home)
        .arg("--format")
        .arg("json")
        .arg("scrape")
        .arg("laptop")
        .arg("--pages")
        .arg("0")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "error");
    assert_eq!(lines[1]["event"], "finished");
    assert_eq!(lines[1]["data"]["success"], false);
}

#[test]
fn test_login_requires_password() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .env_remove("AUTOHUB_PASSWORD")
        .arg("login")
        .arg("--email")
        .arg("me@example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--password"));
}

#[test]
fn test_invalid_proxy_is_rejected() {
    let home = TempDir::new().unwrap();
    autohub(&home)
        .arg("search")
        .arg("rust")
        .arg("--proxy")
        .arg("ftp://proxy.local:21")
        .assert()
        .failure()
        .stderr(predicate::str::contains("proxy"));
}
