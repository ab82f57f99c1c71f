#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `mlops` isolated from the caller's environment: HOME and the global git
/// config both point into the temp dir.
fn mlops(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mlops").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("GIT_CONFIG_GLOBAL", dir.path().join(".gitconfig"))
        .env_remove("MLOPS_CONFIG")
        .env_remove("MLOPS_WORKDIR")
        .env_remove("DAGSHUB_USER_NAME")
        .env_remove("DAGSHUB_EMAIL")
        .env_remove("DAGSHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

const CREDS: [&str; 6] = ["--user", "alice", "--email", "a@x.com", "--token", "T0KEN"];

// ---------------------------------------------------------------------------
// mlops tracking
// ---------------------------------------------------------------------------

#[test]
fn tracking_prints_uri() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["tracking", "proj"])
        .args(CREDS)
        .assert()
        .success()
        .stdout("https://dagshub.com/alice/proj.mlflow\n");
}

#[test]
fn tracking_reads_credentials_from_env() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["tracking", "proj"])
        .env("DAGSHUB_USER_NAME", "bob")
        .env("DAGSHUB_EMAIL", "b@x.com")
        .env("DAGSHUB_TOKEN", "T0KEN")
        .assert()
        .success()
        .stdout("https://dagshub.com/bob/proj.mlflow\n");
}

#[test]
fn tracking_shell_exports() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["tracking", "proj", "--shell"])
        .args(CREDS)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "export MLFLOW_TRACKING_URI='https://dagshub.com/alice/proj.mlflow'",
        ))
        .stdout(predicate::str::contains("export MLFLOW_TRACKING_USERNAME='alice'"))
        .stdout(predicate::str::contains("export MLFLOW_TRACKING_PASSWORD='T0KEN'"));
}

#[test]
fn tracking_json_omits_password() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["tracking", "proj", "--json"])
        .args(CREDS)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"uri\""))
        .stdout(predicate::str::contains("T0KEN").not());
}

#[test]
fn tracking_honours_config_host() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("mlops.yaml"),
        "tracking:\n  host: ml.example.org\n",
    )
    .unwrap();
    mlops(&dir)
        .args(["tracking", "proj"])
        .args(CREDS)
        .assert()
        .success()
        .stdout("https://ml.example.org/alice/proj.mlflow\n");
}

#[test]
fn tracking_without_credentials_fails() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["tracking", "proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing --user"));
}

// ---------------------------------------------------------------------------
// mlops init
// ---------------------------------------------------------------------------

#[test]
fn init_rejects_bad_repo_name() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["init", "bad name", "--data", "data/", "--output", "data/raw"])
        .args(CREDS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid repository"));
}

#[test]
fn init_rejects_absolute_output() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["init", "proj", "--data", "data/", "--output", "/abs/raw"])
        .args(CREDS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid data binding"));
}

#[test]
fn init_requires_credentials() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["init", "proj", "--data", "data/", "--output", "data/raw"])
        .args(["--user", "alice", "--email", "a@x.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DAGSHUB_TOKEN"));
}

#[test]
fn init_skips_every_finished_stage() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("proj/.dvc")).unwrap();
    std::fs::create_dir_all(dir.path().join("proj/data/raw")).unwrap();

    // Identity still runs (against the isolated git config); its outcome
    // depends on whether git is installed, so only the report is checked.
    let output = mlops(&dir)
        .args(["init", "proj", "--data", "data/", "--output", "data/raw"])
        .args(["--skip-preflight", "--json"])
        .args(CREDS)
        .output()
        .unwrap();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["repo"], "proj");
    let stages = report["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 4);
    for stage in &stages[1..] {
        assert_eq!(stage["status"], "skipped", "stage: {stage}");
        assert_eq!(stage["commands"], 0);
    }
    assert!(!String::from_utf8_lossy(&output.stdout).contains("T0KEN"));
}

// ---------------------------------------------------------------------------
// mlops config
// ---------------------------------------------------------------------------

#[test]
fn config_show_defaults() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in defaults"))
        .stdout(predicate::str::contains("host: dagshub.com"))
        .stdout(predicate::str::contains("s3://dvc"));
}

#[test]
fn config_show_json_reports_source() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("mlops.yaml"), "on_failure: halt\n").unwrap();
    let output = mlops(&dir)
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["source"].as_str().unwrap().ends_with("mlops.yaml"));
    assert_eq!(value["config"]["on_failure"], "halt");
}

#[test]
fn config_validate_flags_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(&path, "host: https://dagshub.com\n").unwrap();
    mlops(&dir)
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}

#[test]
fn config_validate_clean() {
    let dir = TempDir::new().unwrap();
    mlops(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("mlops.yaml"), "on_failure: sometimes\n").unwrap();
    mlops(&dir)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
