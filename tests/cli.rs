use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("entity-audit").unwrap();
    cmd.env("ENTITY_AUDIT_DATA_DIR", dir.path()).env_remove("RUST_LOG");
    cmd
}

fn snapshot(dir: &TempDir, name: &str, value: Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, value.to_string()).unwrap();
    path
}

#[test]
fn record_update_prints_only_changed_fields() {
    let dir = TempDir::new().unwrap();
    let before = snapshot(&dir, "before.json", json!({"Id": "abc", "Name": "a", "Age": 3}));
    let after = snapshot(&dir, "after.json", json!({"Id": "abc", "Name": "b", "Age": 3}));

    cmd(&dir)
        .args(["record", "-t", "Customer", "-d", "Renamed"])
        .arg("--before")
        .arg(&before)
        .arg("--after")
        .arg(&after)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "update""#))
        .stdout(predicate::str::contains(r#""entity_id": "abc""#))
        .stdout(predicate::str::contains(r#""entity_before_json": "{\"Name\":\"a\"}""#))
        .stdout(predicate::str::contains(r#""entity_after_json": "{\"Name\":\"b\"}""#));

    assert!(!dir.path().join("audit.log").exists());
}

#[test]
fn record_insert_then_inspect_log() {
    let dir = TempDir::new().unwrap();
    let after = snapshot(&dir, "after.json", json!({"Id": 7, "Name": "Ann"}));

    cmd(&dir)
        .args(["record", "-t", "Customer", "-d", "Customer created", "-u", "alice", "--write"])
        .arg("--after")
        .arg(&after)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded INSERT of Customer as audit entry #1"));

    cmd(&dir)
        .args(["log", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INSERT"))
        .stdout(predicate::str::contains("Customer created"))
        .stdout(predicate::str::contains("alice"));

    cmd(&dir)
        .args(["log", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Audit entry #1"))
        .stdout(predicate::str::contains("Name: (added) -> \"Ann\""));
}

#[test]
fn record_delete_with_composite_key() {
    let dir = TempDir::new().unwrap();
    let before = snapshot(&dir, "before.json", json!({"Id1": "x", "Id2": 2, "Qty": 1}));

    cmd(&dir)
        .args(["record", "-t", "OrderLine", "-d", "Line removed", "-k", "Id1", "-k", "Id2"])
        .arg("--before")
        .arg(&before)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "delete""#))
        .stdout(predicate::str::contains(r#""Id1": "x""#))
        .stdout(predicate::str::contains(r#""entity_after_json": null"#));
}

#[test]
fn record_requires_a_snapshot() {
    let dir = TempDir::new().unwrap();

    cmd(&dir)
        .args(["record", "-t", "Customer", "-d", "Nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least one of --before or --after"));
}

#[test]
fn record_reports_missing_key_property() {
    let dir = TempDir::new().unwrap();
    let after = snapshot(&dir, "after.json", json!({"Id": 1}));

    cmd(&dir)
        .args(["record", "-t", "Customer", "-d", "Created", "-k", "Code"])
        .arg("--after")
        .arg(&after)
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no key property 'Code'"));
}

#[test]
fn record_uses_default_user_from_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.json"), r#"{"default_user_id": "ops"}"#).unwrap();
    let after = snapshot(&dir, "after.json", json!({"Id": 1}));

    cmd(&dir)
        .args(["record", "-t", "Customer", "-d", "Created"])
        .arg("--after")
        .arg(&after)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""user_id": "ops""#));
}

#[test]
fn log_show_unknown_entry_fails() {
    let dir = TempDir::new().unwrap();

    cmd(&dir)
        .args(["log", "show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Audit entry not found: 99"));
}

#[test]
fn log_list_empty() {
    let dir = TempDir::new().unwrap();

    cmd(&dir)
        .args(["log", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit entries found."));
}

#[test]
fn config_init_writes_settings() {
    let dir = TempDir::new().unwrap();

    cmd(&dir)
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Max depth:       unbounded"));

    let settings: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("config.json")).unwrap()).unwrap();
    assert_eq!(settings["audit_log_file"], json!("audit.log"));
    assert_eq!(settings["schema_version"], json!(1));
}
