//! Integration tests for tag commands

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn folio_cmd(state: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("folio").unwrap();
    cmd.env("FOLIO_DB", state.path().join("content.sqlite"))
        .env("FOLIO_FACETS_DB", state.path().join("facets.sqlite"))
        .env("FOLIO_CONTENT_DIR", state.path().join("content"))
        .env("FOLIO_CONFIG", state.path().join("config.yml"));
    cmd
}

fn setup() -> TempDir {
    let state = TempDir::new().unwrap();
    for path in ["a", "b"] {
        let file = state.path().join(format!("{}.json", path));
        fs::write(&file, json!({"path": path, "title": path}).to_string()).unwrap();
        folio_cmd(&state).arg("add").arg(&file).assert().success();
    }
    state
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--format").arg("json").output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_tag_add_and_cloud() {
    let state = setup();

    folio_cmd(&state)
        .args(["tag", "add", "a", "science", "news"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tagged a with science"));
    folio_cmd(&state)
        .args(["tag", "add", "b", "science"])
        .assert()
        .success();

    let cloud = json_output(folio_cmd(&state).args(["tag", "cloud"]));
    assert_eq!(cloud[0]["name"], json!("science"));
    assert_eq!(cloud[0]["count"], json!(2));
    assert_eq!(cloud[1]["name"], json!("news"));

    let tag_id = cloud[0]["tag_id"].as_i64().unwrap();
    folio_cmd(&state)
        .args(["tag", "name", &tag_id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("science"));

    let tagged = json_output(folio_cmd(&state).args(["ls", "--tag", &tag_id.to_string()]));
    assert_eq!(tagged.as_array().unwrap().len(), 2);

    let record = json_output(folio_cmd(&state).args(["get", "a"]));
    let mapping: Value = serde_json::from_str(record["tags"].as_str().unwrap()).unwrap();
    assert_eq!(mapping["science"], json!(tag_id));
}

#[test]
fn test_tag_rm() {
    let state = setup();
    folio_cmd(&state)
        .args(["tag", "add", "a", "science", "news"])
        .assert()
        .success();

    let remaining = json_output(folio_cmd(&state).args(["tag", "rm", "a", "news", "unknown"]));
    assert!(remaining.get("news").is_none());
    assert!(remaining.get("science").is_some());

    folio_cmd(&state)
        .args(["tag", "rm", "missing", "news"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_tag_add_requires_names() {
    let state = setup();
    folio_cmd(&state).args(["tag", "add", "a"]).assert().failure();
}
