//! Integration tests for content commands

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

/// Isolated content directory, databases and config for one test
struct TestEnv {
    content: TempDir,
    state: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            content: TempDir::new().unwrap(),
            state: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("folio").unwrap();
        cmd.env("FOLIO_DB", self.state.path().join("content.sqlite"))
            .env("FOLIO_FACETS_DB", self.state.path().join("facets.sqlite"))
            .env("FOLIO_CONTENT_DIR", self.content.path())
            .env("FOLIO_CONFIG", self.state.path().join("config.yml"));
        cmd
    }

    fn write_meta(&self, dir: &str, meta: Value) {
        let full = self.content.path().join(dir);
        fs::create_dir_all(&full).unwrap();
        fs::write(full.join("info.json"), meta.to_string()).unwrap();
    }

    fn add(&self, meta: Value) {
        let file = self.state.path().join("meta.json");
        fs::write(&file, meta.to_string()).unwrap();
        self.cmd().arg("add").arg(&file).assert().success();
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--format").arg("json").args(args).output().unwrap();
        assert!(output.status.success(), "{:?} failed: {:?}", args, output);
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn test_add_and_get() {
    let env = TestEnv::new();
    let file = env.state.path().join("meta.json");
    fs::write(
        &file,
        json!({
            "title": "Sweden",
            "url": "http://en.wikipedia.org/wiki/Sweden",
            "content": {"html": {"main": "index.html"}}
        })
        .to_string(),
    )
    .unwrap();

    env.cmd()
        .arg("add")
        .arg(&file)
        .arg("--path")
        .arg("wiki/sweden")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added wiki/sweden"));

    let record = env.json(&["get", "wiki/sweden"]);
    assert_eq!(record["title"], json!("Sweden"));
    assert_eq!(record["content_type"], json!(2));
    assert_eq!(record["html"]["main"], json!("index.html"));

    env.cmd()
        .arg("get")
        .arg("wiki/sweden")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sweden"));
}

#[test]
fn test_add_without_path_fails() {
    let env = TestEnv::new();
    let file = env.state.path().join("meta.json");
    fs::write(&file, r#"{"title": "no path"}"#).unwrap();

    env.cmd()
        .arg("add")
        .arg(&file)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("no path"));
}

#[test]
fn test_get_missing_exits_not_found() {
    let env = TestEnv::new();
    env.cmd()
        .arg("get")
        .arg("nothing/here")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Content not found"));
}

#[test]
fn test_ls_and_count_filters() {
    let env = TestEnv::new();
    env.add(json!({"path": "news", "title": "Daily News", "language": "en",
                   "updated": "2015-03-01", "html": {"main": "index.html"}}));
    env.add(json!({"path": "talk", "title": "Radio Talk", "language": "de",
                   "updated": "2015-02-01", "audio": {"playlist": [{"file": "1.mp3"}]}}));
    env.add(json!({"path": "tool", "title": "Tool", "updated": "2015-04-01",
                   "app": {"version": "1"}}));

    env.cmd()
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("news\tDaily News"))
        .stdout(predicate::str::contains("talk\tRadio Talk"))
        .stdout(predicate::str::contains("tool").not());

    let audio = env.json(&["ls", "--type", "audio"]);
    assert_eq!(audio.as_array().unwrap().len(), 1);
    assert_eq!(audio[0]["audio"]["playlist"][0]["file"], json!("1.mp3"));

    assert_eq!(env.json(&["count"])["count"], json!(2));
    assert_eq!(env.json(&["count", "--type", "app"])["count"], json!(1));
    assert_eq!(env.json(&["count", "--lang", "de"])["count"], json!(1));
    assert_eq!(env.json(&["count", "--terms", "daily"])["count"], json!(1));

    let page = env.json(&["ls", "-n", "1", "--offset", "1"]);
    assert_eq!(page[0]["path"], json!("talk"));

    env.cmd()
        .arg("ls")
        .arg("--type")
        .arg("hologram")
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_view_rm_and_langs() {
    let env = TestEnv::new();
    env.add(json!({"path": "a", "language": "en"}));
    env.add(json!({"path": "b", "language": "fr"}));

    env.cmd()
        .arg("view")
        .arg("a")
        .assert()
        .success()
        .stdout(predicate::str::contains("a views: 1"));
    assert_eq!(env.json(&["view", "a"])["views"], json!(2));
    env.cmd().arg("view").arg("zzz").assert().failure().code(2);

    assert_eq!(env.json(&["langs"]), json!(["en", "fr"]));

    env.cmd()
        .arg("rm")
        .arg("b")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed b"));
    env.cmd().arg("rm").arg("b").assert().failure().code(2);
    assert_eq!(env.json(&["langs"]), json!(["en"]));
}

#[test]
fn test_reload_from_content_dir() {
    let env = TestEnv::new();
    env.write_meta("one", json!({"title": "One", "updated": "2015-01-01"}));
    env.write_meta("two", json!({"title": "Two", "updated": "2015-09-01",
                                 "image": {"size": "10x10", "album": [{"file": "a.jpg"}]}}));
    env.add(json!({"path": "stale"}));

    env.cmd()
        .arg("reload")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 2 content item(s)"))
        .stdout(predicate::str::contains("Last update: 2015-09-01"));

    env.cmd().arg("get").arg("stale").assert().failure().code(2);
    let two = env.json(&["get", "two"]);
    assert_eq!(two["image"]["resolution"], json!("10x10"));
}
