use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn tb(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tb").expect("binary");
    cmd.env_remove("RUST_LOG").env("TASKBOARD_DIR", dir);
    cmd
}

fn board_json(dir: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(dir.join("board.json")).expect("board file");
    serde_json::from_str(&raw).expect("valid json")
}

#[test]
fn help_works() {
    Command::cargo_bin("tb")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Kanban task board"));
}

#[test]
fn list_on_fresh_dir_shows_starter_columns() {
    let dir = TempDir::new().unwrap();
    tb(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(contains("To Do").and(contains("In Progress")).and(contains("Done")));
    // Reading alone never writes.
    assert!(!dir.path().join("board.json").exists());
}

#[test]
fn add_persists_task() {
    let dir = TempDir::new().unwrap();
    tb(dir.path())
        .args(["add", "Fix login", "--priority", "high", "--tag", "API, bug"])
        .assert()
        .success()
        .stdout(contains("Added task"));

    let json = board_json(dir.path());
    let ids = json["columns"]["column-1"]["taskIds"].as_array().unwrap();
    assert_eq!(ids.len(), 1);
    let task = &json["tasks"][ids[0].as_str().unwrap()];
    assert_eq!(task["content"], "Fix login");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["tags"], serde_json::json!(["api", "bug"]));
}

#[test]
fn move_by_title_and_show() {
    let dir = TempDir::new().unwrap();
    tb(dir.path()).args(["add", "Write docs"]).assert().success();
    tb(dir.path())
        .args(["move", "write docs", "in progress"])
        .assert()
        .success()
        .stdout(contains("In Progress"));
    tb(dir.path())
        .args(["show", "Write docs"])
        .assert()
        .success()
        .stdout(contains("Column:       In Progress"));
}

#[test]
fn wip_limit_rejection_exits_with_code_3() {
    let dir = TempDir::new().unwrap();
    tb(dir.path()).args(["column", "update", "Done", "--wip", "1"]).assert().success();
    tb(dir.path()).args(["add", "one", "--column", "Done"]).assert().success();
    tb(dir.path()).args(["add", "two"]).assert().success();
    tb(dir.path())
        .args(["move", "two", "Done"])
        .assert()
        .code(3)
        .stderr(contains("work-in-progress limit of 1"));
}

#[test]
fn unknown_task_exits_with_code_2() {
    let dir = TempDir::new().unwrap();
    tb(dir.path())
        .args(["show", "missing"])
        .assert()
        .code(2)
        .stderr(contains("Task not found"));
}

#[test]
fn out_of_range_due_date_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    tb(dir.path())
        .args(["add", "x", "--due", "in 9999999999999d"])
        .assert()
        .code(2)
        .stderr(contains("unrecognised due date"));
    assert!(!dir.path().join("board.json").exists());
}

#[test]
fn apply_raw_command() {
    let dir = TempDir::new().unwrap();
    let json = r#"{"type":"ADD_COLUMN","payload":{"id":"column-9","title":"Review"}}"#;
    tb(dir.path()).args(["apply", json]).assert().success().stdout(contains("ADD_COLUMN"));
    let board = board_json(dir.path());
    assert_eq!(board["columnOrder"][3], "column-9");
}

#[test]
fn column_delete_needs_confirmation() {
    let dir = TempDir::new().unwrap();
    tb(dir.path()).args(["add", "x", "--column", "Done"]).assert().success();
    tb(dir.path()).args(["column", "delete", "Done"]).assert().code(2);
    tb(dir.path())
        .args(["column", "delete", "Done", "--yes"])
        .assert()
        .success()
        .stdout(contains("1 task(s)"));
    let board = board_json(dir.path());
    assert_eq!(board["columnOrder"].as_array().unwrap().len(), 2);
    assert!(board["tasks"].as_object().unwrap().is_empty());
}

#[test]
fn export_then_import_into_another_dir() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    tb(src.path()).args(["add", "carry me", "--due", "2024-05-01"]).assert().success();
    let snapshot = src.path().join("snap.json");
    tb(src.path())
        .args(["export", "--output"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(contains("Exported 1 task(s)"));

    tb(dst.path()).arg("import").arg(&snapshot).assert().success();
    tb(dst.path()).args(["list", "--text", "carry"]).assert().success().stdout(contains("carry me"));
    assert_eq!(board_json(dst.path()), board_json(src.path()));
}

#[test]
fn import_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, "not json").unwrap();
    tb(dir.path())
        .arg("import")
        .arg(&bad)
        .assert()
        .code(2)
        .stderr(contains("Invalid board data"));
}

#[test]
fn checklist_and_comments() {
    let dir = TempDir::new().unwrap();
    tb(dir.path()).args(["add", "release"]).assert().success();
    tb(dir.path()).args(["check", "add", "release", "tag build"]).assert().success();
    tb(dir.path()).args(["check", "toggle", "release", "1"]).assert().success();
    tb(dir.path()).args(["comment", "add", "release", "on it", "--author", "ana"]).assert().success();
    tb(dir.path())
        .args(["show", "release"])
        .assert()
        .success()
        .stdout(contains("Checklist (1/1)").and(contains("[x] tag build")).and(contains("ana")));
    tb(dir.path()).args(["comment", "rm", "release", "1"]).assert().success();
    let board = board_json(dir.path());
    let task = board["tasks"].as_object().unwrap().values().next().unwrap().clone();
    assert!(task["comments"].as_array().unwrap().is_empty());
}

#[test]
fn check_integrity_on_clean_board() {
    let dir = TempDir::new().unwrap();
    tb(dir.path())
        .arg("check-integrity")
        .assert()
        .success()
        .stdout(contains("consistent"));
}
