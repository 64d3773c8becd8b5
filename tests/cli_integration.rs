//! Integration tests for the taskscope CLI

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the taskscope binary, isolated from user settings.
fn taskscope(home: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("taskscope"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("TASKSCOPE_CONFIG")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// Write the demo task list and project file list, returning their paths.
fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let tasks = dir.join("tasks.json");
    std::fs::write(
        &tasks,
        r#"[
  {"category": "Comment", "description": "TODO: fix x", "file": "/solution/app/a.cs", "line": 10},
  {"category": "Warning", "description": "unused var", "file": "/solution/app/a.cs", "line": 3},
  {"category": "Comment", "description": "HACK: y", "file": "/solution/lib/b.cs", "line": 1},
  {"category": "Comment", "description": "todo: lower", "file": "/solution/lib/b.cs", "line": 7}
]"#,
    )
    .unwrap();
    let project = dir.join("project.json");
    std::fs::write(&project, r#"["/solution/lib/b.cs"]"#).unwrap();
    (tasks, project)
}

#[test]
fn test_help() {
    let temp = TempDir::new().unwrap();
    taskscope(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("comment tasks"));
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();
    taskscope(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_filter_all_skips_non_comments() {
    let temp = TempDir::new().unwrap();
    let (tasks, _) = write_inputs(temp.path());

    taskscope(temp.path())
        .args(["--project"])
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 3 tasks"))
        .stdout(predicate::str::contains("a.cs:10"))
        .stdout(predicate::str::contains("unused var").not());
}

#[test]
fn test_filter_token_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let (tasks, _) = write_inputs(temp.path());

    let output = taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .args(["--token", "todo", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines: Vec<u64> = view
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["line"].as_u64().unwrap())
        .collect();
    assert_eq!(lines, vec![10, 7]);
}

#[test]
fn test_filter_project_scope() {
    let temp = TempDir::new().unwrap();
    let (tasks, project) = write_inputs(temp.path());

    taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .arg("--project-files")
        .arg(&project)
        .args(["--scope", "project", "--token", "HACK"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 3 tasks"))
        .stdout(predicate::str::contains("b.cs:1"));
}

#[test]
fn test_filter_class_scope_without_active_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let (tasks, _) = write_inputs(temp.path());

    taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .args(["--scope", "class"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 3 tasks"));
}

#[test]
fn test_filter_unknown_token_fails() {
    let temp = TempDir::new().unwrap();
    let (tasks, _) = write_inputs(temp.path());

    taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .args(["--token", "FIXME"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown token"));
}

#[test]
fn test_filter_unknown_scope_rejected() {
    let temp = TempDir::new().unwrap();
    let (tasks, _) = write_inputs(temp.path());

    taskscope(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .args(["--scope", "module"])
        .assert()
        .failure();
}

#[test]
fn test_filter_missing_task_file_fails() {
    let temp = TempDir::new().unwrap();

    taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure();
}

#[test]
fn test_filter_custom_token_from_settings() {
    let temp = TempDir::new().unwrap();
    let tasks = temp.path().join("tasks.json");
    std::fs::write(
        &tasks,
        r#"[{"category": "Comment", "description": "REVIEW: naming", "file": "/a.rs", "line": 4}]"#,
    )
    .unwrap();
    std::fs::write(
        temp.path().join("taskscope.toml"),
        "customTokens = [\"REVIEW\"]\n",
    )
    .unwrap();

    taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("filter")
        .arg("--tasks")
        .arg(&tasks)
        .args(["--token", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 tasks (token REVIEW"));
}

#[test]
fn test_tokens_lists_builtins_and_custom() {
    let temp = TempDir::new().unwrap();
    let settings = temp.path().join("settings.json");
    std::fs::write(&settings, r#"{"customTokens": ["PERF"]}"#).unwrap();

    taskscope(temp.path())
        .arg("--config")
        .arg(&settings)
        .arg("tokens")
        .assert()
        .success()
        .stdout(predicate::str::contains("UNRESOLVEDMERGECONFLICT"))
        .stdout(predicate::str::contains("PERF"));
}

#[test]
fn test_config_validate_default() {
    let temp = TempDir::new().unwrap();

    taskscope(temp.path())
        .arg("--project")
        .arg(temp.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_reports_errors() {
    let temp = TempDir::new().unwrap();
    let settings = temp.path().join("bad.json");
    std::fs::write(&settings, r#"{"editDebounceMs": 0, "customTokens": ["TODO"]}"#).unwrap();

    taskscope(temp.path())
        .arg("--config")
        .arg(&settings)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("editDebounceMs"))
        .stdout(predicate::str::contains("2 error(s)"));
}

#[test]
fn test_broken_settings_exit_code() {
    let temp = TempDir::new().unwrap();
    let settings = temp.path().join("broken.toml");
    std::fs::write(&settings, "customTokens = [").unwrap();

    taskscope(temp.path())
        .arg("--config")
        .arg(&settings)
        .arg("tokens")
        .assert()
        .code(7);
}
