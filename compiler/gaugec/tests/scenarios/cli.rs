//! Scenarios through the `gauge` binary.

use std::path::Path;
use std::process::{Command, Output};

use crate::common::entry_point_module;

fn gauge(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gauge"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gauge")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_by_path_in_module_main_fails() {
    let dir = entry_point_module("main");
    let output = gauge(dir.path(), &["test", "."]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("error[E3001]: cannot import \"main\""), "{err}");
    assert!(err.contains(&dir.path().display().to_string()), "{err}");
    assert!(stdout(&output).contains("FAIL\tmain [build failed]"));
}

#[test]
fn test_by_file_list_in_module_main_passes() {
    let dir = entry_point_module("main");
    let output = gauge(dir.path(), &["test", "main.go", "main_test.go"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("ok  \tcommand-line-arguments"), "{out}");
    assert!(out.contains("1 passed, 0 failed"), "{out}");
}

#[test]
fn test_by_path_in_module_widgets_passes() {
    let dir = entry_point_module("widgets");
    let output = gauge(dir.path(), &["test", "."]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("ok  \twidgets"), "{out}");
    assert!(out.contains("1 passed"), "{out}");
}

#[test]
fn mod_rename_then_test_passes() {
    let dir = entry_point_module("main");
    assert_eq!(gauge(dir.path(), &["test"]).status.code(), Some(1));

    let renamed = gauge(dir.path(), &["mod", "rename", "widgets"]);
    assert_eq!(renamed.status.code(), Some(0), "{}", stderr(&renamed));
    let mod_file = std::fs::read_to_string(dir.path().join("go.mod")).unwrap();
    assert!(mod_file.starts_with("module widgets\n"), "{mod_file}");

    let output = gauge(dir.path(), &["test"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn verbose_prints_test_lines() {
    let dir = entry_point_module("widgets");
    let output = gauge(dir.path(), &["test", "-v"]);

    let out = stdout(&output);
    assert!(out.contains("=== RUN   TestAdd"), "{out}");
    assert!(out.contains("--- PASS: TestAdd"), "{out}");
    assert!(out.contains("    Add(1, 2) == 3"), "{out}");
}

#[test]
fn mixed_targets_are_a_usage_error() {
    let dir = entry_point_module("widgets");
    let output = gauge(dir.path(), &["test", "main.go", "."]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let dir = entry_point_module("widgets");
    let output = gauge(dir.path(), &["test", "--bogus"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("unknown flag '--bogus'"));
}

#[test]
fn explain_reserved_import_collision() {
    let dir = entry_point_module("widgets");
    let output = gauge(dir.path(), &["--explain", "E3001"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout(&output).is_empty());
}
