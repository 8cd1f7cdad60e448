//! Scenarios through the library API.

use std::path::PathBuf;

use gaugec::module::{rename_module, PathTable};
use gaugec::test::{TestOutcome, COMMAND_LINE_ARGUMENTS};
use gaugec::{BuildError, Scope, TestRunner, TestRunnerConfig};
use pretty_assertions::assert_eq;

use crate::common::{entry_point_module, write};

fn runner() -> TestRunner {
    TestRunner::with_config(TestRunnerConfig {
        parallel: false,
        ..TestRunnerConfig::default()
    })
}

fn dot() -> Scope {
    Scope::Packages(vec![PathBuf::from(".")])
}

#[test]
fn module_main_by_path_collides() {
    let dir = entry_point_module("main");
    let summary = runner().run(dir.path(), &dot()).unwrap();

    assert_eq!(summary.total(), 0);
    assert_eq!(summary.build_errors, 1);
    match &summary.packages[0].build_error {
        Some(BuildError::ReservedImportCollision {
            import_path,
            directory,
        }) => {
            assert_eq!(import_path, "main");
            assert_eq!(directory, dir.path());
        }
        other => panic!("expected a reserved import collision, got {other:?}"),
    }
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn module_main_by_file_list_passes() {
    let dir = entry_point_module("main");
    let scope = Scope::Files(vec![PathBuf::from("main.go"), PathBuf::from("main_test.go")]);
    let summary = runner().run(dir.path(), &scope).unwrap();

    let report = &summary.packages[0];
    assert_eq!(report.target, COMMAND_LINE_ARGUMENTS);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].name, "TestAdd");
    assert_eq!(report.results[0].outcome, TestOutcome::Passed);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn module_widgets_by_path_passes() {
    let dir = entry_point_module("widgets");
    let summary = runner().run(dir.path(), &dot()).unwrap();

    assert_eq!(summary.packages[0].target, "widgets");
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn rename_on_disk_fixes_path_scope() {
    let dir = entry_point_module("main");
    assert_eq!(runner().run(dir.path(), &dot()).unwrap().exit_code(), 1);

    let renamed = rename_module(dir.path(), "example.com/app").unwrap();
    assert!(renamed.changed());

    let summary = runner().run(dir.path(), &dot()).unwrap();
    assert_eq!(summary.packages[0].target, "example.com/app");
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn subpackage_of_module_main_is_importable() {
    let dir = entry_point_module("main");
    write(
        dir.path(),
        "util/util_test.go",
        "package util\n\nimport \"testing\"\n\nfunc TestUtil(t *testing.T) {}\n",
    );
    let scope = Scope::Packages(vec![PathBuf::from("./util")]);
    let summary = runner().run(dir.path(), &scope).unwrap();
    assert_eq!(summary.packages[0].target, "main/util");
    assert_eq!(summary.passed, 1);
}

#[test]
fn recursive_pattern_reports_collision_and_keeps_going() {
    let dir = entry_point_module("main");
    write(
        dir.path(),
        "util/util_test.go",
        "package util\n\nimport \"testing\"\n\nfunc TestUtil(t *testing.T) {}\n",
    );
    let scope = Scope::Packages(vec![PathBuf::from("./...")]);
    let summary = TestRunner::new().run(dir.path(), &scope).unwrap();

    let targets: Vec<_> = summary.packages.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(targets, ["main", "main/util"]);
    assert!(summary.packages[0].build_error.is_some());
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn duplicate_import_paths_fail_either_scope() {
    let dir = entry_point_module("widgets");
    write(dir.path(), "gears/gears.go", "package gears\n");
    write(dir.path(), "vendored/go.mod", "module widgets/gears\n");
    write(dir.path(), "vendored/gears.go", "package gears\n");

    let by_path = runner().run(dir.path(), &dot()).unwrap_err();
    let by_files = runner()
        .run(
            dir.path(),
            &Scope::Files(vec![PathBuf::from("main.go"), PathBuf::from("main_test.go")]),
        )
        .unwrap_err();
    for err in [by_path, by_files] {
        match err {
            BuildError::AmbiguousImportPath {
                import_path,
                first,
                second,
                ..
            } => {
                assert_eq!(import_path, "widgets/gears");
                assert_eq!(first, dir.path().join("gears"));
                assert_eq!(second, dir.path().join("vendored"));
            }
            other => panic!("expected an ambiguous import path, got {other}"),
        }
    }
}

#[test]
fn stale_table_is_detected() {
    let dir = entry_point_module("main");
    let table = PathTable::register("main", "1.21").unwrap();
    let renamed = table.rename("widgets").unwrap();

    let resolver = gaugec::Resolver::new(&table, dir.path());
    let identity = resolver.resolve(std::path::Path::new(""), "main").unwrap();
    let graph = gaugec::BuildGraph::new(&renamed);
    assert!(matches!(
        graph.check(&identity),
        Err(BuildError::StaleIdentity { .. })
    ));
}
