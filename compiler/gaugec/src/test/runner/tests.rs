use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::backend::{CompileError, TestBinary};
use crate::harness::Driver;
use crate::load::SourceUnit;
use crate::test::TestResult;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn entry_point_module(module: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "go.mod", &format!("module {module}\n\ngo 1.21\n"));
    write(root, "main.go", "package main\n\nfunc main() {}\n");
    write(
        root,
        "main_test.go",
        "package main\n\nimport \"testing\"\n\nfunc TestMain1(t *testing.T) {\n\tt.Log(\"ok\")\n}\n",
    );
    dir
}

fn sequential() -> TestRunnerConfig {
    TestRunnerConfig {
        parallel: false,
        ..TestRunnerConfig::default()
    }
}

#[test]
fn test_reserved_module_fails_by_path() {
    let dir = entry_point_module("main");
    let summary = TestRunner::with_config(sequential())
        .run(dir.path(), &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();

    assert_eq!(summary.packages.len(), 1);
    let report = &summary.packages[0];
    assert!(report.results.is_empty());
    assert!(matches!(
        report.build_error,
        Some(BuildError::ReservedImportCollision { ref import_path, .. }) if import_path == "main"
    ));
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn test_reserved_module_passes_by_file_list() {
    let dir = entry_point_module("main");
    let summary = TestRunner::with_config(sequential())
        .run(
            dir.path(),
            &Scope::Files(vec![PathBuf::from("main.go"), PathBuf::from("main_test.go")]),
        )
        .unwrap();

    let report = &summary.packages[0];
    assert_eq!(report.target, COMMAND_LINE_ARGUMENTS);
    assert!(report.build_error.is_none());
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_renamed_module_passes_by_path() {
    let dir = entry_point_module("widgets");
    let summary = TestRunner::with_config(sequential())
        .run(dir.path(), &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();

    let report = &summary.packages[0];
    assert_eq!(report.target, "widgets");
    assert!(report.build_error.is_none());
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_rename_in_memory_changes_outcome() {
    let dir = entry_point_module("main");
    let root = dir.path();
    let table = PathTable::register("main", "1.21").unwrap();
    let runner = TestRunner::with_config(sequential());
    let scope = Scope::Packages(vec![PathBuf::from(".")]);

    let before = runner.run_in_module(root, &table, root, &scope).unwrap();
    assert_eq!(before.build_errors, 1);

    let renamed = table.rename("widgets").unwrap();
    let after = runner.run_in_module(root, &renamed, root, &scope).unwrap();
    assert_eq!(after.build_errors, 0);
    assert_eq!(after.passed, 1);
}

#[test]
fn test_ambiguity_is_checked_for_both_scopes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "go.mod", "module shop\n");
    write(root, "util/util.go", "package util\n");
    write(root, "util/util_test.go", "package util\n\nimport \"testing\"\n\nfunc TestU(t *testing.T) {}\n");
    write(root, "lib/go.mod", "module shop/util\n");
    write(root, "lib/lib.go", "package util\n");

    let runner = TestRunner::with_config(sequential());
    let by_path = runner.run(root, &Scope::Packages(vec![PathBuf::from("./util")]));
    assert!(matches!(by_path, Err(BuildError::AmbiguousImportPath { .. })));

    let by_files = runner.run(
        &root.join("util"),
        &Scope::Files(vec![PathBuf::from("util_test.go")]),
    );
    assert!(matches!(by_files, Err(BuildError::AmbiguousImportPath { .. })));
}

#[test]
fn test_recursive_pattern_reports_in_directory_order() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "go.mod", "module shop\n");
    for pkg in ["b", "a", "c"] {
        write(
            root,
            &format!("{pkg}/{pkg}_test.go"),
            &format!("package {pkg}\n\nimport \"testing\"\n\nfunc TestIn{pkg}(t *testing.T) {{}}\n"),
        );
    }
    write(root, "docs/readme.md", "no sources");

    let summary = TestRunner::new()
        .run(root, &Scope::Packages(vec![PathBuf::from("./...")]))
        .unwrap();
    let targets: Vec<_> = summary.packages.iter().map(|r| r.target.as_str()).collect();
    assert_eq!(targets, ["shop/a", "shop/b", "shop/c"]);
    assert_eq!(summary.passed, 3);
}

#[test]
fn test_package_without_test_files() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "go.mod", "module shop\n");
    write(root, "shop.go", "package shop\n");

    let summary = TestRunner::with_config(sequential())
        .run(root, &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();
    assert!(summary.packages[0].no_test_files);
    assert_eq!(summary.total(), 0);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_missing_module_declaration() {
    let dir = TempDir::new().unwrap();
    let err = TestRunner::new()
        .run(dir.path(), &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap_err();
    assert!(matches!(err, BuildError::ModuleNotFound { .. }));
}

#[test]
fn test_missing_directory_pattern() {
    let dir = entry_point_module("widgets");
    let err = TestRunner::new()
        .run(dir.path(), &Scope::Packages(vec![PathBuf::from("./nope")]))
        .unwrap_err();
    assert!(matches!(err, BuildError::PackageNotFound { .. }));
}

#[test]
fn test_filter_selects_by_substring() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "go.mod", "module shop\n");
    write(
        root,
        "shop_test.go",
        "package shop\n\nimport \"testing\"\n\nfunc TestAlpha(t *testing.T) {}\n\nfunc TestBeta(t *testing.T) {\n\tt.Error(\"beta\")\n}\n",
    );
    let runner = TestRunner::with_config(TestRunnerConfig {
        filter: Some("Alpha".to_string()),
        ..sequential()
    });
    let summary = runner
        .run(root, &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_guarded_assertions_pass() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "go.mod", "module widgets\n");
    write(
        root,
        "add.go",
        "package widgets\n\nfunc Add(a, b int) int {\n\treturn a + b\n}\n",
    );
    write(
        root,
        "add_test.go",
        "package widgets\n\nimport \"testing\"\n\n\
         func TestAdd(t *testing.T) {\n\
         \tif got := Add(1, 2); got != 3 {\n\
         \t\tt.Errorf(\"Add(1, 2) = %d, want 3\", got)\n\
         \t}\n\
         \tfor _, c := range []int{1, 2} {\n\
         \t\tif c < 0 {\n\
         \t\t\tt.Fatalf(\"negative %d\", c)\n\
         \t\t}\n\
         \t}\n\
         }\n",
    );

    let summary = TestRunner::with_config(sequential())
        .run(root, &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_keep_work_writes_driver() {
    let work_parent = TempDir::new().unwrap();
    let dir = entry_point_module("widgets");
    let runner = TestRunner::with_config(TestRunnerConfig {
        keep_work: true,
        work_root: Some(work_parent.path().to_path_buf()),
        ..sequential()
    });
    let summary = runner
        .run(dir.path(), &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();

    let work = summary.packages[0].work_dir.clone().unwrap();
    assert!(work.starts_with(work_parent.path()));
    let driver = fs::read_to_string(work.join(DRIVER_FILE_NAME)).unwrap();
    assert!(driver.contains("_test0 \"widgets\""));
    assert!(driver.contains("{\"TestMain1\", _test0.TestMain1},"));
}

#[test]
fn test_expand_patterns() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a/a.go", "package a\n");
    write(root, "a/b/b.go", "package b\n");

    let dirs = expand_patterns(
        root,
        &[PathBuf::from("./a/..."), PathBuf::from("a"), PathBuf::from(".")],
    )
    .unwrap();
    assert_eq!(dirs, vec![root.to_path_buf(), root.join("a"), root.join("a/b")]);
}

/// Counts compile calls; never produces tests.
#[derive(Default)]
struct CountingToolchain {
    compiles: AtomicUsize,
}

impl Toolchain for CountingToolchain {
    fn compile_driver(
        &self,
        name: &str,
        _driver: &Driver,
        _link: &LinkSet<'_>,
    ) -> Result<TestBinary, CompileError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        Ok(TestBinary {
            name: name.to_string(),
            tests: Vec::new(),
        })
    }

    fn compile_files(&self, name: &str, _unit: &SourceUnit) -> Result<TestBinary, CompileError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        Ok(TestBinary {
            name: name.to_string(),
            tests: Vec::new(),
        })
    }

    fn execute(&self, _binary: &TestBinary, _filter: Option<&str>) -> Vec<TestResult> {
        Vec::new()
    }
}

#[test]
fn test_synthesis_failure_never_reaches_the_toolchain() {
    let dir = entry_point_module("main");
    let runner = TestRunner::with_toolchain(sequential(), CountingToolchain::default());
    let summary = runner
        .run(dir.path(), &Scope::Packages(vec![PathBuf::from(".")]))
        .unwrap();
    assert_eq!(summary.build_errors, 1);
    assert_eq!(runner.toolchain.compiles.load(Ordering::SeqCst), 0);
}
