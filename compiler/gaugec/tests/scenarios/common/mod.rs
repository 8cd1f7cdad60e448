//! On-disk module fixtures.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub const MAIN_GO: &str = "package main

import \"fmt\"

func Add(a, b int) int {
	return a + b
}

func main() {
	fmt.Println(Add(1, 2))
}
";

pub const MAIN_TEST_GO: &str = "package main

import \"testing\"

func TestAdd(t *testing.T) {
	if got := Add(1, 2); got != 3 {
		t.Errorf(\"Add(1, 2) = %d, want 3\", got)
	}
	t.Log(\"Add(1, 2) == 3\")
}
";

/// Write `text` to `root/name`, creating parent directories.
pub fn write(root: &Path, name: &str, text: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

/// A module holding one entry-point package with one test, declared with
/// `module_path`.
pub fn entry_point_module(module_path: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "go.mod",
        &format!("module {module_path}\n\ngo 1.21\n"),
    );
    write(dir.path(), "main.go", MAIN_GO);
    write(dir.path(), "main_test.go", MAIN_TEST_GO);
    dir
}
