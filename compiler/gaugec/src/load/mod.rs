//! Package loading.
//!
//! A directory's `.go` files form one source unit:
//!
//! - library files and `_test.go` files of package `p` make up the package
//!   under test, with its in-package tests;
//! - `_test.go` files of package `p_test` make up the external test package.
//!
//! Any other mix of package names in one directory is an error.

mod discovery;

use std::fs;
use std::path::{Path, PathBuf};

use gauge_syntax::{is_test_file_name, scan, LineOffsetTable, SourceSummary, TestFunc};

pub use discovery::{discover_nested_modules, discover_package_dirs, module_graph};

use crate::error::BuildError;
use crate::identity::EXTERNAL_TEST_SUFFIX;

/// Extension of source files.
pub const SOURCE_EXTENSION: &str = "go";

/// One scanned source file.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub summary: SourceSummary,
    /// Whether the file name ends in `_test.go`.
    pub is_test: bool,
}

impl SourceFile {
    pub fn package_name(&self) -> &str {
        &self.summary.package.name
    }

    /// Names of the test functions declared in this file, in source order.
    /// Non-test files never contribute tests.
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        let tests: &[TestFunc] = if self.is_test {
            &self.summary.tests
        } else {
            &[]
        };
        tests.iter().map(|t| t.name.as_str())
    }
}

/// `_test.go` files of the external `<name>_test` package.
#[derive(Clone, Debug)]
pub struct ExternalTests {
    pub package_name: String,
    pub files: Vec<SourceFile>,
}

/// All source files of one package directory.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    pub directory: PathBuf,
    /// Name of the package under test.
    pub package_name: String,
    /// Library files and in-package test files, sorted by path.
    pub files: Vec<SourceFile>,
    pub external_tests: Option<ExternalTests>,
}

impl SourceUnit {
    /// In-package test function names, in file order then source order.
    pub fn test_names(&self) -> Vec<String> {
        collect_test_names(&self.files)
    }

    /// External test function names, in file order then source order.
    pub fn external_test_names(&self) -> Vec<String> {
        self.external_tests
            .as_ref()
            .map(|ext| collect_test_names(&ext.files))
            .unwrap_or_default()
    }

    pub fn has_test_files(&self) -> bool {
        self.files.iter().any(|f| f.is_test) || self.external_tests.is_some()
    }

    /// Every file of the unit, external tests included.
    pub fn all_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files
            .iter()
            .chain(self.external_tests.iter().flat_map(|ext| ext.files.iter()))
    }
}

fn collect_test_names(files: &[SourceFile]) -> Vec<String> {
    files
        .iter()
        .flat_map(|f| f.test_names())
        .map(str::to_string)
        .collect()
}

/// Whether a directory entry is a source file the loader considers.
///
/// Files starting with `_` or `.` are ignored.
pub fn is_source_file_name(file_name: &str) -> bool {
    !file_name.starts_with('_')
        && !file_name.starts_with('.')
        && Path::new(file_name)
            .extension()
            .is_some_and(|e| e == SOURCE_EXTENSION)
}

/// Source file paths of a directory, sorted.
pub fn source_files_in(directory: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let entries = fs::read_dir(directory).map_err(|e| BuildError::io(directory, e))?;
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_source_file_name)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load the package in `directory`.
#[tracing::instrument(level = "debug", skip_all, fields(directory = %directory.display()))]
pub fn load_dir(directory: &Path) -> Result<SourceUnit, BuildError> {
    if !directory.is_dir() {
        return Err(BuildError::PackageNotFound {
            directory: directory.to_path_buf(),
        });
    }
    let paths = source_files_in(directory)?;
    if paths.is_empty() {
        return Err(BuildError::NoGoFiles {
            directory: directory.to_path_buf(),
        });
    }
    let files = paths
        .iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<_>, _>>()?;
    group(directory, files)
}

/// Load an explicit list of files as one unit.
///
/// The files must share a directory. Explicitly named files are loaded even
/// when their names start with `_` or `.`.
pub fn load_files(paths: &[PathBuf]) -> Result<SourceUnit, BuildError> {
    let Some(first) = paths.first() else {
        return Err(BuildError::NoGoFiles {
            directory: PathBuf::from("."),
        });
    };
    let directory = parent_dir(first);
    for path in paths.iter().skip(1) {
        let other = parent_dir(path);
        if other != directory {
            return Err(BuildError::FilesInMultipleDirectories {
                first: directory,
                second: other,
            });
        }
    }

    let mut sorted = paths.to_vec();
    sorted.sort();
    sorted.dedup();
    let files = sorted
        .iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<_>, _>>()?;
    group(&directory, files)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            crate::identity::normalize_lexically(parent)
        }
        _ => PathBuf::from("."),
    }
}

/// Read and scan one source file.
pub fn read_source(path: &Path) -> Result<SourceFile, BuildError> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let summary = scan(&text).map_err(|err| {
        let (line, column) = LineOffsetTable::build(&text).line_col(err.span.start);
        BuildError::Syntax {
            path: path.to_path_buf(),
            line,
            column,
            span: err.span,
            message: err.message,
        }
    })?;
    let is_test = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_test_file_name);
    tracing::trace!(
        path = %path.display(),
        package = %summary.package.name,
        tests = summary.tests.len(),
        "scanned"
    );
    Ok(SourceFile {
        path: path.to_path_buf(),
        summary,
        is_test,
    })
}

/// Split scanned files into the package under test and its external tests.
fn group(directory: &Path, files: Vec<SourceFile>) -> Result<SourceUnit, BuildError> {
    let base = base_package_name(&files);
    let external_name = format!("{base}{EXTERNAL_TEST_SUFFIX}");

    let mut unit_files = Vec::new();
    let mut external_files = Vec::new();
    for file in files {
        let name = file.package_name();
        if name == base {
            unit_files.push(file);
        } else if file.is_test && name == external_name {
            external_files.push(file);
        } else {
            return Err(BuildError::MixedPackages {
                directory: directory.to_path_buf(),
                first: base,
                second: name.to_string(),
            });
        }
    }

    let external_tests = if external_files.is_empty() {
        None
    } else {
        Some(ExternalTests {
            package_name: external_name,
            files: external_files,
        })
    };
    Ok(SourceUnit {
        directory: directory.to_path_buf(),
        package_name: base,
        files: unit_files,
        external_tests,
    })
}

/// Name of the package under test: the first library file's package, else
/// the first test file's package without its external suffix.
fn base_package_name(files: &[SourceFile]) -> String {
    if let Some(lib) = files.iter().find(|f| !f.is_test) {
        return lib.package_name().to_string();
    }
    if let Some(internal) = files
        .iter()
        .find(|f| !f.package_name().ends_with(EXTERNAL_TEST_SUFFIX))
    {
        return internal.package_name().to_string();
    }
    files
        .first()
        .map(|f| {
            let name = f.package_name();
            name.strip_suffix(EXTERNAL_TEST_SUFFIX)
                .unwrap_or(name)
                .to_string()
        })
        .unwrap_or_default()
}
