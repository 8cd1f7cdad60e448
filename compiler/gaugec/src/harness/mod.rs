//! Test harness synthesis.
//!
//! Test functions live in library packages, so running them needs an
//! executable. The synthesizer generates that executable's entry point: a
//! driver file in package `main` that imports every selected package and
//! registers each discovered test function with the testing runtime.
//!
//! Synthesis fails fast, before any text is generated, when a selected
//! package resolves to the reserved entry-point import path: the driver would
//! have to import `"main"`, which the compiler rejects.

use std::fmt::Write as _;

use crate::error::BuildError;
use crate::identity::{is_reserved, PackageIdentity, PackageKind};

/// File name of the synthesized driver inside the work directory.
pub const DRIVER_FILE_NAME: &str = "_testmain.go";

/// Alias used for imports whose package contributes no tests.
const BLANK_ALIAS: &str = "_";

/// One package selected for a test run, with its test functions in source
/// order.
#[derive(Clone, Debug)]
pub struct SelectionEntry {
    pub identity: PackageIdentity,
    pub tests: Vec<String>,
}

/// Packages selected for one driver, in selection order.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Add a package. A second entry with an import path already present is
    /// ignored.
    pub fn push(&mut self, identity: PackageIdentity, tests: Vec<String>) {
        if self
            .entries
            .iter()
            .any(|e| e.identity.import_path == identity.import_path)
        {
            return;
        }
        self.entries.push(SelectionEntry { identity, tests });
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of test functions across all entries.
    pub fn test_count(&self) -> usize {
        self.entries.iter().map(|e| e.tests.len()).sum()
    }
}

/// An import line of the driver.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DriverImport {
    pub alias: String,
    pub import_path: String,
}

/// A registration entry of the driver.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DriverTest {
    pub name: String,
    /// Import path of the package declaring the test.
    pub import_path: String,
    pub alias: String,
}

/// A synthesized test driver.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Driver {
    pub imports: Vec<DriverImport>,
    pub tests: Vec<DriverTest>,
}

impl Driver {
    /// Render the driver source. Output depends only on the driver's
    /// contents.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("// Code generated by gauge test. DO NOT EDIT.\n\n");
        out.push_str("package main\n\n");

        out.push_str("import (\n\t\"testing\"\n");
        if !self.imports.is_empty() {
            out.push('\n');
        }
        for import in &self.imports {
            let _ = writeln!(out, "\t{} \"{}\"", import.alias, import.import_path);
        }
        out.push_str(")\n\n");

        if self.tests.is_empty() {
            out.push_str("var tests = []testing.InternalTest{}\n\n");
        } else {
            out.push_str("var tests = []testing.InternalTest{\n");
            for test in &self.tests {
                let _ = writeln!(out, "\t{{\"{0}\", {1}.{0}}},", test.name, test.alias);
            }
            out.push_str("}\n\n");
        }

        out.push_str("func main() {\n\ttesting.Main(tests)\n}\n");
        out
    }
}

/// Synthesize the driver for a selection.
///
/// Fails with `ReservedImportCollision` if any selected package, or the
/// package under test of a selected external test package, resolves to the
/// reserved entry-point path.
#[tracing::instrument(level = "debug", skip_all, fields(packages = selection.entries.len()))]
pub fn synthesize(selection: &Selection) -> Result<Driver, BuildError> {
    for entry in &selection.entries {
        let identity = &entry.identity;
        let colliding = match &identity.kind {
            PackageKind::Package => is_reserved(&identity.import_path).then_some(&identity.import_path),
            PackageKind::ExternalTest { under_test } => {
                is_reserved(under_test).then_some(under_test)
            }
        };
        if let Some(import_path) = colliding {
            tracing::debug!(
                import_path = %import_path,
                directory = %identity.directory.display(),
                "selected package resolves to the reserved path"
            );
            return Err(BuildError::ReservedImportCollision {
                import_path: import_path.clone(),
                directory: identity.directory.clone(),
            });
        }
    }

    let mut imports = Vec::with_capacity(selection.entries.len());
    let mut tests = Vec::with_capacity(selection.test_count());
    for (idx, entry) in selection.entries.iter().enumerate() {
        let alias = if entry.tests.is_empty() {
            BLANK_ALIAS.to_string()
        } else {
            format!("_test{idx}")
        };
        for name in &entry.tests {
            tests.push(DriverTest {
                name: name.clone(),
                import_path: entry.identity.import_path.clone(),
                alias: alias.clone(),
            });
        }
        imports.push(DriverImport {
            alias,
            import_path: entry.identity.import_path.clone(),
        });
    }

    tracing::debug!(imports = imports.len(), tests = tests.len(), "driver synthesized");
    Ok(Driver { imports, tests })
}
