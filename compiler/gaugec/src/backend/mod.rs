//! Compile and execute test binaries.
//!
//! The runner talks to a [`Toolchain`]: compile a synthesized driver against
//! the loaded packages, compile an explicit file list on its own, and run the
//! result. The bundled [`Interpreter`] evaluates test bodies directly from
//! their scanned testing calls.

mod interpreter;

use rustc_hash::FxHashMap;

use gauge_syntax::{TestCall, TestFunc};

pub use interpreter::Interpreter;

use crate::harness::Driver;
use crate::load::{SourceFile, SourceUnit};
use crate::test::TestResult;

/// The backend refused a unit.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{importer}: cannot import \"{import_path}\": it is a program, not an importable package")]
    CannotImportMain {
        importer: String,
        import_path: String,
    },

    #[error("{importer}: package {import_path} is not in the build")]
    UnresolvedImport {
        importer: String,
        import_path: String,
    },

    #[error("{import_path}: undefined test function {name}")]
    UndefinedTest { import_path: String, name: String },
}

/// Packages a driver is linked against, keyed by import path.
#[derive(Debug, Default)]
pub struct LinkSet<'a> {
    packages: FxHashMap<String, &'a [SourceFile]>,
}

impl<'a> LinkSet<'a> {
    pub fn new() -> Self {
        LinkSet::default()
    }

    pub fn insert(&mut self, import_path: impl Into<String>, files: &'a [SourceFile]) {
        self.packages.insert(import_path.into(), files);
    }

    pub fn get(&self, import_path: &str) -> Option<&'a [SourceFile]> {
        self.packages.get(import_path).copied()
    }

    /// Every file of every linked package.
    pub fn files(&self) -> impl Iterator<Item = &'a SourceFile> + '_ {
        self.packages.values().flat_map(|files| files.iter())
    }
}

/// A test function as linked into a binary.
#[derive(Clone, Debug)]
pub struct CompiledTest {
    pub name: String,
    /// Testing calls of the body, in order.
    pub calls: Vec<TestCall>,
}

impl CompiledTest {
    fn from_func(func: &TestFunc) -> Self {
        CompiledTest {
            name: func.name.clone(),
            calls: func.calls.clone(),
        }
    }
}

/// An executable test program.
#[derive(Clone, Debug)]
pub struct TestBinary {
    /// Import path of the package under test, or the synthetic identity.
    pub name: String,
    /// Registered tests in registration order.
    pub tests: Vec<CompiledTest>,
}

/// A compiler and runtime for test programs.
///
/// Implementations are shared across worker threads.
pub trait Toolchain: Sync {
    /// Compile a synthesized driver against its linked packages.
    fn compile_driver(
        &self,
        name: &str,
        driver: &Driver,
        link: &LinkSet<'_>,
    ) -> Result<TestBinary, CompileError>;

    /// Compile an explicit file list as one self-contained program.
    fn compile_files(&self, name: &str, unit: &SourceUnit) -> Result<TestBinary, CompileError>;

    /// Run the binary's tests whose names contain `filter`.
    fn execute(&self, binary: &TestBinary, filter: Option<&str>) -> Vec<TestResult>;
}

/// Find a test function declared in a package's test files.
fn find_test<'a>(files: &'a [SourceFile], name: &str) -> Option<&'a TestFunc> {
    files
        .iter()
        .filter(|f| f.is_test)
        .flat_map(|f| f.summary.tests.iter())
        .find(|t| t.name == name)
}
