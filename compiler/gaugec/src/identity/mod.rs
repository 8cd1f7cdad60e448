//! Package identity resolution.
//!
//! A package's import path is the module's canonical path joined with the
//! package directory relative to the module root:
//!
//! ```text
//! module widgets, directory .          -> "widgets"
//! module widgets, directory gears/cog  -> "widgets/gears/cog"
//! module main,    directory .          -> "main"   (reserved, see `entry`)
//! ```
//!
//! Resolution is a pure function of the path table and its inputs. Nothing
//! is cached, so a rename can never leave a stale import path behind.

pub mod entry;
mod graph;

use std::path::{Component, Path, PathBuf};

pub use entry::{is_entry_point_name, is_reserved, RESERVED_IMPORT_PATH};
pub use graph::BuildGraph;

use crate::error::BuildError;
use crate::module::PathTable;

/// Suffix of an external test package's name and import path.
pub const EXTERNAL_TEST_SUFFIX: &str = "_test";

/// Role of a package in a test build.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PackageKind {
    /// An ordinary package, including its in-package (white-box) tests.
    Package,
    /// A `<name>_test` package holding black-box tests of `under_test`.
    ExternalTest { under_test: String },
}

/// Resolved identity of one package.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PackageIdentity {
    pub import_path: String,
    pub directory: PathBuf,
    /// Source-level package name.
    pub package_name: String,
    /// Source-level fact: the package is named like the entry point.
    pub is_entry_point: bool,
    pub kind: PackageKind,
    /// Generation of the path table this identity was resolved against.
    pub generation: u32,
}

/// Resolves package directories to identities within one module.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    table: &'a PathTable,
    root: &'a Path,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a PathTable, root: &'a Path) -> Self {
        Resolver { table, root }
    }

    pub fn table(&self) -> &'a PathTable {
        self.table
    }

    pub fn root(&self) -> &'a Path {
        self.root
    }

    /// Resolve a package directory given relative to the module root.
    #[tracing::instrument(level = "trace", skip(self), fields(module = self.table.canonical_path()))]
    pub fn resolve(
        &self,
        relative_directory: &Path,
        package_name: &str,
    ) -> Result<PackageIdentity, BuildError> {
        let relative = normalize_relative_dir(relative_directory).ok_or_else(|| {
            BuildError::InvalidPackageDirectory {
                directory: relative_directory.to_path_buf(),
            }
        })?;
        let import_path = join_import_path(self.table.canonical_path(), &relative);
        let directory = if relative.is_empty() {
            self.root.to_path_buf()
        } else {
            self.root.join(&relative)
        };

        Ok(PackageIdentity {
            import_path,
            directory,
            package_name: package_name.to_string(),
            is_entry_point: is_entry_point_name(package_name),
            kind: PackageKind::Package,
            generation: self.table.generation(),
        })
    }

    /// Resolve a directory given as a path under the module root.
    pub fn resolve_dir(
        &self,
        directory: &Path,
        package_name: &str,
    ) -> Result<PackageIdentity, BuildError> {
        let relative = self.relative_to_root(directory)?;
        self.resolve(&relative, package_name)
    }

    /// Import path of a directory under the module root, without a package
    /// name. Used to lay out the build graph before any file is read.
    pub fn import_path_of(&self, directory: &Path) -> Result<String, BuildError> {
        let relative = self.relative_to_root(directory)?;
        let relative = normalize_relative_dir(&relative)
            .ok_or_else(|| BuildError::InvalidPackageDirectory {
                directory: directory.to_path_buf(),
            })?;
        Ok(join_import_path(self.table.canonical_path(), &relative))
    }

    /// Identity of the external test package for `under_test`.
    pub fn resolve_external_test(
        &self,
        under_test: &PackageIdentity,
        package_name: &str,
    ) -> PackageIdentity {
        PackageIdentity {
            import_path: format!("{}{EXTERNAL_TEST_SUFFIX}", under_test.import_path),
            directory: under_test.directory.clone(),
            package_name: package_name.to_string(),
            is_entry_point: false,
            kind: PackageKind::ExternalTest {
                under_test: under_test.import_path.clone(),
            },
            generation: self.table.generation(),
        }
    }

    fn relative_to_root(&self, directory: &Path) -> Result<PathBuf, BuildError> {
        let normalized = normalize_lexically(directory);
        normalized
            .strip_prefix(normalize_lexically(self.root))
            .map(Path::to_path_buf)
            .map_err(|_| BuildError::InvalidPackageDirectory {
                directory: directory.to_path_buf(),
            })
    }
}

/// Join a module path with a normalized relative directory.
///
/// The module root (`""`) collapses to the module path itself, with no
/// trailing separator.
pub fn join_import_path(module_path: &str, relative: &str) -> String {
    if relative.is_empty() {
        module_path.to_string()
    } else {
        format!("{module_path}/{relative}")
    }
}

/// Normalize a relative directory to `/`-separated segments.
///
/// `.` segments are dropped and `a/../b` folds to `b`. Returns `None` for
/// absolute paths, paths escaping the root, and non-UTF-8 segments.
pub fn normalize_relative_dir(relative: &Path) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::ParentDir => {
                segments.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(segments.join("/"))
}

/// Fold `.` and `..` components without touching the file system.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
