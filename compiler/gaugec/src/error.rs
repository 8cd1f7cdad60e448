//! Build errors.
//!
//! Every failure of module loading, resolution, synthesis, or compilation is
//! a [`BuildError`]. Errors are never retried: re-running with the same
//! module declaration is deterministic and fails the same way.

use std::io;
use std::path::{Path, PathBuf};

use gauge_diagnostic::{Diagnostic, ErrorCode};
use gauge_syntax::Span;

use crate::backend::CompileError;
use crate::module::modfile::{ModFileError, MOD_FILE_NAME};

/// A fatal error for the current invocation or package.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid module path {path:?}: {reason}")]
    InvalidModulePath { path: String, reason: &'static str },

    #[error("no {} found in {} or any parent directory", MOD_FILE_NAME, .start.display())]
    ModuleNotFound { start: PathBuf },

    #[error("{}:{line}: {source}", .path.display())]
    MalformedModuleFile {
        path: PathBuf,
        line: usize,
        #[source]
        source: ModFileError,
    },

    #[error("{} already exists", .path.display())]
    ModuleExists { path: PathBuf },

    #[error("{}:{line}:{column}: {message}", .path.display())]
    Syntax {
        path: PathBuf,
        line: u32,
        column: u32,
        span: Span,
        message: String,
    },

    #[error("{}", describe_ambiguity(.import_path, .other_import_path))]
    AmbiguousImportPath {
        import_path: String,
        other_import_path: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("import path {import_path:?} was resolved before the module was renamed")]
    StaleIdentity { import_path: String },

    #[error("directory {} is outside the module root", .directory.display())]
    InvalidPackageDirectory { directory: PathBuf },

    #[error("no Go files in {}", .directory.display())]
    NoGoFiles { directory: PathBuf },

    #[error("found packages {first} and {second} in {}", .directory.display())]
    MixedPackages {
        directory: PathBuf,
        first: String,
        second: String,
    },

    #[error("named files must all be in one directory; have {} and {}", .first.display(), .second.display())]
    FilesInMultipleDirectories { first: PathBuf, second: PathBuf },

    #[error("directory {} does not exist", .directory.display())]
    PackageNotFound { directory: PathBuf },

    #[error("cannot import \"{import_path}\": package in {} resolves to the reserved entry-point path", .directory.display())]
    ReservedImportCollision {
        import_path: String,
        directory: PathBuf,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn describe_ambiguity(import_path: &str, other_import_path: &str) -> String {
    if import_path == other_import_path {
        format!("ambiguous import path \"{import_path}\": resolved from two directories")
    } else {
        format!("case-insensitive import collision: \"{import_path}\" and \"{other_import_path}\"")
    }
}

impl BuildError {
    /// Wrap an I/O error with the path it concerns.
    #[cold]
    pub fn io(path: &Path, source: io::Error) -> Self {
        BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Error code for `--explain` lookups.
    pub fn code(&self) -> ErrorCode {
        match self {
            BuildError::Syntax { .. } => ErrorCode::E0001,
            BuildError::InvalidModulePath { .. } => ErrorCode::E1001,
            BuildError::ModuleNotFound { .. } => ErrorCode::E1002,
            BuildError::MalformedModuleFile { .. } => ErrorCode::E1003,
            BuildError::ModuleExists { .. } => ErrorCode::E1004,
            BuildError::AmbiguousImportPath { .. } => ErrorCode::E2001,
            BuildError::InvalidPackageDirectory { .. } => ErrorCode::E2002,
            BuildError::NoGoFiles { .. } => ErrorCode::E2003,
            BuildError::MixedPackages { .. } => ErrorCode::E2004,
            BuildError::FilesInMultipleDirectories { .. } => ErrorCode::E2005,
            BuildError::PackageNotFound { .. } => ErrorCode::E2006,
            BuildError::StaleIdentity { .. } => ErrorCode::E2007,
            BuildError::ReservedImportCollision { .. } => ErrorCode::E3001,
            BuildError::Compile(_) => ErrorCode::E4001,
            BuildError::Io { .. } => ErrorCode::E9001,
        }
    }

    /// Render as a diagnostic with labels and fix suggestions.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            BuildError::InvalidModulePath { .. } => diag
                .with_note("a module path is one or more `/`-separated segments")
                .with_suggestion(format!("fix the `module` line in {MOD_FILE_NAME}")),
            BuildError::ModuleNotFound { .. } => {
                diag.with_suggestion("create one with `gauge mod init <module path>`")
            }
            BuildError::MalformedModuleFile { path, .. } => {
                diag.with_label(path, "in this module declaration")
            }
            BuildError::ModuleExists { .. } => {
                diag.with_suggestion("use `gauge mod rename <path>` to change the module path")
            }
            BuildError::AmbiguousImportPath { first, second, .. } => diag
                .with_label(first, "first directory")
                .with_secondary_label(second, "second directory")
                .with_note("import paths must be unique within a build"),
            BuildError::ReservedImportCollision { directory, .. } => diag
                .with_label(directory, "offending directory")
                .with_note("the generated test driver must import the package under test")
                .with_suggestion("rename the module with `gauge mod rename <path>`")
                .with_suggestion("or name the files explicitly: `gauge test <files>.go`"),
            BuildError::MixedPackages { directory, .. }
            | BuildError::NoGoFiles { directory }
            | BuildError::PackageNotFound { directory }
            | BuildError::InvalidPackageDirectory { directory } => {
                diag.with_label(directory, "in this directory")
            }
            BuildError::StaleIdentity { .. } => {
                diag.with_note("resolve the package again after `gauge mod rename`")
            }
            BuildError::Syntax { path, span, .. } => {
                diag.with_span_label(path, *span, "while scanning this file")
            }
            BuildError::FilesInMultipleDirectories { .. }
            | BuildError::Compile(_)
            | BuildError::Io { .. } => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_collision_names_path_and_directory() {
        let err = BuildError::ReservedImportCollision {
            import_path: "main".to_string(),
            directory: PathBuf::from("/work/app"),
        };
        let line = err.to_diagnostic().headline();
        assert!(line.starts_with("error[E3001]: cannot import \"main\""));
        assert!(line.contains("/work/app"));
    }

    #[test]
    fn test_ambiguity_messages() {
        let exact = BuildError::AmbiguousImportPath {
            import_path: "shop/util".to_string(),
            other_import_path: "shop/util".to_string(),
            first: PathBuf::from("a"),
            second: PathBuf::from("b"),
        };
        assert!(exact.to_string().starts_with("ambiguous import path"));

        let folded = BuildError::AmbiguousImportPath {
            import_path: "shop/Util".to_string(),
            other_import_path: "shop/util".to_string(),
            first: PathBuf::from("Util"),
            second: PathBuf::from("util"),
        };
        assert!(folded.to_string().starts_with("case-insensitive import collision"));
        assert_eq!(folded.to_diagnostic().labels.len(), 2);
    }

    #[test]
    fn test_syntax_error_labels_file_and_span() {
        let err = BuildError::Syntax {
            path: PathBuf::from("util/util.go"),
            line: 3,
            column: 2,
            span: Span::new(20, 22),
            message: "unexpected input `@@`".to_string(),
        };
        let diag = err.to_diagnostic();
        let label = diag.primary_label().map(gauge_diagnostic::Label::location);
        assert_eq!(label.as_deref(), Some("util/util.go:20..22"));
        assert!(diag.headline().starts_with("error[E0001]: util/util.go:3:2: unexpected input"));
    }

    #[test]
    fn test_codes_by_phase() {
        let err = BuildError::InvalidModulePath {
            path: String::new(),
            reason: "empty",
        };
        assert!(err.code().is_module_error());
        let err = BuildError::NoGoFiles {
            directory: PathBuf::from("x"),
        };
        assert!(err.code().is_resolution_error());
    }
}
