//! Entry-point detection.
//!
//! Two facts that are easy to conflate:
//!
//! 1. A package's *source-level name* is the entry-point name (`package main`).
//!    True for the one package that produces an executable.
//! 2. A package's *resolved import path* equals the reserved sentinel. True
//!    only when the module itself was declared with that exact path and the
//!    package sits at the module root.
//!
//! Only the second fact makes a package impossible to import, and so
//! impossible to test through a synthesized driver.

/// The import path reserved for an executable's entry point.
pub const RESERVED_IMPORT_PATH: &str = "main";

/// Package name that designates an executable's entry point.
pub const ENTRY_POINT_PACKAGE: &str = "main";

/// Whether `import_path` is the reserved sentinel, regardless of what the
/// module declared.
pub fn is_reserved(import_path: &str) -> bool {
    import_path == RESERVED_IMPORT_PATH
}

/// Whether a source-level package name is the entry-point name.
pub fn is_entry_point_name(package_name: &str) -> bool {
    package_name == ENTRY_POINT_PACKAGE
}
