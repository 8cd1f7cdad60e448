//! Module declaration and the path table.
//!
//! The path table holds the canonical path of the module being built. It is
//! constructed once per build graph, before any package is resolved, and
//! passed by reference to the resolver and synthesizer. It is never mutated:
//! a rename produces a new table with a bumped generation, which makes every
//! identity resolved against the old table stale.

pub mod modfile;

use std::fs;
use std::path::{Path, PathBuf};

use self::modfile::{
    find_module_root, parse_mod_file, read_module, render_mod_file, rewrite_module_path,
    MOD_FILE_NAME,
};
use crate::error::BuildError;

/// Toolchain version written by `gauge mod init` when none is given.
pub const DEFAULT_TOOLCHAIN_VERSION: &str = "1.21";

/// The two fields of a module declaration file.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ModuleDecl {
    pub declared_path: String,
    pub toolchain_version: String,
}

/// Canonical module path, immutable after registration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PathTable {
    canonical_path: String,
    toolchain_version: String,
    generation: u32,
}

impl PathTable {
    /// Register the module's declared path.
    ///
    /// Trims surrounding whitespace; fails with `InvalidModulePath` for an
    /// empty or malformed path.
    pub fn register(declared_path: &str, toolchain_version: &str) -> Result<Self, BuildError> {
        let canonical_path = validate_module_path(declared_path)?;
        tracing::debug!(module = canonical_path, "registered module path");
        Ok(PathTable {
            canonical_path: canonical_path.to_string(),
            toolchain_version: toolchain_version.trim().to_string(),
            generation: 0,
        })
    }

    /// Register from a parsed module declaration.
    pub fn from_decl(decl: &ModuleDecl) -> Result<Self, BuildError> {
        Self::register(&decl.declared_path, &decl.toolchain_version)
    }

    /// A table for the renamed module.
    ///
    /// Renaming to a different path bumps the generation; renaming to the
    /// same path is a no-op.
    pub fn rename(&self, new_path: &str) -> Result<Self, BuildError> {
        let canonical_path = validate_module_path(new_path)?;
        if canonical_path == self.canonical_path {
            return Ok(self.clone());
        }
        tracing::debug!(
            from = %self.canonical_path,
            to = canonical_path,
            "renamed module path"
        );
        Ok(PathTable {
            canonical_path: canonical_path.to_string(),
            toolchain_version: self.toolchain_version.clone(),
            generation: self.generation + 1,
        })
    }

    pub fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    pub fn toolchain_version(&self) -> &str {
        &self.toolchain_version
    }

    /// Incremented on every rename.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Check that a declared module path is a valid segment sequence and return
/// it trimmed.
pub fn validate_module_path(declared_path: &str) -> Result<&str, BuildError> {
    let path = declared_path.trim();
    let invalid = |reason| BuildError::InvalidModulePath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(invalid("module path is empty"));
    }
    if path
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '\\')
    {
        return Err(invalid("module path contains whitespace or a backslash"));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(invalid("module path has an empty segment")),
            "." | ".." => return Err(invalid("module path has a `.` or `..` segment")),
            s if s.starts_with('-') => {
                return Err(invalid("module path segment starts with `-`"));
            }
            _ => {}
        }
    }
    Ok(path)
}

/// Create a module declaration file in `dir`.
///
/// Fails with `ModuleExists` when `dir` already holds one. Returns the path
/// of the new file.
pub fn init_module(
    dir: &Path,
    declared_path: &str,
    toolchain_version: Option<&str>,
) -> Result<PathBuf, BuildError> {
    let path = dir.join(MOD_FILE_NAME);
    if path.exists() {
        return Err(BuildError::ModuleExists { path });
    }
    let table = PathTable::register(
        declared_path,
        toolchain_version.unwrap_or(DEFAULT_TOOLCHAIN_VERSION),
    )?;
    let text = render_mod_file(&ModuleDecl {
        declared_path: table.canonical_path().to_string(),
        toolchain_version: table.toolchain_version().to_string(),
    });
    // Round-trip so an invalid version never reaches the disk.
    parse_mod_file(&text).map_err(|(line, source)| BuildError::MalformedModuleFile {
        path: path.clone(),
        line,
        source,
    })?;
    fs::write(&path, text).map_err(|e| BuildError::io(&path, e))?;
    tracing::debug!(module = table.canonical_path(), path = %path.display(), "module created");
    Ok(path)
}

/// Outcome of a module rename.
#[derive(Clone, Debug)]
pub struct Renamed {
    pub mod_file: PathBuf,
    pub from: PathTable,
    pub to: PathTable,
}

impl Renamed {
    /// Whether the rename changed the module path.
    pub fn changed(&self) -> bool {
        self.from.generation() != self.to.generation()
    }
}

/// Rename the module enclosing `start`, rewriting only its `module` line.
pub fn rename_module(start: &Path, new_path: &str) -> Result<Renamed, BuildError> {
    let root = find_module_root(start).ok_or_else(|| BuildError::ModuleNotFound {
        start: start.to_path_buf(),
    })?;
    let from = PathTable::from_decl(&read_module(&root)?)?;
    let to = from.rename(new_path)?;
    let mod_file = root.join(MOD_FILE_NAME);

    if to.generation() != from.generation() {
        let text = fs::read_to_string(&mod_file).map_err(|e| BuildError::io(&mod_file, e))?;
        let rewritten = rewrite_module_path(&text, to.canonical_path()).map_err(|(line, source)| {
            BuildError::MalformedModuleFile {
                path: mod_file.clone(),
                line,
                source,
            }
        })?;
        fs::write(&mod_file, rewritten).map_err(|e| BuildError::io(&mod_file, e))?;
    }
    Ok(Renamed { mod_file, from, to })
}
