//! Package directory discovery.
//!
//! Used to expand the `./...` pattern and to lay out the build graph of a
//! module before any package is tested.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BuildError;
use crate::identity::{BuildGraph, Resolver};
use crate::module::modfile::{read_module, MOD_FILE_NAME};
use crate::module::PathTable;

use super::source_files_in;

/// Directories skipped by name during discovery.
const SKIPPED_DIRS: &[&str] = &["testdata", "vendor", "target"];

/// Every directory under `start` (inclusive) holding at least one source
/// file, sorted.
///
/// Hidden and `_`-prefixed directories are skipped, as are directories that
/// start a nested module.
pub fn discover_package_dirs(start: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut nested = Vec::new();
    discover_recursive(start, &mut dirs, &mut nested);
    dirs.sort();
    dirs
}

/// Roots of the modules nested under `start`, sorted. Modules nested inside
/// a nested module are not included.
pub fn discover_nested_modules(start: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut nested = Vec::new();
    discover_recursive(start, &mut dirs, &mut nested);
    nested.sort();
    nested
}

fn discover_recursive(dir: &Path, dirs: &mut Vec<PathBuf>, nested: &mut Vec<PathBuf>) {
    if source_files_in(dir).is_ok_and(|files| !files.is_empty()) {
        dirs.push(dir.to_path_buf());
    }

    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name) {
            continue;
        }
        if path.join(MOD_FILE_NAME).is_file() {
            tracing::debug!(directory = %path.display(), "nested module");
            nested.push(path);
            continue;
        }
        discover_recursive(&path, dirs, nested);
    }
}

/// Lay out the import paths of every package visible from a module: its own
/// packages and those of the modules nested inside it.
///
/// Fails with `AmbiguousImportPath` when two directories resolve to the same
/// import path, or to paths differing only by case.
#[tracing::instrument(level = "debug", skip_all, fields(module = resolver.table().canonical_path()))]
pub fn module_graph(resolver: &Resolver<'_>) -> Result<BuildGraph, BuildError> {
    let mut graph = BuildGraph::new(resolver.table());
    for dir in discover_package_dirs(resolver.root()) {
        let import_path = resolver.import_path_of(&dir)?;
        graph.insert_path(&import_path, &dir)?;
    }

    let mut pending = discover_nested_modules(resolver.root());
    while let Some(root) = pending.pop() {
        let table = PathTable::from_decl(&read_module(&root)?)?;
        let nested = Resolver::new(&table, &root);
        for dir in discover_package_dirs(&root) {
            let import_path = nested.import_path_of(&dir)?;
            graph.insert_path(&import_path, &dir)?;
        }
        pending.extend(discover_nested_modules(&root));
    }

    tracing::debug!(packages = graph.len(), "module graph laid out");
    Ok(graph)
}
