//! Build graph: every import path in the current build, by directory.
//!
//! Two directories may not share an import path, and two import paths may not
//! differ only by case. Either collision makes the whole build ambiguous.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::PackageIdentity;
use crate::error::BuildError;
use crate::module::PathTable;

/// Import paths registered for one build.
#[derive(Debug)]
pub struct BuildGraph {
    generation: u32,
    by_path: FxHashMap<String, PathBuf>,
    /// Lowercased import path to the exact path that claimed it.
    by_folded: FxHashMap<String, String>,
}

impl BuildGraph {
    pub fn new(table: &PathTable) -> Self {
        BuildGraph {
            generation: table.generation(),
            by_path: FxHashMap::default(),
            by_folded: FxHashMap::default(),
        }
    }

    /// Register a resolved identity.
    ///
    /// Identities resolved against another generation of the path table are
    /// rejected as stale.
    pub fn insert(&mut self, identity: &PackageIdentity) -> Result<(), BuildError> {
        self.check_generation(identity)?;
        self.insert_path(&identity.import_path, &identity.directory)
    }

    /// Register an import path for a directory. Registering the same pair
    /// twice is a no-op.
    pub fn insert_path(&mut self, import_path: &str, directory: &Path) -> Result<(), BuildError> {
        self.check_path(import_path, directory)?;
        if self.by_path.contains_key(import_path) {
            return Ok(());
        }
        tracing::trace!(import_path, directory = %directory.display(), "graph entry");
        self.by_path
            .insert(import_path.to_string(), directory.to_path_buf());
        self.by_folded
            .insert(import_path.to_lowercase(), import_path.to_string());
        Ok(())
    }

    /// Whether a resolved identity agrees with the graph: same generation and
    /// no collision. Does not modify the graph.
    pub fn check(&self, identity: &PackageIdentity) -> Result<(), BuildError> {
        self.check_generation(identity)?;
        self.check_path(&identity.import_path, &identity.directory)
    }

    fn check_generation(&self, identity: &PackageIdentity) -> Result<(), BuildError> {
        if identity.generation == self.generation {
            Ok(())
        } else {
            Err(BuildError::StaleIdentity {
                import_path: identity.import_path.clone(),
            })
        }
    }

    /// Whether `import_path` could be registered for `directory` without a
    /// collision. Does not modify the graph.
    pub fn check_path(&self, import_path: &str, directory: &Path) -> Result<(), BuildError> {
        if let Some(existing) = self.by_path.get(import_path) {
            if existing != directory {
                return Err(BuildError::AmbiguousImportPath {
                    import_path: import_path.to_string(),
                    other_import_path: import_path.to_string(),
                    first: existing.clone(),
                    second: directory.to_path_buf(),
                });
            }
            return Ok(());
        }
        if let Some(other) = self.by_folded.get(&import_path.to_lowercase()) {
            let first = self.by_path.get(other).cloned().unwrap_or_default();
            return Err(BuildError::AmbiguousImportPath {
                import_path: import_path.to_string(),
                other_import_path: other.clone(),
                first,
                second: directory.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Directory registered for an import path.
    pub fn get(&self, import_path: &str) -> Option<&Path> {
        self.by_path.get(import_path).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}
