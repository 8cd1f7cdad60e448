//! The `mod` command: create or rename the module declaration.

use gauge_diagnostic::emitter::ColorMode;
use gaugec::module;

use super::emit_error;

/// Create `go.mod` in the current directory.
pub fn init_module(path: &str, version: Option<&str>) {
    let cwd = current_dir();
    match module::init_module(&cwd, path, version) {
        Ok(created) => {
            eprintln!("gauge: creating new {}: module {}", created.display(), path.trim());
        }
        Err(error) => {
            emit_error(&error, ColorMode::Auto);
            std::process::exit(1);
        }
    }
}

/// Rename the module enclosing the current directory.
pub fn rename_module(path: &str) {
    let cwd = current_dir();
    match module::rename_module(&cwd, path) {
        Ok(renamed) if renamed.changed() => {
            eprintln!(
                "gauge: renamed module {} -> {} in {}",
                renamed.from.canonical_path(),
                renamed.to.canonical_path(),
                renamed.mod_file.display()
            );
        }
        Ok(renamed) => {
            eprintln!(
                "gauge: module is already {}",
                renamed.to.canonical_path()
            );
        }
        Err(error) => {
            emit_error(&error, ColorMode::Auto);
            std::process::exit(1);
        }
    }
}

pub(super) fn current_dir() -> std::path::PathBuf {
    match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: cannot determine the current directory: {e}");
            std::process::exit(1);
        }
    }
}
