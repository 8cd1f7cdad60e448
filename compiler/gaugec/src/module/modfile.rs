//! The `go.mod` module declaration file.
//!
//! ```text
//! module widgets
//!
//! go 1.21
//! ```
//!
//! Only the `module` and `go` directives carry meaning for the build tool.
//! Dependency directives (`require`, `replace`, ...) are accepted, in line
//! or block form, and ignored.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ModuleDecl, DEFAULT_TOOLCHAIN_VERSION};
use crate::error::BuildError;

/// File name of the module declaration.
pub const MOD_FILE_NAME: &str = "go.mod";

/// Directives that are valid but irrelevant to identity resolution.
const IGNORED_DIRECTIVES: &[&str] = &[
    "require",
    "replace",
    "exclude",
    "retract",
    "toolchain",
    "godebug",
];

/// A problem in the text of a module declaration file.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum ModFileError {
    #[error("missing `module` directive")]
    MissingModule,
    #[error("repeated `{directive}` directive")]
    Repeated { directive: &'static str },
    #[error("unknown directive `{directive}`")]
    UnknownDirective { directive: String },
    #[error("invalid toolchain version {version:?}")]
    InvalidVersion { version: String },
    #[error("unclosed `{directive} (` block")]
    UnclosedBlock { directive: String },
}

/// Parse module declaration text.
///
/// On failure returns the 1-based line of the problem alongside the error;
/// `MissingModule` reports the last line.
pub fn parse_mod_file(text: &str) -> Result<ModuleDecl, (usize, ModFileError)> {
    let mut declared_path = None;
    let mut toolchain_version = None;
    let mut block: Option<(usize, &str)> = None;
    let mut line_count = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        line_count = line_no;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if block.is_some() {
            if line == ")" {
                block = None;
            }
            continue;
        }

        let (directive, value) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(d, v)| (d, v.trim()));

        match directive {
            "module" => {
                if declared_path.is_some() {
                    return Err((line_no, ModFileError::Repeated { directive: "module" }));
                }
                declared_path = Some(unquote(value).to_string());
            }
            "go" => {
                if toolchain_version.is_some() {
                    return Err((line_no, ModFileError::Repeated { directive: "go" }));
                }
                if !is_valid_version(value) {
                    return Err((
                        line_no,
                        ModFileError::InvalidVersion {
                            version: value.to_string(),
                        },
                    ));
                }
                toolchain_version = Some(value.to_string());
            }
            d if IGNORED_DIRECTIVES.contains(&d) => {
                if value == "(" {
                    block = Some((line_no, d));
                }
            }
            other => {
                return Err((
                    line_no,
                    ModFileError::UnknownDirective {
                        directive: other.to_string(),
                    },
                ));
            }
        }
    }

    if let Some((line_no, directive)) = block {
        return Err((
            line_no,
            ModFileError::UnclosedBlock {
                directive: directive.to_string(),
            },
        ));
    }

    let Some(declared_path) = declared_path else {
        return Err((line_count.max(1), ModFileError::MissingModule));
    };

    Ok(ModuleDecl {
        declared_path,
        toolchain_version: toolchain_version
            .unwrap_or_else(|| DEFAULT_TOOLCHAIN_VERSION.to_string()),
    })
}

/// Render a fresh module declaration file.
pub fn render_mod_file(decl: &ModuleDecl) -> String {
    format!(
        "module {}\n\ngo {}\n",
        decl.declared_path, decl.toolchain_version
    )
}

/// Replace the `module` line, preserving every other line verbatim.
pub fn rewrite_module_path(text: &str, new_path: &str) -> Result<String, (usize, ModFileError)> {
    let mut out = String::with_capacity(text.len() + new_path.len());
    let mut replaced = false;

    for raw in text.split_inclusive('\n') {
        let directive = strip_comment(raw).split_whitespace().next();
        if !replaced && directive == Some("module") {
            out.push_str("module ");
            out.push_str(new_path);
            out.push('\n');
            replaced = true;
        } else {
            out.push_str(raw);
        }
    }

    if replaced {
        Ok(out)
    } else {
        Err((text.lines().count().max(1), ModFileError::MissingModule))
    }
}

/// Walk up from `start` to the nearest directory holding a module file.
pub fn find_module_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(MOD_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Read and parse the module declaration at a module root.
pub fn read_module(root: &Path) -> Result<ModuleDecl, BuildError> {
    let path = root.join(MOD_FILE_NAME);
    let text = fs::read_to_string(&path).map_err(|e| BuildError::io(&path, e))?;
    parse_mod_file(&text).map_err(|(line, source)| BuildError::MalformedModuleFile {
        path,
        line,
        source,
    })
}

fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code)
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// `1.21`, `1.21.3`, `1.22rc1`: digits, dots, and a pre-release suffix.
fn is_valid_version(version: &str) -> bool {
    let mut parts = version.splitn(2, '.');
    let major = parts.next().unwrap_or("");
    let Some(rest) = parts.next() else {
        return false;
    };
    !major.is_empty()
        && major.chars().all(|c| c.is_ascii_digit())
        && rest.starts_with(|c: char| c.is_ascii_digit())
        && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
}
