//! Command handlers for the gauge CLI.
//!
//! Each submodule implements one command. Diagnostic output shared by the
//! commands lives here.

use std::io::{self, IsTerminal};

use gauge_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use gaugec::BuildError;

mod explain;
mod module;

pub use explain::explain_error;
pub use module::{init_module, rename_module};
pub use test::run_tests;

/// Print a build error as a full diagnostic on stderr.
fn emit_error(error: &BuildError, color: ColorMode) {
    let mut emitter =
        TerminalEmitter::<io::Stderr>::stderr(color, io::stderr().is_terminal());
    emitter.emit(&error.to_diagnostic());
    emitter.flush();
}
