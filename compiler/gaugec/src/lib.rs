//! gauge - package identity resolution and test driver synthesis.
//!
//! # Architecture
//!
//! ```text
//! go.mod ──► PathTable (immutable, generation-stamped)
//!               │
//!               ▼
//! directory ──► Resolver ──► PackageIdentity ──► BuildGraph (ambiguity)
//!                                 │
//!                                 ▼
//!                         synthesize() ──► Driver ──► Toolchain ──► TestSummary
//! ```
//!
//! Explicit file lists skip resolution and synthesis: the files are compiled
//! directly under the synthetic `command-line-arguments` identity.

use std::sync::Once;

pub mod backend;
pub mod error;
pub mod harness;
pub mod identity;
pub mod load;
pub mod module;
pub mod test;

pub use backend::{CompileError, Interpreter, Toolchain};
pub use error::BuildError;
pub use harness::{synthesize, Driver, Selection};
pub use identity::{is_entry_point_name, is_reserved, BuildGraph, PackageIdentity, Resolver};
pub use module::PathTable;
pub use test::{Scope, TestRunner, TestRunnerConfig, TestSummary};

/// Environment variable selecting the hierarchical log layout.
pub const LOG_TREE_ENV: &str = "GAUGE_LOG_TREE";

static TRACING_INIT: Once = Once::new();

/// Initialize the tracing subscriber.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let tree = std::env::var_os(LOG_TREE_ENV).is_some();
            tracing_subscriber::registry()
                .with(tree.then(|| {
                    HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr)
                }))
                .with((!tree).then(|| {
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr)
                }))
                .with(filter)
                .init();
        }
    });
}
