//! Test runner infrastructure.
//!
//! This module provides:
//! - Scope expansion: directories, `./...` patterns, explicit file lists
//! - Orchestration: resolve, synthesize, compile, execute per package
//! - Result tracking: pass/fail/skip counts and build errors per package
//! - Parallel execution: several packages concurrently with rayon


pub use result::{PackageReport, TestOutcome, TestResult, TestSummary};
pub use runner::{
    expand_patterns, Scope, TestRunner, TestRunnerConfig, COMMAND_LINE_ARGUMENTS, WORK_DIR_ENV,
};
