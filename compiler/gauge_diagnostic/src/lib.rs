//! Diagnostic system for build and test errors.
//!
//! Every user-facing failure of the build tool is rendered as a
//! [`Diagnostic`]:
//! - Error codes for searchability (`gauge --explain E3001`)
//! - Clear messages (what went wrong)
//! - Labels pointing at files or directories (where it went wrong)
//! - Notes and suggestions (why, and how to fix)

mod diagnostic;
pub mod emitter;
mod error_code;
mod errors;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
