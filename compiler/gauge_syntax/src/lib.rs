//! Source-level view of a gauge package.
//!
//! The build tool never needs a full parse of a source file. It needs the
//! package clause, the imports, and the test functions with the testing
//! calls in their bodies. This crate provides exactly that:
//!
//! ```text
//! source text
//!     │
//!     ▼
//! lex() ──► Vec<Token>
//!     │
//!     ▼
//! scan() ──► SourceSummary { package, imports, tests }
//! ```

mod lexer;
mod scan;
mod span;

pub use lexer::{lex, Token, TokenKind};
pub use scan::{
    is_test_file_name, is_test_func_name, scan, Import, PackageClause, ScanError, ScanErrorKind,
    SourceSummary, TestCall, TestFunc,
};
pub use span::{LineOffsetTable, Span};
