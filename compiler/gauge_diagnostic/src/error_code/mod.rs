//! Error codes for all build tool diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E3001`) with the first digit
//! indicating the phase that produced it. Used for `--explain` lookups.

use std::fmt;

/// Error codes for all build tool diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Source scanning errors
/// - E1xxx: Module declaration errors
/// - E2xxx: Package resolution errors
/// - E3xxx: Test driver synthesis errors
/// - E4xxx: Compile errors
/// - E9xxx: Internal / I/O errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Source Errors (E0xxx)
    /// Syntax error in a source file
    E0001,

    // Module Errors (E1xxx)
    /// Invalid module path
    E1001,
    /// No module declaration found
    E1002,
    /// Malformed module declaration file
    E1003,
    /// Module declaration already exists
    E1004,

    // Resolution Errors (E2xxx)
    /// Two directories resolve to the same import path
    E2001,
    /// Package directory outside the module root
    E2002,
    /// No source files in package directory
    E2003,
    /// Multiple packages in one directory
    E2004,
    /// Named files span multiple directories
    E2005,
    /// Package directory does not exist
    E2006,
    /// Identity resolved against a renamed module
    E2007,

    // Synthesis Errors (E3xxx)
    /// Test driver would import the reserved entry-point path
    E3001,

    // Compile Errors (E4xxx)
    /// Unit rejected by the compiler
    E4001,

    // Internal Errors (E9xxx)
    /// I/O failure
    E9001,
}

impl ErrorCode {
    /// All error codes, in numeric order.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E3001,
        ErrorCode::E4001,
        ErrorCode::E9001,
    ];

    /// Get the string representation (e.g., "E3001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is a module declaration error (E1xxx).
    pub fn is_module_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001 | ErrorCode::E1002 | ErrorCode::E1003 | ErrorCode::E1004
        )
    }

    /// Check if this is a package resolution error (E2xxx).
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
                | ErrorCode::E2006
                | ErrorCode::E2007
        )
    }

    /// Check if this is a test driver synthesis error (E3xxx).
    pub fn is_synthesis_error(&self) -> bool {
        matches!(self, ErrorCode::E3001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
