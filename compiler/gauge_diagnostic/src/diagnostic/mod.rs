//! Core diagnostic types for structured error reporting.

use std::fmt;
use std::path::{Path, PathBuf};

use gauge_syntax::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled location with a message.
///
/// Build diagnostics usually point at a file or directory rather than at a
/// byte range, so both parts are optional.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub path: Option<PathBuf>,
    pub span: Option<Span>,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the main error location).
    pub fn primary(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Label {
            path: Some(path.into()),
            span: None,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Label {
            path: Some(path.into()),
            span: None,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Attach a byte span within the labeled file.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Location text: `path`, `path:span`, or empty.
    pub fn location(&self) -> String {
        match (&self.path, self.span) {
            (Some(path), Some(span)) => format!("{}:{span}", path.display()),
            (Some(path), None) => path.display().to_string(),
            (None, Some(span)) => span.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// A rich diagnostic with all context needed for a useful error message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Labeled locations showing where the error occurred.
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Text suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, path: &Path, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(path, message));
        self
    }

    /// Add a primary label at a span within a file.
    pub fn with_span_label(mut self, path: &Path, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(path, message).at(span));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, path: &Path, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(path, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Get the first primary label.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.is_primary)
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// One-line rendering: `error[E3001]: message (location)`.
    ///
    /// Used where a report has room for a single diagnostic line.
    pub fn headline(&self) -> String {
        let mut line = format!("{}[{}]: {}", self.severity, self.code, self.message);
        if let Some(label) = self.primary_label() {
            let location = label.location();
            if !location.is_empty() {
                line.push_str(&format!(" ({location})"));
            }
        }
        line
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {}: {}", marker, label.location(), label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {suggestion}")?;
        }

        Ok(())
    }
}
