//! Diagnostic system for errors
//!
//! Lexical, syntax, resolution and runtime errors all flow through the
//! unified [`Diagnostic`] type so the driver can render them consistently.

pub mod formatter;

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

/// Where on its line a diagnostic points, for the `[line N] Error<where>` form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "lexeme", rename_all = "snake_case")]
pub enum Anchor {
    /// Line-level only (lexical errors)
    Unanchored,
    /// The end-of-input token
    AtEnd,
    /// A concrete token
    AtLexeme(String),
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic schema version
    pub diag_version: u32,
    /// Severity level
    pub level: DiagnosticLevel,
    /// Error code (e.g., "LX1000")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// File path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Length of error span
    pub length: usize,
    /// Source line string
    pub snippet: String,
    /// Short label for caret range
    pub label: String,
    /// Token the error is reported against
    pub anchor: Anchor,
    /// Additional notes (optional)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
    /// Suggested fix (optional)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub help: Option<String>,
    #[serde(skip)]
    span: Span,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            level: DiagnosticLevel::Error,
            code: code.into(),
            message: message.into(),
            file: "<unknown>".to_string(),
            line: 1,
            column: 1,
            length: span.len(),
            snippet: String::new(),
            label: String::new(),
            anchor: Anchor::Unanchored,
            notes: Vec::new(),
            help: None,
            span,
        }
    }

    /// Create a new error diagnostic (uses generic error code)
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::error_with_code(error_codes::GENERIC_ERROR, message, span)
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the snippet (source line)
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the label (caret description)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a help message
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Fill in column and snippet from the source text the span points into
    ///
    /// Synthetic spans (length zero at offset zero) are left alone.
    pub fn locate_in(mut self, source: &str) -> Self {
        if self.span == Span::dummy() {
            return self;
        }
        let mut line_start = 0;
        let mut offset = 0;
        for (idx, c) in source.chars().enumerate() {
            if idx >= self.span.start {
                break;
            }
            offset = idx + 1;
            if c == '\n' {
                line_start = offset;
            }
        }
        self.column = offset.saturating_sub(line_start) + 1;
        if self.snippet.is_empty() {
            self.snippet = source
                .chars()
                .skip(line_start)
                .take_while(|c| *c != '\n')
                .collect();
        }
        self
    }

    /// Format as `[line N] Error<where>: message`, one line per note after it
    pub fn to_report_string(&self) -> String {
        let location = match &self.anchor {
            Anchor::Unanchored => String::new(),
            Anchor::AtEnd => " at end".to_string(),
            Anchor::AtLexeme(lexeme) => format!(" at '{}'", lexeme),
        };
        let mut output = format!("[line {}] Error{}: {}", self.line, location, self.message);
        for note in &self.notes {
            output.push_str(&format!("\n    {}", note));
        }
        output
    }

    /// Format as JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_report_string())
    }
}

/// Error code registry
pub mod error_codes {
    // LX0xxx - Runtime errors
    pub const TYPE_ERROR: &str = "LX0001";
    pub const UNDEFINED_VARIABLE: &str = "LX0002";
    pub const UNASSIGNED_VARIABLE: &str = "LX0003";
    pub const ARITY_MISMATCH: &str = "LX0004";
    pub const NOT_CALLABLE: &str = "LX0005";
    pub const NATIVE_ERROR: &str = "LX0006";
    pub const STACK_OVERFLOW: &str = "LX0007";

    // LX1xxx - Lexical and syntax errors
    pub const SYNTAX_ERROR: &str = "LX1000";
    pub const UNEXPECTED_CHARACTER: &str = "LX1001";
    pub const UNTERMINATED_STRING: &str = "LX1002";
    pub const INVALID_ASSIGNMENT_TARGET: &str = "LX1005";
    pub const TOO_MANY_ARGUMENTS: &str = "LX1006";
    pub const BREAK_OUTSIDE_LOOP: &str = "LX1007";

    // LX3xxx - Resolution errors
    pub const RETURN_OUTSIDE_FUNCTION: &str = "LX3001";
    pub const CONTINUE_UNSUPPORTED: &str = "LX3002";

    // LX9xxx - Internal errors
    pub const GENERIC_ERROR: &str = "LX9999";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error("test error", Span::new(0, 5));
        assert_eq!(diag.level, DiagnosticLevel::Error);
        assert_eq!(diag.message, "test error");
        assert_eq!(diag.code, error_codes::GENERIC_ERROR);
        assert_eq!(diag.length, 5);
        assert_eq!(diag.diag_version, DIAG_VERSION);
    }

    #[test]
    fn test_builder_pattern() {
        let diag = Diagnostic::error("test", Span::new(0, 4))
            .with_file("test.lox")
            .with_line(10)
            .with_snippet("var x = y;")
            .with_label("undefined variable")
            .with_note("in y")
            .with_help("declare y first");

        assert_eq!(diag.file, "test.lox");
        assert_eq!(diag.line, 10);
        assert_eq!(diag.snippet, "var x = y;");
        assert_eq!(diag.label, "undefined variable");
        assert_eq!(diag.notes.len(), 1);
        assert!(diag.help.is_some());
    }

    #[test]
    fn test_report_format_at_lexeme() {
        let diag = Diagnostic::error_with_code(
            error_codes::SYNTAX_ERROR,
            "Expected expression.",
            Span::new(4, 5),
        )
        .with_line(3)
        .with_anchor(Anchor::AtLexeme(";".to_string()));
        assert_eq!(
            diag.to_report_string(),
            "[line 3] Error at ';': Expected expression."
        );
    }

    #[test]
    fn test_report_format_at_end_and_unanchored() {
        let at_end = Diagnostic::error("Expected '}' after block.", Span::new(9, 9))
            .with_line(2)
            .with_anchor(Anchor::AtEnd);
        assert_eq!(
            at_end.to_string(),
            "[line 2] Error at end: Expected '}' after block."
        );

        let bare = Diagnostic::error("Unterminated string.", Span::new(0, 3)).with_line(7);
        assert_eq!(bare.to_string(), "[line 7] Error: Unterminated string.");
    }

    #[test]
    fn test_report_includes_notes() {
        let diag = Diagnostic::error("Operands must be numbers.", Span::new(0, 1))
            .with_anchor(Anchor::AtLexeme("-".to_string()))
            .with_note("in (1 - \"a\")");
        assert_eq!(
            diag.to_report_string(),
            "[line 1] Error at '-': Operands must be numbers.\n    in (1 - \"a\")"
        );
    }

    #[test]
    fn test_locate_in_computes_column_and_snippet() {
        let source = "var a = 1;\nprint a @ 2;\n";
        let diag = Diagnostic::error("Unexpected character `@`.", Span::new(19, 20))
            .with_line(2)
            .locate_in(source);
        assert_eq!(diag.column, 9);
        assert_eq!(diag.snippet, "print a @ 2;");
    }

    #[test]
    fn test_json_format() {
        let diag = Diagnostic::error_with_code("LX1000", "Expected expression.", Span::new(0, 1))
            .with_file("test.lox")
            .with_anchor(Anchor::AtEnd);

        let json = diag.to_json_string().expect("serializes");
        assert!(json.contains("\"code\": \"LX1000\""));
        assert!(json.contains("\"level\": \"error\""));
        assert!(json.contains("\"kind\": \"at_end\""));

        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed["file"], "test.lox");
    }
}
