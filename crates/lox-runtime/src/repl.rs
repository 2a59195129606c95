//! REPL core logic (UI-agnostic)

use crate::diagnostic::Diagnostic;
use crate::output::SharedBuffer;
use crate::runtime::{Lox, RunMode, RunStatus};

/// Result of evaluating one line
#[derive(Debug, Clone, PartialEq)]
pub struct ReplResult {
    pub status: RunStatus,
    /// Diagnostics from whichever phase failed
    pub diagnostics: Vec<Diagnostic>,
    /// Program output produced by the line, including echoed values
    pub stdout: String,
}

/// REPL core state
///
/// Maintains persistent state across lines:
/// - Variable and function declarations persist
/// - Errors do not reset state
pub struct ReplCore {
    lox: Lox,
    output: SharedBuffer,
}

impl ReplCore {
    pub fn new() -> Self {
        let output = SharedBuffer::new();
        Self {
            lox: Lox::with_output(Box::new(output.clone())).with_file_name("<repl>"),
            output,
        }
    }

    /// Evaluate one line of input as a complete program
    ///
    /// A bare expression statement prints its value.
    pub fn eval_line(&mut self, input: &str) -> ReplResult {
        let outcome = self.lox.run(input, RunMode::Repl);
        ReplResult {
            status: outcome.status,
            diagnostics: outcome.diagnostics,
            stdout: self.output.take(),
        }
    }

    /// Forget every definition made so far
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ReplCore {
    fn default() -> Self {
        Self::new()
    }
}
