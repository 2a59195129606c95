//! Lox runtime API for embedding
//!
//! [`Lox`] owns an interpreter and runs source text through the whole
//! pipeline: lex, parse, resolve, interpret. Global state survives between
//! runs, which is what the REPL relies on.

use crate::ast::Program;
use crate::diagnostic::Diagnostic;
use crate::interpreter::Interpreter;
pub use crate::interpreter::RunMode;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::resolver::Resolver;
use std::io::Write;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Lexical, syntax or resolution errors; nothing was executed
    StaticError,
    /// Execution started and stopped at a runtime error
    RuntimeError,
}

impl RunStatus {
    /// Process exit code a driver should use (sysexits.h)
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::StaticError => 65,
            RunStatus::RuntimeError => 70,
        }
    }

    pub fn is_success(self) -> bool {
        self == RunStatus::Success
    }
}

/// Status and diagnostics of one top-level run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// In report order, located against the source that was run
    pub diagnostics: Vec<Diagnostic>,
}

impl RunOutcome {
    fn success() -> Self {
        Self {
            status: RunStatus::Success,
            diagnostics: Vec::new(),
        }
    }
}

/// Lex and parse `source` without running it
///
/// Diagnostics are located against `source`.
pub fn parse(source: &str) -> (Program, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = Lexer::new(source).tokenize();
    let (program, parse_diagnostics) = Parser::new(tokens).parse();
    diagnostics.extend(parse_diagnostics);
    let diagnostics = diagnostics
        .into_iter()
        .map(|diag| diag.locate_in(source))
        .collect();
    (program, diagnostics)
}

/// Lox runtime instance
///
/// # Examples
///
/// ```
/// use lox_runtime::{Lox, RunMode, RunStatus, SharedBuffer};
///
/// let output = SharedBuffer::new();
/// let mut lox = Lox::with_output(Box::new(output.clone()));
/// let outcome = lox.run("print 1 + 2;", RunMode::Batch);
/// assert_eq!(outcome.status, RunStatus::Success);
/// assert_eq!(output.contents(), "3\n");
/// ```
pub struct Lox {
    interpreter: Interpreter,
    /// First node id for the next program, so ids stay unique across runs
    next_node_id: u32,
    /// Name reported in diagnostics
    file: String,
}

impl Lox {
    /// Create a runtime that prints to stdout
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// Create a runtime that prints to `output`
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self::from_interpreter(Interpreter::with_output(output))
    }

    fn from_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_node_id: 0,
            file: "<input>".to_string(),
        }
    }

    /// Name diagnostics after `file`
    pub fn with_file_name(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Access the interpreter, e.g. to install more natives
    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Run a complete program (a file, or one REPL line)
    #[tracing::instrument(level = "debug", skip_all, fields(mode = ?mode))]
    pub fn run(&mut self, source: &str, mode: RunMode) -> RunOutcome {
        let (tokens, mut diagnostics) = Lexer::new(source).tokenize();

        let mut parser = Parser::new(tokens).with_first_node_id(self.next_node_id);
        let (program, parse_diagnostics) = parser.parse();
        self.next_node_id = parser.next_node_id();
        diagnostics.extend(parse_diagnostics);

        if diagnostics.is_empty() {
            let (resolutions, resolve_diagnostics) = Resolver::new().resolve(&program);
            diagnostics.extend(resolve_diagnostics);
            if diagnostics.is_empty() {
                self.interpreter.add_resolutions(resolutions);
            }
        }

        if !diagnostics.is_empty() {
            tracing::debug!(errors = diagnostics.len(), "static errors, not executing");
            return RunOutcome {
                status: RunStatus::StaticError,
                diagnostics: self.locate(diagnostics, source),
            };
        }

        self.interpreter.set_mode(mode);
        match self.interpreter.interpret(&program) {
            Ok(()) => RunOutcome::success(),
            Err(error) => {
                tracing::debug!(code = error.code(), "runtime error");
                RunOutcome {
                    status: RunStatus::RuntimeError,
                    diagnostics: self.locate(vec![error.to_diagnostic()], source),
                }
            }
        }
    }

    fn locate(&self, diagnostics: Vec<Diagnostic>, source: &str) -> Vec<Diagnostic> {
        diagnostics
            .into_iter()
            .map(|diag| diag.with_file(self.file.clone()).locate_in(source))
            .collect()
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::error_codes;
    use crate::output::SharedBuffer;

    fn runtime() -> (Lox, SharedBuffer) {
        let output = SharedBuffer::new();
        (Lox::with_output(Box::new(output.clone())), output)
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::Success.exit_code(), 0);
        assert_eq!(RunStatus::StaticError.exit_code(), 65);
        assert_eq!(RunStatus::RuntimeError.exit_code(), 70);
    }

    #[test]
    fn test_successful_run() {
        let (mut lox, output) = runtime();
        let outcome = lox.run("var a = \"hi\"; print a;", RunMode::Batch);
        assert_eq!(outcome, RunOutcome::success());
        assert_eq!(output.contents(), "hi\n");
    }

    #[test]
    fn test_syntax_error_prevents_execution() {
        let (mut lox, output) = runtime();
        let outcome = lox.run("print 1; print ;", RunMode::Batch);
        assert_eq!(outcome.status, RunStatus::StaticError);
        assert_eq!(
            outcome.diagnostics[0].to_string(),
            "[line 1] Error at ';': Expected expression."
        );
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn test_lexical_and_syntax_errors_reported_together() {
        let (mut lox, _) = runtime();
        let outcome = lox.run("var a = @;\nprint ;", RunMode::Batch);
        let codes: Vec<&str> = outcome.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes[0], error_codes::UNEXPECTED_CHARACTER);
        assert!(codes.len() >= 2);
    }

    #[test]
    fn test_resolution_error() {
        let (mut lox, _) = runtime();
        let outcome = lox.run("return 1;", RunMode::Batch);
        assert_eq!(outcome.status, RunStatus::StaticError);
        assert_eq!(
            outcome.diagnostics[0].to_string(),
            "[line 1] Error at 'return': Can't return from top-level code."
        );
    }

    #[test]
    fn test_runtime_error_keeps_earlier_output() {
        let (mut lox, output) = runtime();
        let outcome = lox.run("print 1;\nprint -\"x\";\nprint 2;", RunMode::Batch);
        assert_eq!(outcome.status, RunStatus::RuntimeError);
        assert_eq!(output.contents(), "1\n");
        let diag = &outcome.diagnostics[0];
        assert_eq!(
            diag.to_string(),
            "[line 2] Error at '-': Operand must be a number.\n    in -\"x\""
        );
        assert_eq!(diag.column, 7);
    }

    #[test]
    fn test_state_persists_between_runs() {
        let (mut lox, output) = runtime();
        lox.run("var a = 1; fun get() { return a; }", RunMode::Repl);
        lox.run("a = 2;", RunMode::Batch);
        lox.run("print get();", RunMode::Repl);
        assert_eq!(output.contents(), "2\n");
    }

    #[test]
    fn test_node_ids_do_not_collide_across_runs() {
        let (mut lox, output) = runtime();
        lox.run("fun outer() { var x = \"local\"; fun f() { return x; } return f; }", RunMode::Batch);
        lox.run("var g = outer(); var y = \"y\";", RunMode::Batch);
        lox.run("print g(); print y;", RunMode::Batch);
        assert_eq!(output.contents(), "local\ny\n");
    }

    #[test]
    fn test_parse_locates_diagnostics() {
        let (_, diagnostics) = parse("var x = ;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].column, 9);
        assert_eq!(diagnostics[0].snippet, "var x = ;");
    }

    #[test]
    fn test_file_name_in_diagnostics() {
        let output = SharedBuffer::new();
        let mut lox = Lox::with_output(Box::new(output)).with_file_name("main.lox");
        let outcome = lox.run("print nil + 1;", RunMode::Batch);
        assert_eq!(outcome.diagnostics[0].file, "main.lox");
    }
}
