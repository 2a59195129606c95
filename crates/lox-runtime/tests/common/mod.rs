//! Shared test utilities
//!
//! Helpers that run source text through the full pipeline and capture what
//! the program printed.

#![allow(dead_code)]

use lox_runtime::{Diagnostic, Lox, RunMode, RunOutcome, RunStatus, SharedBuffer};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// Run a program in batch mode, returning its outcome and output
pub fn run(source: &str) -> (RunOutcome, String) {
    let output = SharedBuffer::new();
    let mut lox = Lox::with_output(Box::new(output.clone()));
    let outcome = lox.run(source, RunMode::Batch);
    (outcome, output.contents())
}

/// Assert that a program runs cleanly and prints `expected`
///
/// # Example
/// ```
/// assert_prints("print 1 + 2;", "3\n");
/// ```
pub fn assert_prints(source: &str, expected: &str) {
    let (outcome, output) = run(source);
    assert!(
        outcome.status.is_success(),
        "Expected success, got {:?}: {:#?}",
        outcome.status,
        outcome.diagnostics
    );
    assert_eq!(output, expected, "Output mismatch for {:?}", source);
}

/// Assert that a program fails at runtime with `message`
pub fn assert_runtime_error(source: &str, message: &str) -> Diagnostic {
    let (outcome, _) = run(source);
    assert_eq!(outcome.status, RunStatus::RuntimeError, "for {:?}", source);
    let diag = outcome.diagnostics.into_iter().next().expect("one diagnostic");
    assert_eq!(diag.message, message);
    diag
}

/// Assert that a program is rejected before running, returning the reports
pub fn assert_static_error(source: &str) -> Vec<String> {
    let (outcome, output) = run(source);
    assert_eq!(outcome.status, RunStatus::StaticError, "for {:?}", source);
    assert_eq!(output, "", "nothing should run");
    outcome.diagnostics.iter().map(|d| d.to_string()).collect()
}
