//! Run command - execute Lox source files

use super::{exit_code, Reporter};
use anyhow::{Context, Result};
use lox_runtime::{Lox, RunMode, RunOutcome};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

/// Run a Lox source file
///
/// Program output goes to stdout, diagnostics to stderr. The exit code
/// reflects whether the program was rejected or failed at runtime.
pub fn run(file_path: &Path, reporter: &Reporter) -> Result<ExitCode> {
    let outcome = run_file(file_path)?;
    reporter.emit(&outcome.diagnostics);
    Ok(exit_code(outcome.status))
}

fn run_file(file_path: &Path) -> Result<RunOutcome> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read source file: {}", file_path.display()))?;

    tracing::info!(file = %file_path.display(), bytes = source.len(), "running");
    let mut lox = Lox::new().with_file_name(file_path.display().to_string());
    Ok(lox.run(&source, RunMode::Batch))
}
