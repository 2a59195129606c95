//! AST dump command - print the parsed program

use super::{exit_code, Reporter};
use anyhow::{Context, Result};
use lox_runtime::ast::VersionedProgram;
use lox_runtime::{parse, print_program, RunStatus};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

/// Dump the AST of a source file
///
/// Prints the program back as source text, or as versioned JSON with
/// `json`. Syntax errors are reported and nothing is printed.
pub fn run(file_path: &Path, json: bool, reporter: &Reporter) -> Result<ExitCode> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read source file: {}", file_path.display()))?;

    match render(&source, json)? {
        Ok(text) => {
            print!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Err(diagnostics) => {
            let diagnostics: Vec<_> = diagnostics
                .into_iter()
                .map(|d| d.with_file(file_path.display().to_string()))
                .collect();
            reporter.emit(&diagnostics);
            Ok(exit_code(RunStatus::StaticError))
        }
    }
}

/// Parse and render, or hand back the syntax errors
fn render(
    source: &str,
    json: bool,
) -> Result<std::result::Result<String, Vec<lox_runtime::Diagnostic>>> {
    let (program, diagnostics) = parse(source);
    if !diagnostics.is_empty() {
        return Ok(Err(diagnostics));
    }

    let text = if json {
        let mut json = VersionedProgram::new(program)
            .to_json()
            .context("Failed to serialise AST")?;
        json.push('\n');
        json
    } else {
        print_program(&program)
    };
    Ok(Ok(text))
}
