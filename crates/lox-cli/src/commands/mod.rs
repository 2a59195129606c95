//! Subcommand implementations and shared output helpers

pub mod ast;
pub mod repl;
pub mod run;

use crate::config::DiagnosticStyle;
use lox_runtime::{ColorMode, Diagnostic, DiagnosticFormatter, RunStatus};
use std::process::ExitCode;

/// Command line usage error (sysexits.h)
pub const EX_USAGE: u8 = 64;
/// Input file could not be read (sysexits.h)
pub const EX_IOERR: u8 = 74;

/// Exit code for how a run ended
pub fn exit_code(status: RunStatus) -> ExitCode {
    ExitCode::from(status.exit_code() as u8)
}

/// Writes diagnostics to stderr in the configured style
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    style: DiagnosticStyle,
    color: ColorMode,
}

impl Reporter {
    pub fn new(style: DiagnosticStyle, no_color: bool) -> Self {
        let color = if no_color {
            ColorMode::Never
        } else {
            ColorMode::Auto
        };
        Self { style, color }
    }

    pub fn emit(&self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            match self.style {
                DiagnosticStyle::Classic => eprintln!("{}", diag.to_report_string()),
                DiagnosticStyle::Human => DiagnosticFormatter::new(self.color).emit(diag),
                DiagnosticStyle::Json => match diag.to_json_compact() {
                    Ok(json) => eprintln!("{}", json),
                    Err(err) => tracing::warn!(%err, "failed to serialise diagnostic"),
                },
            }
        }
    }
}

