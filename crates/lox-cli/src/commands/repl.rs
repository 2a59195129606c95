//! REPL command implementation

use super::Reporter;
use crate::config::Config;
use anyhow::Result;
use lox_runtime::{parse, print_program, ReplCore};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

/// What the loop should do after a line of input
#[derive(Debug, PartialEq)]
enum Action {
    Quit,
    Reset,
    Help,
    /// Print the parsed form of the given code
    Ast(String),
    Eval(String),
    Skip,
}

fn classify(line: &str) -> Action {
    let trimmed = line.trim();
    match trimmed {
        "" => Action::Skip,
        ":quit" | ":q" => Action::Quit,
        ":reset" => Action::Reset,
        ":help" | ":h" => Action::Help,
        _ => match trimmed.strip_prefix(":ast") {
            Some(code) => Action::Ast(code.trim().to_string()),
            None => Action::Eval(line.to_string()),
        },
    }
}

/// Run the interactive REPL
///
/// Each line is a complete program; definitions persist until `:reset`.
/// If `no_history` is true, history is neither loaded nor saved.
pub fn run(no_history: bool, config: &Config, reporter: &Reporter) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut repl = ReplCore::new();

    // Load history from file (unless disabled)
    let history_path = config.get_history_path();
    if !no_history {
        if let Some(ref path) = history_path {
            let _ = rl.load_history(path); // Ignore errors if file doesn't exist
        }
    }

    println!("Lox v{} REPL", lox_runtime::VERSION);
    println!("Type statements or expressions, :help for commands, :quit to exit");

    loop {
        match rl.readline("> ") {
            Ok(line) => match classify(&line) {
                Action::Skip => {}
                Action::Quit => break,
                Action::Reset => {
                    repl.reset();
                    println!("REPL state reset");
                }
                Action::Help => print_help(),
                Action::Ast(code) => {
                    let _ = rl.add_history_entry(&line);
                    let (program, diagnostics) = parse(&code);
                    if diagnostics.is_empty() {
                        print!("{}", print_program(&program));
                    } else {
                        reporter.emit(&diagnostics);
                    }
                }
                Action::Eval(code) => {
                    let _ = rl.add_history_entry(&line);
                    let result = repl.eval_line(&code);
                    print!("{}", result.stdout);
                    io::stdout().flush()?;
                    reporter.emit(&result.diagnostics);
                }
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                println!("Use :quit or :q to exit");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    // Save history to file (unless disabled)
    if !no_history {
        if let Some(path) = history_path {
            // Create directory if it doesn't exist
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(err) = rl.save_history(&path) {
                tracing::debug!(%err, path = %path.display(), "could not save history");
            }
        }
    }

    Ok(())
}

/// Print help information
fn print_help() {
    println!("Lox REPL Commands:");
    println!("  :quit, :q         Exit the REPL");
    println!("  :reset            Forget all variables and functions");
    println!("  :help, :h         Show this help message");
    println!("  :ast <code>       Show how <code> parses");
    println!();
    println!("Bare expression statements print their value.");
    println!("Examples:");
    println!("  > var x = 42;");
    println!("  > fun double(n) {{ return n * 2; }}");
    println!("  > double(x);");
    println!("  > ifx x > 40 \"big\" \"small\";");
}
