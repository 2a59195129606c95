use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod logging;

use commands::Reporter;
use config::{Config, DiagnosticStyle};

/// Lox interpreter with `ifx` conditional expressions.
///
/// Runs Lox scripts, starts an interactive prompt, or shows how a script
/// parses.
///
/// EXAMPLES:
///     lox main.lox                 Run a script
///     lox                          Start the REPL
///     lox ast main.lox --json      Dump the syntax tree as JSON
///
/// ENVIRONMENT VARIABLES:
///     LOX_DIAGNOSTICS   classic (default), human or json
///     LOX_NO_HISTORY    Set to disable REPL history
///     LOX_HISTORY_FILE  REPL history location (default ~/.lox/history)
///     LOX_LOG           Tracing filter, e.g. lox_runtime=debug
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "lox")]
#[command(version)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Script to run; without one the REPL starts
    file: Option<PathBuf>,

    /// Diagnostic format
    #[arg(long, global = true, value_enum, env = "LOX_DIAGNOSTICS", ignore_case = true)]
    diagnostics: Option<DiagnosticStyle>,

    /// Log pipeline events to stderr (repeat for more)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Lox source file
    ///
    /// EXAMPLES:
    ///     lox run main.lox
    ///     lox run main.lox --diagnostics json
    #[command(visible_alias = "r")]
    Run {
        /// Path to the Lox source file
        file: PathBuf,
    },

    /// Start an interactive REPL
    ///
    /// REPL COMMANDS:
    ///     :help, :h      Show help
    ///     :quit, :q      Exit REPL
    ///     :reset         Clear all definitions
    ///     :ast <code>    Show how code parses
    Repl {
        /// Disable history persistence (also LOX_NO_HISTORY)
        #[arg(long)]
        no_history: bool,
    },

    /// Print the parsed program
    ///
    /// Shows the program as source text after desugaring, or as JSON.
    Ast {
        /// Path to the Lox source file
        file: PathBuf,
        /// Output the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     lox completions bash > ~/.local/share/bash-completion/completions/lox
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(commands::EX_USAGE),
            };
        }
    };
    let config = Config::from_env();
    logging::init(cli.verbose, config.log.as_deref());

    match dispatch(cli, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(commands::EX_IOERR)
        }
    }
}

fn dispatch(cli: Cli, config: &Config) -> Result<ExitCode> {
    let style = cli.diagnostics.unwrap_or_default();
    let reporter = Reporter::new(style, config.no_color);

    match (cli.command, cli.file) {
        (Some(Commands::Run { file }), _) | (None, Some(file)) => {
            commands::run::run(&file, &reporter)
        }
        (Some(Commands::Repl { no_history }), _) => {
            let disable_history = no_history || config.no_history;
            commands::repl::run(disable_history, config, &reporter)?;
            Ok(ExitCode::SUCCESS)
        }
        (None, None) => {
            commands::repl::run(config.no_history, config, &reporter)?;
            Ok(ExitCode::SUCCESS)
        }
        (Some(Commands::Ast { file, json }), _) => commands::ast::run(&file, json, &reporter),
        (Some(Commands::Completions { shell }), _) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
