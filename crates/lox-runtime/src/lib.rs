//! Lox Runtime - Core language implementation
//!
//! This library provides a tree-walking interpreter for Lox with the `ifx`
//! conditional expression and the `,` sequence operator:
//! - Lexical analysis and parsing with error recovery
//! - Static resolution of local variable accesses
//! - Interpretation with closures and host natives
//! - An AST printer that renders trees back to source

/// Lox runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ast;
pub mod diagnostic;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod natives;
pub mod output;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod resolver;
pub mod runtime;
pub mod span;
pub mod stack;
pub mod token;
pub mod value;

// Re-export commonly used types
pub use ast::{Program, VersionedProgram, AST_VERSION};
pub use diagnostic::formatter::{ColorMode, DiagnosticFormatter};
pub use diagnostic::{error_codes, Diagnostic, DiagnosticLevel, DIAG_VERSION};
pub use interpreter::Interpreter;
pub use lexer::Lexer;
pub use output::SharedBuffer;
pub use parser::Parser;
pub use printer::{print_expr, print_program, print_stmt, AstPrinter};
pub use repl::{ReplCore, ReplResult};
pub use resolver::{Resolutions, Resolver};
pub use runtime::{parse, Lox, RunMode, RunOutcome, RunStatus};
pub use span::Span;
pub use token::{Token, TokenKind};
pub use value::{NativeError, NativeFunction, RuntimeError, Value};
