//! AST interpreter (tree-walking)
//!
//! Direct AST evaluation over a chain of shared environment frames.
//! Supports:
//! - Expression evaluation (operators, `ifx`, sequences, calls)
//! - Statement execution with explicit break/return signalling
//! - Closures that capture their defining frame
//! - Variable access through the resolver's hop counts

mod expr;
mod stmt;

use crate::ast::{Program, Stmt};
use crate::environment::{EnvRef, Environment};
use crate::natives;
use crate::resolver::Resolutions;
use crate::value::{Callable, NativeFunction, RuntimeError, Value};
use std::io::{self, Write};
use std::rc::Rc;

/// Deepest allowed nesting of function calls
///
/// The evaluator grows its own stack, so this only stops runaway
/// recursion before it exhausts memory.
pub const MAX_CALL_DEPTH: usize = 10_000;

/// How top-level expression statements are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Whole files: expression statements are evaluated for effect
    #[default]
    Batch,
    /// Interactive lines: a bare expression statement prints its value
    Repl,
}

/// Outcome of executing a statement
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    Normal,
    Break,
    Return(Value),
}

/// Interpreter state
pub struct Interpreter {
    /// Outermost frame, home of natives and top-level declarations
    globals: EnvRef,
    /// Frame the current statement runs in
    environment: EnvRef,
    /// Hop counts for resolved local accesses
    resolutions: Resolutions,
    output: Box<dyn Write>,
    mode: RunMode,
    call_depth: usize,
}

impl Interpreter {
    /// Create an interpreter that prints to stdout
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Create an interpreter that prints to `output`
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::new().into_ref();
        let mut interpreter = Self {
            environment: Rc::clone(&globals),
            globals,
            resolutions: Resolutions::new(),
            output,
            mode: RunMode::Batch,
            call_depth: 0,
        };
        for native in natives::builtins() {
            interpreter.define_native(native);
        }
        interpreter
    }

    /// Bind a host function in the global frame
    pub fn define_native(&mut self, native: NativeFunction) {
        let name = native.name.clone();
        self.define_global(name, Value::Callable(Rc::new(Callable::Native(native))));
    }

    /// Bind a value in the global frame
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.borrow_mut().define(name, Some(value));
    }

    /// Read a global binding, `None` if unbound or unassigned
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name)
    }

    /// Names currently bound in the global frame
    pub fn global_names(&self) -> Vec<String> {
        self.globals.borrow().names()
    }

    pub fn set_mode(&mut self, mode: RunMode) {
        self.mode = mode;
    }

    /// Merge hop counts produced by a resolver pass
    pub fn add_resolutions(&mut self, resolutions: Resolutions) {
        self.resolutions.extend(resolutions);
    }

    /// Execute a resolved program
    ///
    /// Stops at the first runtime error. Bindings made before the error
    /// stay in place.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        // A previous run may have failed inside a block
        self.environment = Rc::clone(&self.globals);
        self.call_depth = 0;

        let result = self.run_statements(&program.statements);
        self.flush();
        result
    }

    fn run_statements(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            match (self.mode, statement) {
                (RunMode::Repl, Stmt::Expression(expr)) => {
                    let value = self.evaluate(expr)?;
                    self.write_line(&value);
                }
                _ => {
                    // Break and return cannot reach the top level of a valid program
                    self.execute(statement)?;
                }
            }
        }
        Ok(())
    }

    /// Run `statements` in `environment`, then restore the current frame
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: EnvRef,
    ) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match self.execute(statement)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Write a value and a newline to the program output
    ///
    /// Output failures do not stop the program.
    pub(crate) fn write_line(&mut self, value: &Value) {
        if let Err(e) = writeln!(self.output, "{}", value) {
            tracing::warn!(error = %e, "failed to write program output");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.output.flush() {
            tracing::warn!(error = %e, "failed to flush program output");
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
