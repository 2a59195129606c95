//! Static scope resolution
//!
//! Walks the program once before execution and records, for every variable
//! reference and assignment that names a local, how many scope frames out
//! the binding lives. Names found in no local scope get no entry and are
//! looked up in the global frame at runtime.

use crate::ast::*;
use crate::diagnostic::{error_codes, Anchor, Diagnostic};
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;
use std::collections::{HashMap, HashSet};

/// Side table from variable node to hop count (0 = innermost frame)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolutions {
    depths: HashMap<NodeId, usize>,
}

impl Resolutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hop count recorded for a node, `None` for globals
    pub fn get(&self, id: NodeId) -> Option<usize> {
        self.depths.get(&id).copied()
    }

    pub fn insert(&mut self, id: NodeId, depth: usize) {
        self.depths.insert(id, depth);
    }

    /// Merge another table in (REPL lines accumulate into one table)
    pub fn extend(&mut self, other: Resolutions) {
        self.depths.extend(other.depths);
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

/// Resolver state: a stack of local scopes holding declared names
pub struct Resolver {
    scopes: Vec<HashSet<String>>,
    /// Number of function bodies currently being resolved
    function_depth: usize,
    resolutions: Resolutions,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            function_depth: 0,
            resolutions: Resolutions::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Resolve a program
    ///
    /// Errors never stop the walk; every statement is visited.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(&mut self, program: &Program) -> (Resolutions, Vec<Diagnostic>) {
        for stmt in &program.statements {
            self.resolve_stmt(stmt);
        }

        tracing::debug!(
            locals = self.resolutions.len(),
            errors = self.diagnostics.len(),
            "resolved program"
        );
        (
            std::mem::take(&mut self.resolutions),
            std::mem::take(&mut self.diagnostics),
        )
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.resolve_stmt_inner(stmt))
    }

    fn resolve_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Var(decl) => {
                // Defined eagerly: the initializer already sees the name
                self.define(&decl.name);
                if let Some(init) = &decl.initializer {
                    self.resolve_expr(init);
                }
            }
            Stmt::Block(block) => self.resolve_block(block),
            Stmt::If(stmt) => {
                self.resolve_expr(&stmt.condition);
                self.resolve_block(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.resolve_block(else_branch);
                }
            }
            Stmt::While(stmt) => {
                self.resolve_expr(&stmt.condition);
                self.resolve_block(&stmt.body);
            }
            Stmt::Function(decl) => {
                self.define(&decl.name);
                self.resolve_function(&decl.function);
            }
            Stmt::Return(stmt) => {
                if self.function_depth == 0 {
                    self.error_at(
                        &stmt.keyword,
                        error_codes::RETURN_OUTSIDE_FUNCTION,
                        "Can't return from top-level code.",
                    );
                }
                if let Some(value) = &stmt.value {
                    self.resolve_expr(value);
                }
            }
            Stmt::Break(_) => {}
            Stmt::Continue(keyword) => {
                self.error_at(
                    keyword,
                    error_codes::CONTINUE_UNSUPPORTED,
                    "'continue' is not supported.",
                );
            }
        }
    }

    fn resolve_block(&mut self, block: &Block) {
        self.scopes.push(HashSet::new());
        for stmt in &block.statements {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    /// Parameters and body-level locals share one scope, as they share one
    /// frame when the function is called
    fn resolve_function(&mut self, function: &FunctionExpr) {
        self.function_depth += 1;
        self.scopes.push(HashSet::new());
        for param in &function.params {
            self.define(param);
        }
        for stmt in &function.body {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
        self.function_depth -= 1;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        ensure_sufficient_stack(|| self.resolve_expr_inner(expr))
    }

    fn resolve_expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(..) => {}
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Unary(unary) => self.resolve_expr(&unary.operand),
            Expr::Binary(binary) | Expr::Logical(binary) => {
                self.resolve_expr(&binary.left);
                self.resolve_expr(&binary.right);
            }
            Expr::Variable(var) => self.resolve_local(var.id, &var.name),
            Expr::Assign(assign) => {
                self.resolve_expr(&assign.value);
                self.resolve_local(assign.id, &assign.name);
            }
            Expr::Call(call) => {
                self.resolve_expr(&call.callee);
                for arg in &call.args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Function(function) => self.resolve_function(function),
            Expr::IfExpr(ifx) => {
                self.resolve_expr(&ifx.condition);
                self.resolve_expr(&ifx.then_branch);
                self.resolve_expr(&ifx.else_branch);
            }
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone());
        }
    }

    /// Record the hop count of the innermost scope declaring `name`
    fn resolve_local(&mut self, id: NodeId, name: &Token) {
        let found = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains(&name.lexeme));
        if let Some(depth) = found {
            self.resolutions.insert(id, depth);
        }
    }

    fn error_at(&mut self, token: &Token, code: &str, message: &str) {
        self.diagnostics.push(
            Diagnostic::error_with_code(code, message, token.span)
                .with_line(token.line)
                .with_anchor(Anchor::AtLexeme(token.lexeme.clone()))
                .with_label("resolution error"),
        );
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}
