//! AST printer
//!
//! Renders syntax trees back into source text. Explicit groupings keep their
//! parentheses and other parentheses appear only where precedence needs them,
//! so the output parses back to an equivalent tree. Operands of `ifx` are
//! juxtaposed, which rules out wrapping every compound expression: in
//! `ifx c (a + b) d` the `(` would start a call of `c`.

use crate::ast::*;
use crate::stack::ensure_sufficient_stack;
use crate::token::TokenKind;
use crate::value::format_number;

const INDENT: &str = "    ";

/// Binding strength, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Sequence,
    Ifx,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::Sequence => Precedence::Ifx,
            Precedence::Ifx => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }

    fn of_operator(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Comma => Precedence::Sequence,
            TokenKind::Or => Precedence::Or,
            TokenKind::And => Precedence::And,
            TokenKind::EqualEqual | TokenKind::BangEqual => Precedence::Equality,
            TokenKind::Greater | TokenKind::GreaterEqual | TokenKind::Less | TokenKind::LessEqual => {
                Precedence::Comparison
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            _ => Precedence::Factor,
        }
    }

    fn of_expr(expr: &Expr) -> Self {
        match expr {
            Expr::Literal(..) | Expr::Grouping(_) | Expr::Variable(_) | Expr::Function(_) => {
                Precedence::Primary
            }
            Expr::Unary(_) => Precedence::Unary,
            Expr::Binary(b) | Expr::Logical(b) => Precedence::of_operator(b.operator.kind),
            Expr::Assign(_) => Precedence::Assignment,
            Expr::Call(_) => Precedence::Call,
            Expr::IfExpr(_) => Precedence::Ifx,
        }
    }
}

/// Render a single expression on one line
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = AstPrinter::inline();
    printer.visit_expr(expr, Precedence::Sequence);
    printer.output
}

/// Render a statement, indenting nested blocks
pub fn print_stmt(stmt: &Stmt) -> String {
    let mut printer = AstPrinter::new();
    printer.visit_stmt(stmt);
    printer.output
}

/// Render a whole program, one top-level statement per line
pub fn print_program(program: &Program) -> String {
    let mut printer = AstPrinter::new();
    printer.visit_program(program);
    printer.output
}

/// Source renderer over the AST
pub struct AstPrinter {
    output: String,
    indent_level: usize,
    /// Keep blocks on a single line
    inline: bool,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            inline: false,
        }
    }

    /// A printer that never breaks lines
    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::new()
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(INDENT);
        }
    }

    pub fn visit_program(&mut self, program: &Program) {
        for stmt in &program.statements {
            self.write_indent();
            self.visit_stmt(stmt);
            self.write("\n");
        }
    }

    pub fn visit_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| self.visit_stmt_inner(stmt))
    }

    fn visit_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr) => {
                self.visit_expr(expr, Precedence::Sequence);
                self.write(";");
            }
            Stmt::Print(expr) => {
                self.write("print ");
                self.visit_expr(expr, Precedence::Sequence);
                self.write(";");
            }
            Stmt::Var(decl) => {
                self.write("var ");
                self.write(&decl.name.lexeme);
                if let Some(init) = &decl.initializer {
                    self.write(" = ");
                    self.visit_expr(init, Precedence::Sequence);
                }
                self.write(";");
            }
            Stmt::Block(block) => self.visit_block(&block.statements),
            Stmt::If(stmt) => {
                self.write("if ");
                self.visit_expr(&stmt.condition, Precedence::Sequence);
                self.write(" ");
                self.visit_block(&stmt.then_branch.statements);
                if let Some(else_branch) = &stmt.else_branch {
                    self.write(" else ");
                    self.visit_block(&else_branch.statements);
                }
            }
            Stmt::While(stmt) => {
                self.write("while ");
                self.visit_expr(&stmt.condition, Precedence::Sequence);
                self.write(" ");
                self.visit_block(&stmt.body.statements);
            }
            Stmt::Function(decl) => {
                self.write("fun ");
                self.write(&decl.name.lexeme);
                self.visit_function(&decl.function);
            }
            Stmt::Return(stmt) => {
                self.write("return");
                if let Some(value) = &stmt.value {
                    self.write(" ");
                    self.visit_expr(value, Precedence::Sequence);
                }
                self.write(";");
            }
            Stmt::Break(_) => self.write("break;"),
            Stmt::Continue(_) => self.write("continue;"),
        }
    }

    fn visit_block(&mut self, statements: &[Stmt]) {
        if statements.is_empty() {
            self.write("{}");
            return;
        }

        if self.inline {
            self.write("{ ");
            for (i, stmt) in statements.iter().enumerate() {
                if i > 0 {
                    self.write(" ");
                }
                self.visit_stmt(stmt);
            }
            self.write(" }");
            return;
        }

        self.write("{\n");
        self.indent_level += 1;
        for stmt in statements {
            self.write_indent();
            self.visit_stmt(stmt);
            self.write("\n");
        }
        self.indent_level -= 1;
        self.write_indent();
        self.write("}");
    }

    /// Parameter list and body, shared by declarations and literals
    fn visit_function(&mut self, function: &FunctionExpr) {
        self.write("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&param.lexeme);
        }
        self.write(") ");
        self.visit_block(&function.body);
    }

    /// Render `expr`, parenthesised if it binds looser than `min`
    fn visit_expr(&mut self, expr: &Expr, min: Precedence) {
        ensure_sufficient_stack(|| self.visit_expr_inner(expr, min))
    }

    fn visit_expr_inner(&mut self, expr: &Expr, min: Precedence) {
        let wrap = Precedence::of_expr(expr) < min;
        if wrap {
            self.write("(");
        }

        match expr {
            Expr::Literal(literal, _) => self.visit_literal(literal),
            Expr::Grouping(inner) => {
                self.write("(");
                self.visit_expr(inner, Precedence::Sequence);
                self.write(")");
            }
            Expr::Unary(unary) => {
                self.write(&unary.operator.lexeme);
                self.visit_expr(&unary.operand, Precedence::Unary);
            }
            Expr::Binary(binary) | Expr::Logical(binary) => self.visit_binary(binary),
            Expr::Variable(var) => self.write(&var.name.lexeme),
            Expr::Assign(assign) => {
                self.write(&assign.name.lexeme);
                self.write(" = ");
                self.visit_expr(&assign.value, Precedence::Ifx);
            }
            Expr::Call(call) => {
                self.visit_expr(&call.callee, Precedence::Call);
                self.write("(");
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.visit_expr(arg, Precedence::Ifx);
                }
                self.write(")");
            }
            Expr::Function(function) => {
                self.write("fun ");
                self.visit_function(function);
            }
            Expr::IfExpr(ifx) => self.visit_ifx(ifx),
        }

        if wrap {
            self.write(")");
        }
    }

    /// Render an `ifx` chain in stacked form
    ///
    /// Every `ifx` in the else position joins the chain, so an `ifx a 1 _`
    /// whose else is `ifx b 2 3` prints as `ifx a ifx b 1 2 3`. Only the
    /// second and later branches may themselves start with `ifx`; the
    /// first would be read as one more condition.
    fn visit_ifx(&mut self, ifx: &IfExpr) {
        let mut arms = vec![ifx];
        let mut last = ifx.else_branch.as_ref();
        while let Expr::IfExpr(next) = last {
            arms.push(next);
            last = next.else_branch.as_ref();
        }

        for arm in &arms {
            self.write("ifx ");
            self.visit_expr(&arm.condition, Precedence::Assignment);
            self.write(" ");
        }
        for (i, arm) in arms.iter().enumerate() {
            let min = if i == 0 {
                Precedence::Assignment
            } else {
                Precedence::Ifx
            };
            self.visit_expr(&arm.then_branch, min);
            self.write(" ");
        }
        self.visit_expr(last, Precedence::Ifx);
    }

    /// Left-associative: the right operand must bind strictly tighter
    fn visit_binary(&mut self, binary: &BinaryExpr) {
        let precedence = Precedence::of_operator(binary.operator.kind);
        self.visit_expr(&binary.left, precedence);
        if binary.operator.kind == TokenKind::Comma {
            self.write(", ");
        } else {
            self.write(" ");
            self.write(&binary.operator.lexeme);
            self.write(" ");
        }
        self.visit_expr(&binary.right, precedence.next());
    }

    fn visit_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Nil => self.write("nil"),
            Literal::Bool(b) => self.write(if *b { "true" } else { "false" }),
            Literal::Number(n) => self.write(&format_number(*n)),
            Literal::String(s) => {
                self.write("\"");
                self.write(s);
                self.write("\"");
            }
            Literal::Error(msg) => {
                self.write("<error: ");
                self.write(msg);
                self.write(">");
            }
        }
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}
