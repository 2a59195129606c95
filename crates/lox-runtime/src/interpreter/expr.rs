//! Expression evaluation

use crate::ast::*;
use crate::environment::{self, Environment};
use crate::interpreter::{Flow, Interpreter, MAX_CALL_DEPTH};
use crate::printer::print_expr;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};
use crate::value::{Callable, ErrorSite, Function, RuntimeError, Value};
use std::rc::Rc;

impl Interpreter {
    /// Evaluate an expression
    pub(super) fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal, span) => match literal {
                Literal::Nil => Ok(Value::Nil),
                Literal::Bool(b) => Ok(Value::Bool(*b)),
                Literal::Number(n) => Ok(Value::Number(*n)),
                Literal::String(s) => Ok(Value::string(s)),
                Literal::Error(msg) => Err(RuntimeError::Malformed {
                    msg: msg.clone(),
                    site: ErrorSite {
                        line: 0,
                        lexeme: String::new(),
                        span: *span,
                        context: None,
                    },
                }),
            },
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary(unary) => self.eval_unary(unary, expr),
            Expr::Binary(binary) => self.eval_binary(binary, expr),
            Expr::Logical(logical) => self.eval_logical(logical),
            Expr::Variable(var) => self.look_up_variable(var, expr),
            Expr::Assign(assign) => self.eval_assign(assign, expr),
            Expr::Call(call) => self.eval_call(call, expr),
            Expr::Function(function) => Ok(Value::Callable(Rc::new(Callable::Function(
                Function {
                    name: None,
                    declaration: Rc::clone(function),
                    closure: Rc::clone(&self.environment),
                },
            )))),
            Expr::IfExpr(ifx) => {
                if self.evaluate(&ifx.condition)?.is_truthy() {
                    self.evaluate(&ifx.then_branch)
                } else {
                    self.evaluate(&ifx.else_branch)
                }
            }
        }
    }

    fn eval_unary(&mut self, unary: &UnaryExpr, expr: &Expr) -> Result<Value, RuntimeError> {
        let operand = self.evaluate(&unary.operand)?;

        match (unary.operator.kind, operand) {
            (TokenKind::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
            (TokenKind::Minus, _) => Err(type_error(
                "Operand must be a number.",
                &unary.operator,
                expr,
            )),
            (TokenKind::Bang, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (TokenKind::Bang, _) => Err(type_error(
                "Operand must be a boolean.",
                &unary.operator,
                expr,
            )),
            (kind, _) => Err(malformed(
                format!("unknown unary operator {:?}", kind),
                &unary.operator,
            )),
        }
    }

    fn eval_binary(&mut self, binary: &BinaryExpr, expr: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        let numbers = |left: &Value, right: &Value| match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(type_error("Operands must be numbers.", operator, expr)),
        };

        match operator.kind {
            TokenKind::Comma => Ok(right),
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => {
                    Ok(Value::string(format!("{}{}", a, b)))
                }
                _ => Err(type_error(
                    "Operands must be two numbers or two strings.",
                    operator,
                    expr,
                )),
            },
            TokenKind::Minus => numbers(&left, &right).map(|(a, b)| Value::Number(a - b)),
            TokenKind::Star => numbers(&left, &right).map(|(a, b)| Value::Number(a * b)),
            // Division by zero follows IEEE 754
            TokenKind::Slash => numbers(&left, &right).map(|(a, b)| Value::Number(a / b)),
            TokenKind::Greater => numbers(&left, &right).map(|(a, b)| Value::Bool(a > b)),
            TokenKind::GreaterEqual => numbers(&left, &right).map(|(a, b)| Value::Bool(a >= b)),
            TokenKind::Less => numbers(&left, &right).map(|(a, b)| Value::Bool(a < b)),
            TokenKind::LessEqual => numbers(&left, &right).map(|(a, b)| Value::Bool(a <= b)),
            TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
            TokenKind::BangEqual => Ok(Value::Bool(left != right)),
            kind => Err(malformed(
                format!("unknown binary operator {:?}", kind),
                operator,
            )),
        }
    }

    /// `and` / `or` short-circuit and yield an operand, not a bool
    fn eval_logical(&mut self, logical: &BinaryExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(&logical.left)?;

        let short_circuit = match logical.operator.kind {
            TokenKind::Or => left.is_truthy(),
            _ => !left.is_truthy(),
        };
        if short_circuit {
            return Ok(left);
        }

        self.evaluate(&logical.right)
    }

    fn look_up_variable(&self, var: &VariableExpr, expr: &Expr) -> Result<Value, RuntimeError> {
        let name = &var.name.lexeme;
        let value = match self.resolutions.get(var.id) {
            Some(distance) => environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        };

        value.ok_or_else(|| RuntimeError::UnassignedVariable {
            name: name.clone(),
            site: site(&var.name, expr),
        })
    }

    fn eval_assign(&mut self, assign: &AssignExpr, expr: &Expr) -> Result<Value, RuntimeError> {
        let value = self.evaluate(&assign.value)?;
        let name = &assign.name.lexeme;

        let assigned = match self.resolutions.get(assign.id) {
            Some(distance) => {
                environment::assign_at(&self.environment, distance, name, value.clone())
            }
            None => self.globals.borrow_mut().assign(name, value.clone()),
        };

        if !assigned {
            return Err(RuntimeError::UndefinedVariable {
                name: name.clone(),
                site: site(&assign.name, expr),
            });
        }
        Ok(value)
    }

    fn eval_call(&mut self, call: &CallExpr, expr: &Expr) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(&call.callee)?;

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.evaluate(arg)?);
        }

        let Value::Callable(callable) = callee else {
            return Err(RuntimeError::NotCallable {
                site: site(&call.paren, expr),
            });
        };

        if args.len() != callable.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: callable.arity(),
                got: args.len(),
                site: site(&call.paren, expr),
            });
        }

        tracing::trace!(callee = %callable, args = args.len(), line = call.paren.line, "call");

        match callable.as_ref() {
            Callable::Function(function) => {
                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::StackOverflow {
                        site: site(&call.paren, expr),
                    });
                }
                self.call_depth += 1;
                let result = self.call_function(function, args);
                self.call_depth -= 1;
                result
            }
            Callable::Native(native) => {
                (native.func)(&args).map_err(|source| RuntimeError::Native {
                    source,
                    site: site(&call.paren, expr),
                })
            }
        }
    }

    /// Run a user function in a fresh frame enclosed by its closure
    fn call_function(&mut self, function: &Function, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let mut frame = Environment::with_enclosing(Rc::clone(&function.closure));
        for (param, arg) in function.declaration.params.iter().zip(args) {
            frame.define(param.lexeme.clone(), Some(arg));
        }

        let flow = ensure_sufficient_stack(|| {
            self.execute_block(&function.declaration.body, frame.into_ref())
        })?;
        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break => Ok(Value::Nil),
        }
    }
}

/// Locate an error at `token`, quoting the expression it belongs to
fn site(token: &Token, expr: &Expr) -> ErrorSite {
    ErrorSite {
        line: token.line,
        lexeme: token.lexeme.clone(),
        span: token.span,
        context: Some(print_expr(expr)),
    }
}

fn type_error(msg: &str, token: &Token, expr: &Expr) -> RuntimeError {
    RuntimeError::TypeError {
        msg: msg.to_string(),
        site: site(token, expr),
    }
}

fn malformed(msg: String, token: &Token) -> RuntimeError {
    RuntimeError::Malformed {
        msg,
        site: ErrorSite {
            line: token.line,
            lexeme: token.lexeme.clone(),
            span: token.span,
            context: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::Interpreter;
    use crate::lexer::Lexer;
    use crate::output::SharedBuffer;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::value::RuntimeError;

    fn eval(source: &str) -> Result<String, RuntimeError> {
        let buffer = SharedBuffer::new();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
        let (tokens, _) = Lexer::new(source).tokenize();
        let (program, diagnostics) = Parser::new(tokens).parse();
        assert!(diagnostics.is_empty(), "parse errors: {:?}", diagnostics);
        let (resolutions, diagnostics) = Resolver::new().resolve(&program);
        assert!(diagnostics.is_empty(), "resolve errors: {:?}", diagnostics);
        interpreter.add_resolutions(resolutions);
        interpreter.interpret(&program)?;
        Ok(buffer.contents())
    }

    fn print(expr: &str) -> String {
        eval(&format!("print {};", expr)).expect("evaluates")
    }

    fn error_message(source: &str) -> String {
        eval(source).expect_err("should fail").to_string()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(print("1 + 2 * 3"), "7\n");
        assert_eq!(print("(1 + 2) * 3"), "9\n");
        assert_eq!(print("10 / 4"), "2.5\n");
        assert_eq!(print("-(3 - 5)"), "2\n");
        assert_eq!(print("5 / 0"), "Infinity\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(print("\"a\" + \"b\""), "ab\n");
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_eq!(print("1 < 2"), "true\n");
        assert_eq!(print("2 <= 1"), "false\n");
        assert_eq!(print("1 == 1"), "true\n");
        assert_eq!(print("nil == false"), "false\n");
        assert_eq!(print("\"a\" != \"a\""), "false\n");
    }

    #[test]
    fn test_logical_returns_operand() {
        assert_eq!(print("nil or \"x\""), "x\n");
        assert_eq!(print("0 and 1"), "0\n");
        assert_eq!(print("1 and 2"), "2\n");
    }

    #[test]
    fn test_logical_short_circuits() {
        let output = eval("var a = 1; true or (a = 2); false and (a = 3); print a;");
        assert_eq!(output.expect("evaluates"), "1\n");
    }

    #[test]
    fn test_sequence_yields_right() {
        assert_eq!(print("(1, 2, 3)"), "3\n");
        assert_eq!(eval("var a = 0; print (a = 5, a + 1);").expect("evaluates"), "6\n");
    }

    #[test]
    fn test_ifx() {
        assert_eq!(print("ifx true 1 2"), "1\n");
        assert_eq!(print("ifx 0 1 2"), "2\n");
        // Stacked conditions pair with branches in order
        assert_eq!(print("ifx false ifx true 1 2 3"), "2\n");
        assert_eq!(print("ifx true ifx false 1 2 3"), "1\n");
        assert_eq!(print("ifx false ifx false 1 2 3"), "3\n");
    }

    #[test]
    fn test_ifx_evaluates_one_branch() {
        let output = eval("var a = 0; ifx true a = 1 a = 2; print a;");
        assert_eq!(output.expect("evaluates"), "1\n");
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(error_message("-\"a\";"), "Operand must be a number.");
        assert_eq!(error_message("!1;"), "Operand must be a boolean.");
        assert_eq!(
            error_message("1 + \"a\";"),
            "Operands must be two numbers or two strings."
        );
        assert_eq!(error_message("1 < nil;"), "Operands must be numbers.");
    }

    #[test]
    fn test_error_site_context() {
        let err = eval("print 1 + (2 * nil);").expect_err("should fail");
        let site = err.site();
        assert_eq!(site.lexeme, "*");
        assert_eq!(site.context.as_deref(), Some("2 * nil"));
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(
            error_message("fun f(a) {} f(1, 2);"),
            "Expected 1 arguments but got 2."
        );
        assert_eq!(
            error_message("\"f\"();"),
            "Can only call functions and classes."
        );
        assert_eq!(
            error_message("sleep(\"x\");"),
            "sleep() requires a number, got string."
        );
    }

    #[test]
    fn test_unassigned_and_undefined() {
        assert_eq!(
            error_message("var a; print a;"),
            "Variable 'a' used before assignment."
        );
        assert_eq!(
            error_message("print nope;"),
            "Variable 'nope' used before assignment."
        );
        assert_eq!(error_message("nope = 1;"), "Undefined variable 'nope'.");
    }
}
