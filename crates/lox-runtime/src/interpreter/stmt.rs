//! Statement execution

use crate::ast::*;
use crate::environment::Environment;
use crate::interpreter::{Flow, Interpreter};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Callable, ErrorSite, Function, RuntimeError, Value};
use std::rc::Rc;

impl Interpreter {
    /// Execute a statement
    pub(super) fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        ensure_sufficient_stack(|| self.execute_inner(stmt))
    }

    fn execute_inner(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                self.write_line(&value);
                Ok(Flow::Normal)
            }
            Stmt::Var(decl) => self.exec_var(decl),
            Stmt::Block(block) => self.exec_block(block),
            Stmt::If(stmt) => self.exec_if(stmt),
            Stmt::While(stmt) => self.exec_while(stmt),
            Stmt::Function(decl) => {
                let function = Function {
                    name: Some(decl.name.lexeme.clone()),
                    declaration: Rc::clone(&decl.function),
                    closure: Rc::clone(&self.environment),
                };
                let value = Value::Callable(Rc::new(Callable::Function(function)));
                self.environment
                    .borrow_mut()
                    .define(decl.name.lexeme.clone(), Some(value));
                Ok(Flow::Normal)
            }
            Stmt::Return(stmt) => {
                let value = match &stmt.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break(_) => Ok(Flow::Break),
            // The resolver rejects `continue`; only unresolved trees get here
            Stmt::Continue(keyword) => Err(RuntimeError::Malformed {
                msg: "'continue' is not supported.".to_string(),
                site: ErrorSite {
                    line: keyword.line,
                    lexeme: keyword.lexeme.clone(),
                    span: keyword.span,
                    context: None,
                },
            }),
        }
    }

    /// Declare a variable; without an initializer it stays unassigned
    fn exec_var(&mut self, decl: &VarDecl) -> Result<Flow, RuntimeError> {
        let value = match &decl.initializer {
            Some(init) => Some(self.evaluate(init)?),
            None => None,
        };
        self.environment
            .borrow_mut()
            .define(decl.name.lexeme.clone(), value);
        Ok(Flow::Normal)
    }

    /// Run a block in a new frame nested in the current one
    fn exec_block(&mut self, block: &Block) -> Result<Flow, RuntimeError> {
        let frame = Environment::with_enclosing(Rc::clone(&self.environment));
        self.execute_block(&block.statements, frame.into_ref())
    }

    fn exec_if(&mut self, stmt: &IfStmt) -> Result<Flow, RuntimeError> {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            self.exec_block(&stmt.then_branch)
        } else if let Some(else_branch) = &stmt.else_branch {
            self.exec_block(else_branch)
        } else {
            Ok(Flow::Normal)
        }
    }

    /// Loop until the condition is falsy, a `break`, or a `return`
    fn exec_while(&mut self, stmt: &WhileStmt) -> Result<Flow, RuntimeError> {
        while self.evaluate(&stmt.condition)?.is_truthy() {
            match self.exec_block(&stmt.body)? {
                Flow::Normal => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::Interpreter;
    use crate::lexer::Lexer;
    use crate::output::SharedBuffer;
    use crate::parser::Parser;
    use crate::resolver::Resolver;

    fn run(source: &str) -> String {
        let buffer = SharedBuffer::new();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
        let (tokens, _) = Lexer::new(source).tokenize();
        let (program, diagnostics) = Parser::new(tokens).parse();
        assert!(diagnostics.is_empty(), "parse errors: {:?}", diagnostics);
        let (resolutions, diagnostics) = Resolver::new().resolve(&program);
        assert!(diagnostics.is_empty(), "resolve errors: {:?}", diagnostics);
        interpreter.add_resolutions(resolutions);
        interpreter.interpret(&program).expect("runs");
        buffer.contents()
    }

    #[test]
    fn test_block_scoping() {
        let output = run("var a = 1; { var a = 2; print a; } print a;");
        assert_eq!(output, "2\n1\n");
    }

    #[test]
    fn test_if_else() {
        assert_eq!(run("if 1 { print \"yes\"; } else { print \"no\"; }"), "yes\n");
        assert_eq!(run("if nil { print \"yes\"; } else { print \"no\"; }"), "no\n");
        assert_eq!(run("if false { print 1; }"), "");
    }

    #[test]
    fn test_while_loop() {
        let output = run("var i = 0; while i < 3 { print i; i = i + 1; }");
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_for_loop() {
        let output = run("for (var i = 0; i < 3; i = i + 1) { print i; }");
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_break_exits_innermost_loop() {
        let output = run(
            "for var i = 0; i < 3; i = i + 1 {
                 for var j = 0; j < 3; j = j + 1 {
                     if j == 1 { break; }
                     print i * 10 + j;
                 }
             }",
        );
        assert_eq!(output, "0\n10\n20\n");
    }

    #[test]
    fn test_break_from_nested_block() {
        let output = run("var i = 0; while true { { i = i + 1; if i == 3 { break; } } } print i;");
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_return_unwinds_loop() {
        let output = run(
            "fun first_over(limit) {
                 var i = 0;
                 while true { if i > limit { return i; } i = i + 1; }
             }
             print first_over(4);",
        );
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_function_without_return_is_nil() {
        assert_eq!(run("fun f() {} print f();"), "nil\n");
    }

    #[test]
    fn test_closure_counter() {
        let output = run(
            "fun make() { var n = 0; fun inc() { n = n + 1; return n; } return inc; }
             var c = make(); c(); print c();",
        );
        assert_eq!(output, "2\n");
    }

    #[test]
    fn test_closures_capture_each_iteration() {
        let output = run(
            "var fs = nil;
             var gs = nil;
             for var i = 0; i < 2; i = i + 1 {
                 var j = i;
                 ifx i == 0 fs = fun () { return j; } gs = fun () { return j; };
             }
             print fs();
             print gs();",
        );
        assert_eq!(output, "0\n1\n");
    }

    #[test]
    fn test_static_scope_ignores_later_shadowing() {
        let output = run(
            "var a = \"global\";
             {
                 fun show() { print a; }
                 show();
                 var a = \"block\";
                 show();
             }",
        );
        assert_eq!(output, "global\nglobal\n");
    }

    #[test]
    fn test_function_display() {
        assert_eq!(
            run("fun f() {} print f; print fun () {}; print clock;"),
            "<fn f>\n<fn>\n<native fn clock>\n"
        );
    }
}
