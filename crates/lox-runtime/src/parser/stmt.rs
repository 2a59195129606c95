//! Statement parsing

use crate::ast::*;
use crate::diagnostic::error_codes;
use crate::parser::Parser;
use crate::token::TokenKind;
use std::rc::Rc;

impl Parser {
    /// Parse a statement
    ///
    /// `in_loop` is true when the nearest enclosing block chain belongs to
    /// a loop body, which is the only place `break` is accepted.
    pub(super) fn statement(&mut self, in_loop: bool) -> Result<Stmt, ()> {
        match self.peek().kind {
            TokenKind::For => self.for_statement(in_loop),
            TokenKind::If => self.if_statement(in_loop),
            TokenKind::While => self.while_statement(),
            TokenKind::Print => self.print_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Break => self.loop_jump(in_loop),
            TokenKind::Continue => self.loop_jump(in_loop),
            TokenKind::LeftBrace => Ok(Stmt::Block(self.block("Expected '{'.", in_loop)?)),
            _ => self.expression_statement(),
        }
    }

    /// Parse `fun name(params) { body }`; the `fun` keyword is already consumed
    pub(super) fn function_declaration(&mut self) -> Result<Stmt, ()> {
        let keyword = self.previous().clone();
        let name = self.consume(TokenKind::Identifier, "Expected function name.")?;
        let function = self.function_body(keyword)?;
        Ok(Stmt::Function(FunctionDecl {
            name,
            function: Rc::new(function),
        }))
    }

    /// Parse `var name (= expr)?;`; the `var` keyword is already consumed
    pub(super) fn var_declaration(&mut self) -> Result<Stmt, ()> {
        let name = self.consume(TokenKind::Identifier, "Expected variable name.")?;

        let initializer = if self.match_token(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenKind::Semicolon,
            "Expected ';' after variable declaration.",
        )?;
        Ok(Stmt::Var(VarDecl { name, initializer }))
    }

    /// Parse a `for` loop, desugared into a `while`
    ///
    /// `for (init; cond; incr) { body }` becomes
    /// `{ init; while (cond) { { body } incr; } }`. Parentheses are optional
    /// and a missing condition is `true`.
    fn for_statement(&mut self, in_loop: bool) -> Result<Stmt, ()> {
        let keyword = self.advance();
        let parens = self.match_token(TokenKind::LeftParen);

        let initializer = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.match_token(TokenKind::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(Literal::Bool(true), keyword.span)
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after loop condition.")?;

        let increment = if (parens && self.check(TokenKind::RightParen))
            || self.check(TokenKind::LeftBrace)
        {
            None
        } else {
            Some(self.expression()?)
        };

        if parens {
            self.consume(TokenKind::RightParen, "Unterminated '(' in for clauses.")?;
        }

        let body = self.block("Expected '{' after for clauses.", true)?;
        let body = match increment {
            Some(increment) => Block {
                statements: vec![Stmt::Block(body), Stmt::Expression(increment)],
                in_loop: true,
            },
            None => body,
        };

        let looped = Stmt::While(WhileStmt { condition, body });
        Ok(match initializer {
            Some(initializer) => Stmt::Block(Block {
                statements: vec![initializer, looped],
                in_loop,
            }),
            None => looped,
        })
    }

    fn if_statement(&mut self, in_loop: bool) -> Result<Stmt, ()> {
        self.advance(); // if
        let condition = self.expression()?;
        let then_branch = self.block("Expected '{' after if condition.", in_loop)?;

        let else_branch = if self.match_token(TokenKind::Else) {
            Some(self.block("Expected '{' after `else`.", in_loop)?)
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
        }))
    }

    fn while_statement(&mut self) -> Result<Stmt, ()> {
        self.advance(); // while
        let condition = self.expression()?;
        let body = self.block("Expected '{' after while condition.", true)?;
        Ok(Stmt::While(WhileStmt { condition, body }))
    }

    fn print_statement(&mut self) -> Result<Stmt, ()> {
        self.advance(); // print
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ()> {
        let keyword = self.advance();
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after return value.")?;
        Ok(Stmt::Return(ReturnStmt { keyword, value }))
    }

    /// Parse `break;` or `continue;`, both rejected outside a loop body
    fn loop_jump(&mut self, in_loop: bool) -> Result<Stmt, ()> {
        let keyword = self.advance();
        if !in_loop {
            self.error_at(
                &keyword,
                error_codes::BREAK_OUTSIDE_LOOP,
                &format!("Unexpected `{}` outside of loop.", keyword.lexeme),
            );
            return Err(());
        }
        self.consume(
            TokenKind::Semicolon,
            &format!("Expected ';' after {} statement.", keyword.lexeme),
        )?;
        Ok(if keyword.kind == TokenKind::Break {
            Stmt::Break(keyword)
        } else {
            Stmt::Continue(keyword)
        })
    }

    fn expression_statement(&mut self) -> Result<Stmt, ()> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    /// Parse a brace-delimited block
    pub(super) fn block(&mut self, message: &str, in_loop: bool) -> Result<Block, ()> {
        self.consume(TokenKind::LeftBrace, message)?;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration(in_loop));
        }

        self.consume(TokenKind::RightBrace, "Expected '}' after block.")?;
        Ok(Block {
            statements,
            in_loop,
        })
    }
}
