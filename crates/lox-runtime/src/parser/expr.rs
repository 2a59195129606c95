//! Expression parsing
//!
//! Precedence, lowest to highest: sequence (`,`), `ifx`, assignment, `or`,
//! `and`, equality, comparison, term, factor, unary, call, primary.

use crate::ast::*;
use crate::diagnostic::error_codes;
use crate::parser::{Parser, MAX_ARITY};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};
use std::rc::Rc;

impl Parser {
    /// Parse a full expression, including the `,` sequence operator
    pub(super) fn expression(&mut self) -> Result<Expr, ()> {
        ensure_sufficient_stack(|| self.expression_inner())
    }

    fn expression_inner(&mut self) -> Result<Expr, ()> {
        let mut expr = self.if_expression()?;

        while self.match_token(TokenKind::Comma) {
            let operator = self.previous().clone();
            let right = self.if_expression()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    /// Parse the prefix conditional `ifx C1 ... ifx Cn E1 ... En E(n+1)`
    ///
    /// Conditions are collected left to right, then `n + 1` branch
    /// expressions follow. The tree is built right to left so that
    /// `ifx C1 ifx C2 A B C` means `ifx C1 A (ifx C2 B C)`.
    fn if_expression(&mut self) -> Result<Expr, ()> {
        ensure_sufficient_stack(|| self.if_expression_inner())
    }

    fn if_expression_inner(&mut self) -> Result<Expr, ()> {
        if !self.check(TokenKind::Ifx) {
            return self.assignment();
        }

        let mut conditions = Vec::new();
        while self.match_token(TokenKind::Ifx) {
            let keyword = self.previous().clone();
            conditions.push((keyword, self.assignment()?));
        }

        let mut then_branches = Vec::with_capacity(conditions.len());
        for _ in 0..conditions.len() {
            then_branches.push(self.if_expression()?);
        }
        let mut expr = self.if_expression()?;

        for ((keyword, condition), then_branch) in conditions.into_iter().zip(then_branches).rev()
        {
            expr = Expr::IfExpr(IfExpr {
                keyword,
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(expr),
            });
        }

        Ok(expr)
    }

    /// Parse assignment (right-associative)
    ///
    /// Only a plain variable is a valid target; anything else is reported
    /// and the left-hand expression is kept.
    fn assignment(&mut self) -> Result<Expr, ()> {
        let expr = self.or()?;

        if !self.match_token(TokenKind::Equal) {
            return Ok(expr);
        }

        let equals = self.previous().clone();
        let value = self.if_expression()?;

        match &expr {
            Expr::Variable(target) => Ok(Expr::Assign(AssignExpr {
                id: target.id,
                name: target.name.clone(),
                value: Box::new(value),
            })),
            _ => {
                self.error_at(
                    &equals,
                    error_codes::INVALID_ASSIGNMENT_TARGET,
                    "Invalid assignment target.",
                );
                Ok(expr)
            }
        }
    }

    fn or(&mut self) -> Result<Expr, ()> {
        let mut expr = self.and()?;

        while self.match_token(TokenKind::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = logical(expr, operator, right);
        }

        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ()> {
        let mut expr = self.equality()?;

        while self.match_token(TokenKind::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = logical(expr, operator, right);
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ()> {
        let mut expr = self.comparison()?;

        while self.match_any(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ()> {
        let mut expr = self.term()?;

        while self.match_any(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ()> {
        let mut expr = self.factor()?;

        while self.match_any(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ()> {
        let mut expr = self.unary()?;

        while self.match_any(&[TokenKind::Slash, TokenKind::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ()> {
        ensure_sufficient_stack(|| self.unary_inner())
    }

    fn unary_inner(&mut self) -> Result<Expr, ()> {
        if self.match_any(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
            }));
        }

        self.call()
    }

    /// Parse a primary expression followed by any number of call suffixes
    fn call(&mut self) -> Result<Expr, ()> {
        let mut expr = self.primary()?;

        while self.match_token(TokenKind::LeftParen) {
            let mut args = Vec::new();
            if !self.check(TokenKind::RightParen) {
                loop {
                    if args.len() >= MAX_ARITY {
                        let token = self.peek().clone();
                        self.error_at(
                            &token,
                            error_codes::TOO_MANY_ARGUMENTS,
                            "Can't have more than 255 arguments.",
                        );
                    }
                    args.push(self.if_expression()?);
                    if !self.match_token(TokenKind::Comma) {
                        break;
                    }
                }
            }

            let paren = self.consume(TokenKind::RightParen, "Expected ')' after arguments.")?;
            expr = Expr::Call(CallExpr {
                callee: Box::new(expr),
                paren,
                args,
            });
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ()> {
        let token = self.peek().clone();

        let expr = match token.kind {
            TokenKind::False => Expr::Literal(Literal::Bool(false), token.span),
            TokenKind::True => Expr::Literal(Literal::Bool(true), token.span),
            TokenKind::Nil => Expr::Literal(Literal::Nil, token.span),
            TokenKind::Number | TokenKind::String => {
                let value = token.literal.clone().unwrap_or(Literal::Nil);
                Expr::Literal(value, token.span)
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(TokenKind::RightParen, "Expected ')' after expression.")?;
                return Ok(Expr::Grouping(Box::new(inner)));
            }
            TokenKind::Identifier => Expr::Variable(VariableExpr {
                id: self.node_id(),
                name: token,
            }),
            TokenKind::Fun => {
                self.advance();
                let function = self.function_body(token)?;
                return Ok(Expr::Function(Rc::new(function)));
            }
            _ => {
                self.error("Expected expression.");
                return Err(());
            }
        };

        self.advance();
        Ok(expr)
    }

    /// Parse `(params) { body }` after a `fun` keyword (and name, if any)
    pub(super) fn function_body(&mut self, keyword: Token) -> Result<FunctionExpr, ()> {
        self.consume(TokenKind::LeftParen, "Expected '(' after 'fun'.")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    let token = self.peek().clone();
                    self.error_at(
                        &token,
                        error_codes::TOO_MANY_ARGUMENTS,
                        "Can't have more than 255 parameters.",
                    );
                }
                params.push(self.consume(TokenKind::Identifier, "Expected parameter name.")?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters.")?;

        let mut body = self.block("Expected '{' before function body.", false)?;
        Ok(FunctionExpr {
            keyword,
            params,
            body: std::mem::take(&mut body.statements),
        })
    }
}

fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

fn logical(left: Expr, operator: Token, right: Expr) -> Expr {
    Expr::Logical(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}
