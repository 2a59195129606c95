//! Parsing (tokens to AST)
//!
//! Recursive descent over the token stream. Syntax errors are reported as
//! diagnostics; the failed declaration is replaced by an error placeholder
//! and parsing resumes at the next statement boundary.

mod expr;
mod stmt;

use crate::ast::*;
use crate::diagnostic::{error_codes, Anchor, Diagnostic};
use crate::span::Span;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};

/// Maximum number of parameters or call arguments
pub const MAX_ARITY: usize = 255;

/// Parser state for building AST from tokens
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) diagnostics: Vec<Diagnostic>,
    next_id: u32,
}

impl Parser {
    /// Create a new parser for the given tokens
    ///
    /// A missing trailing `EOF` token is supplied.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::synthetic(TokenKind::Eof, "", line));
        }
        Self {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            next_id: 0,
        }
    }

    /// Number node ids from `first` onwards
    ///
    /// Used when several programs share one resolution table, as REPL
    /// lines do.
    pub fn with_first_node_id(mut self, first: u32) -> Self {
        self.next_id = first;
        self
    }

    /// The id the next variable or assignment node would receive
    pub fn next_node_id(&self) -> u32 {
        self.next_id
    }

    /// Parse tokens into an AST
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse(&mut self) -> (Program, Vec<Diagnostic>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.declaration(false));
        }

        tracing::debug!(
            statements = statements.len(),
            errors = self.diagnostics.len(),
            "parsed program"
        );
        (Program { statements }, std::mem::take(&mut self.diagnostics))
    }

    /// Parse one declaration, recovering on failure
    pub(super) fn declaration(&mut self, in_loop: bool) -> Stmt {
        ensure_sufficient_stack(|| self.declaration_inner(in_loop))
    }

    fn declaration_inner(&mut self, in_loop: bool) -> Stmt {
        let start = self.current;

        let result = if self.check(TokenKind::Fun) && self.check_next(TokenKind::Identifier) {
            self.advance();
            self.function_declaration()
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration()
        } else {
            self.statement(in_loop)
        };

        match result {
            Ok(stmt) => stmt,
            Err(()) => {
                self.synchronize(start);
                let message = self
                    .diagnostics
                    .last()
                    .map(|d| d.message.clone())
                    .unwrap_or_default();
                Stmt::error_sentinel(message, self.span_from(start))
            }
        }
    }

    /// Allocate an id for a variable or assignment node
    pub(super) fn node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // === Token navigation ===

    /// Advance to next token, returning the consumed one
    pub(super) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    /// Peek at current token
    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Most recently consumed token
    pub(super) fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Check if current token matches kind
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    /// Check the token after the current one
    pub(super) fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.current + 1)
            .is_some_and(|t| t.kind == kind)
    }

    /// Match and consume token if it matches
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Match and consume the current token if it is any of `kinds`
    pub(super) fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|kind| self.match_token(*kind))
    }

    /// Consume token of given kind or error
    pub(super) fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(message);
            Err(())
        }
    }

    /// Check if at end of token stream
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.tokens[self.current].kind == TokenKind::Eof
    }

    // === Errors ===

    /// Record a syntax error at the current token
    pub(super) fn error(&mut self, message: &str) {
        let token = self.peek().clone();
        self.error_at(&token, error_codes::SYNTAX_ERROR, message);
    }

    /// Record an error against a specific token
    pub(super) fn error_at(&mut self, token: &Token, code: &str, message: &str) {
        let anchor = if token.kind == TokenKind::Eof {
            Anchor::AtEnd
        } else {
            Anchor::AtLexeme(token.lexeme.clone())
        };
        self.diagnostics.push(
            Diagnostic::error_with_code(code, message, token.span)
                .with_line(token.line)
                .with_anchor(anchor)
                .with_label("syntax error"),
        );
    }

    /// Discard tokens until a likely statement boundary
    ///
    /// Stops after a `;` or before a token that starts a statement. Always
    /// consumes at least one token of the failed declaration.
    pub(super) fn synchronize(&mut self, start: usize) {
        if self.current == start {
            self.advance();
        }

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    /// Span from the token at `start` through the last consumed token
    pub(super) fn span_from(&self, start: usize) -> Span {
        self.tokens[start].span.merge(self.previous().span)
    }
}
