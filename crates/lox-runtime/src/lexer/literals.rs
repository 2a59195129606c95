//! Literal parsing for the lexer

use crate::diagnostic::error_codes;
use crate::lexer::{is_identifier_char, Lexer};
use crate::token::{Literal, Token, TokenKind};

impl Lexer {
    /// Scan a string literal
    ///
    /// Characters are taken verbatim; there are no escape sequences.
    pub(super) fn string(&mut self) -> Option<Token> {
        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.report(
                error_codes::UNTERMINATED_STRING,
                "Unterminated string.",
                "string starts here",
            );
            return None;
        }

        self.advance(); // Closing "

        let lexeme = self.current_lexeme();
        let value: String = self.chars[self.start_pos + 1..self.current - 1]
            .iter()
            .collect();
        Some(
            self.make_token(TokenKind::String, &lexeme)
                .with_literal(Literal::String(value)),
        )
    }

    /// Scan a number literal: digits with an optional fractional part
    pub(super) fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing `.` without digits is left for the next token
        if self.peek() == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume .

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme = self.current_lexeme();
        // Digits with at most one interior dot always parse
        let value = lexeme.parse::<f64>().unwrap_or_default();
        self.make_token(TokenKind::Number, &lexeme)
            .with_literal(Literal::Number(value))
    }

    /// Scan an identifier or keyword
    pub(super) fn identifier(&mut self) -> Token {
        while is_identifier_char(self.peek()) {
            self.advance();
        }

        let lexeme = self.current_lexeme();
        let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, &lexeme)
    }
}
