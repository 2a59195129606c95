//! Lexical analysis (tokenization)
//!
//! The lexer converts Lox source code into a stream of tokens. Malformed
//! input is reported as a diagnostic and skipped; scanning always reaches
//! the end of the source and finishes with a single `EOF` token.

use crate::diagnostic::{error_codes, Diagnostic};
use crate::span::Span;
use crate::token::{Token, TokenKind};

mod literals;

/// Lexer state for tokenizing source code
pub struct Lexer {
    /// Characters of source code
    pub(super) chars: Vec<char>,
    /// Current position in chars
    pub(super) current: usize,
    /// Current line number (1-indexed)
    pub(super) line: usize,
    /// Start position of current token
    pub(super) start_pos: usize,
    /// Start line of current token
    pub(super) start_line: usize,
    /// Collected diagnostics
    pub(super) diagnostics: Vec<Diagnostic>,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: impl AsRef<str>) -> Self {
        Self {
            chars: source.as_ref().chars().collect(),
            current: 0,
            line: 1,
            start_pos: 0,
            start_line: 1,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the source code, returning tokens and any diagnostics
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            self.start_pos = self.current;
            self.start_line = self.line;

            if self.is_at_end() {
                tokens.push(self.make_token(TokenKind::Eof, ""));
                break;
            }

            if let Some(token) = self.next_token() {
                tokens.push(token);
            }
        }

        tracing::debug!(
            tokens = tokens.len(),
            errors = self.diagnostics.len(),
            "scanned source"
        );
        (tokens, std::mem::take(&mut self.diagnostics))
    }

    /// Scan the next token; `None` when the input was rejected
    fn next_token(&mut self) -> Option<Token> {
        let c = self.advance();

        let token = match c {
            // Single-character tokens
            '(' => self.make_token(TokenKind::LeftParen, "("),
            ')' => self.make_token(TokenKind::RightParen, ")"),
            '{' => self.make_token(TokenKind::LeftBrace, "{"),
            '}' => self.make_token(TokenKind::RightBrace, "}"),
            ',' => self.make_token(TokenKind::Comma, ","),
            '.' => self.make_token(TokenKind::Dot, "."),
            '-' => self.make_token(TokenKind::Minus, "-"),
            '+' => self.make_token(TokenKind::Plus, "+"),
            ';' => self.make_token(TokenKind::Semicolon, ";"),
            '*' => self.make_token(TokenKind::Star, "*"),
            // Comments were consumed by skip_whitespace_and_comments
            '/' => self.make_token(TokenKind::Slash, "/"),

            // One or two character tokens
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::BangEqual, "!=")
                } else {
                    self.make_token(TokenKind::Bang, "!")
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual, "==")
                } else {
                    self.make_token(TokenKind::Equal, "=")
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::LessEqual, "<=")
                } else {
                    self.make_token(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GreaterEqual, ">=")
                } else {
                    self.make_token(TokenKind::Greater, ">")
                }
            }

            '"' => return self.string(),

            c if c.is_ascii_digit() => self.number(),

            c if is_identifier_start(c) => self.identifier(),

            _ => {
                self.report(
                    error_codes::UNEXPECTED_CHARACTER,
                    &format!("Unexpected character `{}`.", c),
                    "unexpected character",
                );
                return None;
            }
        };

        Some(token)
    }

    /// Skip whitespace and `//` comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.is_at_end() {
                return;
            }

            match self.peek() {
                ' ' | '\r' | '\t' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                }
                '/' if self.peek_next() == Some('/') => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    // === Character navigation ===

    /// Advance to next character and return it
    pub(super) fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    /// Peek at current character without advancing
    pub(super) fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    /// Peek at next character (current + 1)
    pub(super) fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    /// Check if current character matches expected, and advance if so
    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.chars[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// Check if we've reached the end of source
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    /// Source text of the token being scanned
    pub(super) fn current_lexeme(&self) -> String {
        self.chars[self.start_pos..self.current].iter().collect()
    }

    // === Token creation ===

    /// Create a token with the given kind and lexeme
    pub(super) fn make_token(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(
            kind,
            lexeme,
            self.start_line,
            Span::new(self.start_pos, self.current),
        )
    }

    /// Record a lexical diagnostic for the current token
    ///
    /// Lexical errors carry no `at` location, only the line.
    pub(super) fn report(&mut self, code: &str, message: &str, label: &str) {
        let span = Span::new(self.start_pos, self.current.max(self.start_pos + 1));
        let snippet = self.line_snippet(self.start_line);
        self.diagnostics.push(
            Diagnostic::error_with_code(code, message, span)
                .with_line(self.line)
                .with_snippet(snippet)
                .with_label(label),
        );
    }

    /// Text of the given 1-based source line
    fn line_snippet(&self, line: usize) -> String {
        let source: String = self.chars.iter().collect();
        source
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or("")
            .to_string()
    }
}

pub(super) fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(super) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
