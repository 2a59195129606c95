//! Token types for lexical analysis
//!
//! Defines all token types recognized by the Lox lexer.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Decoded literal value
///
/// Attached to `NUMBER` and `STRING` tokens by the lexer, reused by the AST
/// for literal expressions. `Error` carries a parse failure's message in the
/// placeholder statement left behind by error recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    /// Marker left in place of a declaration that failed to parse
    Error(String),
}

/// Token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of this token
    pub lexeme: String,
    /// Decoded value for `NUMBER` and `STRING` tokens
    pub literal: Option<Literal>,
    /// Line the token starts on (1-indexed)
    pub line: usize,
    /// Source location
    pub span: Span,
}

impl Token {
    /// Create a new token without a literal payload
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            line,
            span,
        }
    }

    /// Attach a decoded literal
    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    /// Synthesized token (desugaring, host bindings)
    pub fn synthetic(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self::new(kind, lexeme, line, Span::dummy())
    }
}

/// Classification of token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Punctuation
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,` (argument separator and sequence operator)
    Comma,
    /// `.` (reserved for property access)
    Dot,
    /// `;`
    Semicolon,

    // Operators
    /// `-` (subtraction or negation)
    Minus,
    /// `+`
    Plus,
    /// `/`
    Slash,
    /// `*`
    Star,
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Break,
    Class,
    Continue,
    Else,
    False,
    For,
    Fun,
    If,
    /// Prefix conditional expression
    Ifx,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    // Special
    /// End of input
    Eof,
}

impl TokenKind {
    /// Look up a keyword; `None` means the text is a plain identifier
    pub fn keyword(s: &str) -> Option<TokenKind> {
        match s {
            "and" => Some(TokenKind::And),
            "break" => Some(TokenKind::Break),
            "class" => Some(TokenKind::Class),
            "continue" => Some(TokenKind::Continue),
            "else" => Some(TokenKind::Else),
            "false" => Some(TokenKind::False),
            "for" => Some(TokenKind::For),
            "fun" => Some(TokenKind::Fun),
            "if" => Some(TokenKind::If),
            "ifx" => Some(TokenKind::Ifx),
            "nil" => Some(TokenKind::Nil),
            "or" => Some(TokenKind::Or),
            "print" => Some(TokenKind::Print),
            "return" => Some(TokenKind::Return),
            "super" => Some(TokenKind::Super),
            "this" => Some(TokenKind::This),
            "true" => Some(TokenKind::True),
            "var" => Some(TokenKind::Var),
            "while" => Some(TokenKind::While),
            _ => None,
        }
    }

    /// Get the string representation of this token kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            TokenKind::Slash => "/",
            TokenKind::Star => "*",
            TokenKind::Bang => "!",
            TokenKind::BangEqual => "!=",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::And => "and",
            TokenKind::Break => "break",
            TokenKind::Class => "class",
            TokenKind::Continue => "continue",
            TokenKind::Else => "else",
            TokenKind::False => "false",
            TokenKind::For => "for",
            TokenKind::Fun => "fun",
            TokenKind::If => "if",
            TokenKind::Ifx => "ifx",
            TokenKind::Nil => "nil",
            TokenKind::Or => "or",
            TokenKind::Print => "print",
            TokenKind::Return => "return",
            TokenKind::Super => "super",
            TokenKind::This => "this",
            TokenKind::True => "true",
            TokenKind::Var => "var",
            TokenKind::While => "while",
            TokenKind::Eof => "EOF",
        }
    }

    /// Tokens that begin a declaration or statement; panic-mode recovery stops here
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::LeftBrace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new(TokenKind::Number, "42", 3, Span::new(0, 2))
            .with_literal(Literal::Number(42.0));
        assert_eq!(token.kind, TokenKind::Number);
        assert_eq!(token.lexeme, "42");
        assert_eq!(token.line, 3);
        assert_eq!(token.literal, Some(Literal::Number(42.0)));
    }

    #[test]
    fn test_keyword_table() {
        let keywords = [
            "and", "break", "class", "continue", "else", "false", "for", "fun", "if", "ifx",
            "nil", "or", "print", "return", "super", "this", "true", "var", "while",
        ];
        for kw in keywords {
            let kind = TokenKind::keyword(kw).unwrap_or_else(|| panic!("{} not a keyword", kw));
            assert_eq!(kind.as_str(), kw);
        }
    }

    #[test]
    fn test_non_keyword() {
        assert_eq!(TokenKind::keyword("foo"), None);
        assert_eq!(TokenKind::keyword("ifxx"), None);
        assert_eq!(TokenKind::keyword("Var"), None); // Case-sensitive
        assert_eq!(TokenKind::keyword("let"), None);
    }

    #[test]
    fn test_statement_starters() {
        assert!(TokenKind::Fun.starts_statement());
        assert!(TokenKind::LeftBrace.starts_statement());
        assert!(!TokenKind::Break.starts_statement());
        assert!(!TokenKind::Identifier.starts_statement());
    }
}
