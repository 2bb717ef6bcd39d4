//! # Parse Errors
//!
//! Error types for the USDA parser.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::error::ParseError;
//!
//! let error = ParseError::unexpected_token(")", "prim name");
//! assert!(error.to_string().contains("prim name"));
//! ```

use crate::lexer::Token;
use crate::span::Span;
use std::fmt;
use thiserror::Error;

// =============================================================================
// PARSE ERROR
// =============================================================================

/// A syntax error and where it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Offending source range.
    pub span: Span,
}

impl ParseError {
    /// Error of `kind` at `span`.
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// `found` where `expected` should have been. The span is filled in
    /// later with [`with_span`](Self::with_span).
    pub fn unexpected_token(found: &str, expected: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                found: found.to_string(),
                expected: expected.to_string(),
            },
            Span::zero(),
        )
    }

    /// Input ended while `expected` was still needed.
    pub fn unexpected_eof(expected: &str) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            },
            Span::zero(),
        )
    }

    /// Describe a lexer error token.
    ///
    /// The first character of the offending slice tells which literal was
    /// left open.
    pub fn from_error_token(token: &Token) -> Self {
        let kind = match token.text.chars().next() {
            Some('"') | Some('\'') => ParseErrorKind::UnterminatedString,
            Some('<') => ParseErrorKind::UnterminatedPath,
            Some('@') => ParseErrorKind::UnterminatedAssetPath,
            _ => ParseErrorKind::InvalidCharacter {
                text: token.text.clone(),
            },
        };
        Self::new(kind, token.span)
    }

    /// Replace the span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span.start)
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// PARSE ERROR KIND
// =============================================================================

/// Categories of syntax error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// The layer does not start with `#usda`.
    #[error("missing '#usda' header")]
    MissingHeader,

    /// A token that does not fit the grammar here.
    #[error("unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        /// Token that was found.
        found: String,
        /// What the grammar wanted.
        expected: String,
    },

    /// Input ended early.
    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof {
        /// What the grammar wanted.
        expected: String,
    },

    /// Numeric text that does not parse as `f64`.
    #[error("invalid number '{text}'")]
    InvalidNumber {
        /// The invalid text.
        text: String,
    },

    /// Character that cannot start any token.
    #[error("invalid character '{text}'")]
    InvalidCharacter {
        /// The offending text.
        text: String,
    },

    /// String with no closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Unterminated `<path>`.
    #[error("unterminated path")]
    UnterminatedPath,

    /// Unterminated `@asset@` path.
    #[error("unterminated asset path")]
    UnterminatedAssetPath,

    /// Prims or values nested past the accepted depth.
    #[error("nesting deeper than {limit} levels")]
    TooDeep {
        /// Deepest accepted nesting.
        limit: usize,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use crate::span::Position;

    #[test]
    fn test_unexpected_token_message() {
        let error = ParseError::unexpected_token("=", "prim name");
        assert_eq!(error.kind.to_string(), "unexpected token '=', expected prim name");
    }

    #[test]
    fn test_display_uses_line_and_column() {
        let span = Span::new(Position::new(20, 2, 6), Position::new(21, 2, 7));
        let error = ParseError::unexpected_eof("'}'").with_span(span);
        assert!(error.to_string().ends_with("at 3:7"));
    }

    #[test]
    fn test_from_error_token() {
        let token = Token::new(TokenKind::Error, Span::from_bytes(0, 4), "\"abc".to_string());
        assert_eq!(
            ParseError::from_error_token(&token).kind,
            ParseErrorKind::UnterminatedString
        );

        let token = Token::new(TokenKind::Error, Span::from_bytes(0, 1), "$".to_string());
        assert_eq!(
            ParseError::from_error_token(&token).kind,
            ParseErrorKind::InvalidCharacter { text: "$".to_string() }
        );
    }
}
