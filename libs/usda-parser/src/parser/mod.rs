//! # USDA Parser
//!
//! Recursive descent parser for USD text layers.
//! Produces a [`Layer`] of prim specs.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::lexer::Lexer;
//! use usda_parser::parser::Parser;
//!
//! let source = "#usda 1.0\ndef Cube \"Box\" {}";
//! let tokens = Lexer::new(source).tokenize();
//! let parsed = Parser::new(tokens).parse();
//! assert!(parsed.is_ok());
//! ```

mod prims;
mod values;

use crate::error::{ParseError, ParseErrorKind};
use config::constants::{MAX_NESTING_DEPTH, STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};
use crate::layer::{Layer, Parsed};
use crate::lexer::{Token, TokenKind};
use crate::span::{Position, Span};

// =============================================================================
// PARSER
// =============================================================================

/// Recursive descent parser for USDA.
pub struct Parser {
    /// Token stream (always ends with EOF).
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Errors recorded so far; parsing continues past them.
    errors: Vec<ParseError>,
    /// Current prim and value nesting.
    depth: usize,
}

impl Parser {
    /// Create a new parser.
    ///
    /// ## Parameters
    ///
    /// - `tokens`: Tokens from lexer
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| !t.is_eof()) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end), String::new()));
        }

        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// Parse the entire token stream into a layer.
    ///
    /// ## Returns
    ///
    /// Layer with root prims and any parse errors. A missing header is
    /// reported but parsing continues.
    pub fn parse(&mut self) -> Parsed {
        let mut layer = Layer::default();

        if self.check(TokenKind::Header) {
            let header = self.advance().text.clone();
            layer.version = header
                .split_whitespace()
                .nth(1)
                .unwrap_or_default()
                .to_string();
        } else {
            self.errors.push(ParseError::new(
                ParseErrorKind::MissingHeader,
                self.peek().span,
            ));
        }

        if self.check(TokenKind::LParen) {
            match self.parse_metadata() {
                Ok(metadata) => layer.metadata = metadata,
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        while !self.is_at_end() {
            match self.parse_prim() {
                Ok(prim) => layer.prims.push(prim),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        Parsed::new(layer, std::mem::take(&mut self.errors))
    }

    // =========================================================================
    // TOKEN ACCESS
    // =========================================================================

    /// Get current token.
    fn peek(&self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Get the token after the current one.
    fn peek_ahead(&self) -> &Token {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Kind of the next token.
    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// True if the next token is `kind`.
    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Start of the next token.
    fn current_position(&self) -> Position {
        self.peek().span.start
    }

    /// Consume the next token.
    ///
    /// ## Returns
    ///
    /// The token that was consumed
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// Get previous token.
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    /// Consume a token of `kind` or fail.
    fn expect(&mut self, kind: TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(kind.display()))
        }
    }

    /// Consume a token of `kind` if present.
    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Error describing the current token as unexpected.
    fn error_here(&self, expected: &str) -> ParseError {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => ParseError::unexpected_eof(expected).with_span(token.span),
            TokenKind::Error => ParseError::from_error_token(token),
            _ => ParseError::unexpected_token(&token.text, expected).with_span(token.span),
        }
    }

    // =========================================================================
    // ERROR RECOVERY
    // =========================================================================

    /// Skip to a point where parsing can resume.
    ///
    /// Skips tokens until the next prim specifier or closing brace.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.peek_kind().is_specifier() || self.check(TokenKind::RBrace) {
                return;
            }
            self.advance();
        }
    }

    // =========================================================================
    // NESTING
    // =========================================================================

    /// Run `parse` one nesting level deeper.
    ///
    /// Past [`MAX_NESTING_DEPTH`] this fails with
    /// [`ParseErrorKind::TooDeep`]. Below it the stack grows on demand.
    fn nested<T>(
        &mut self,
        parse: fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.too_deep());
        }

        self.depth += 1;
        let result = stacker::maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || {
            parse(self)
        });
        self.depth -= 1;
        result
    }

    /// True once another level would exceed the limit.
    fn at_depth_limit(&self) -> bool {
        self.depth >= MAX_NESTING_DEPTH
    }

    fn too_deep(&self) -> ParseError {
        ParseError::new(
            ParseErrorKind::TooDeep {
                limit: MAX_NESTING_DEPTH,
            },
            self.peek().span,
        )
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Create span from start to the end of the previous token.
    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.previous().span.end)
    }
}

// =============================================================================
// TESTS
// =============================================================================
