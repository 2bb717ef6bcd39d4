//! # Values and Metadata
//!
//! Parsing of authored values, metadata blocks, dictionaries and time
//! samples.

use super::Parser;
use crate::error::{ParseError, ParseErrorKind};
use crate::layer::{Metadata, MetadataEntry, Value};
use crate::lexer::TokenKind;

impl Parser {
    /// Parse a value.
    ///
    /// ```text
    /// value = number | string | identifier | None | <path> | @asset@[<path>]
    ///       | ( value, ... ) | [ value, ... ] | { type key = value ... }
    /// ```
    pub(super) fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.nested(Self::parse_value_item)
    }

    fn parse_value_item(&mut self) -> Result<Value, ParseError> {
        match self.peek_kind() {
            TokenKind::Number => self.parse_number().map(Value::Number),
            TokenKind::String => Ok(Value::String(self.advance().text.clone())),
            TokenKind::None => {
                self.advance();
                Ok(Value::None)
            }
            TokenKind::Path => Ok(Value::Path(self.advance().text.clone())),
            TokenKind::AssetPath => {
                let asset = self.advance().text.clone();
                // References carry an optional target prim after the asset.
                self.match_token(TokenKind::Path);
                Ok(Value::AssetPath(asset))
            }
            TokenKind::Identifier => {
                let text = self.advance().text.clone();
                Ok(match text.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    "inf" => Value::Number(f64::INFINITY),
                    "nan" => Value::Number(f64::NAN),
                    _ => Value::Token(text),
                })
            }
            TokenKind::LParen => {
                let items = self.parse_sequence(TokenKind::LParen, TokenKind::RParen)?;
                Ok(Value::Tuple(items))
            }
            TokenKind::LBracket => {
                let items = self.parse_sequence(TokenKind::LBracket, TokenKind::RBracket)?;
                Ok(Value::Array(items))
            }
            TokenKind::LBrace => self.parse_dictionary(),
            _ => Err(self.error_here("value")),
        }
    }

    /// Parse a number literal.
    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let token = self.advance();
        token.text.parse::<f64>().map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidNumber {
                    text: token.text.clone(),
                },
                token.span,
            )
        })
    }

    /// Parse a comma separated sequence between `open` and `close`.
    ///
    /// A trailing comma is allowed.
    fn parse_sequence(
        &mut self,
        open: TokenKind,
        close: TokenKind,
    ) -> Result<Vec<Value>, ParseError> {
        self.expect(open)?;
        let mut items = Vec::new();

        while !self.check(close) {
            items.push(self.parse_value()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(close)?;
        Ok(items)
    }

    /// Parse a dictionary `{ type key = value ... }`.
    ///
    /// Keys may be bare names or quoted strings. Entries are separated by
    /// newlines, so `;` and `,` are accepted but not required.
    fn parse_dictionary(&mut self) -> Result<Value, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();

        while !self.check(TokenKind::RBrace) {
            if self.match_token(TokenKind::Semicolon) || self.match_token(TokenKind::Comma) {
                continue;
            }

            self.expect_name("dictionary value type")?;
            if self.match_token(TokenKind::LBracket) {
                self.expect(TokenKind::RBracket)?;
            }

            let key = if self.check(TokenKind::String) {
                self.advance().text.clone()
            } else {
                self.expect_name("dictionary key")?
            };
            self.expect(TokenKind::Eq)?;
            entries.push((key, self.parse_value()?));
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Value::Dictionary(entries))
    }

    /// Parse a `.timeSamples` block `{ time: value, ... }`.
    pub(super) fn parse_time_samples(&mut self) -> Result<Vec<(f64, Value)>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut samples = Vec::new();

        while !self.check(TokenKind::RBrace) {
            if !self.check(TokenKind::Number) {
                return Err(self.error_here("sample time"));
            }
            let time = self.parse_number()?;
            self.expect(TokenKind::Colon)?;
            samples.push((time, self.parse_value()?));

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(samples)
    }

    /// Parse a metadata block `( ... )`.
    ///
    /// A bare string is the doc string; other entries are
    /// `[listop] key = value`.
    pub(super) fn parse_metadata(&mut self) -> Result<Metadata, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut metadata = Metadata::default();

        while !self.check(TokenKind::RParen) {
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }
            if self.check(TokenKind::String) {
                metadata.doc = Some(self.advance().text.clone());
                continue;
            }

            let list_op = self.parse_list_op();
            let key = self.expect_name("metadata key")?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_value()?;
            metadata.entries.push(MetadataEntry {
                key,
                list_op,
                value,
            });
        }

        self.expect(TokenKind::RParen)?;
        Ok(metadata)
    }

    /// Skip a `variantSet "name" = { ... }` block.
    ///
    /// Variant selection is a composition feature; the block is consumed
    /// with brace matching and its contents are dropped.
    pub(super) fn skip_variant_set(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::VariantSet)?;
        self.expect(TokenKind::String)?;
        self.expect(TokenKind::Eq)?;
        self.expect(TokenKind::LBrace)?;

        let mut depth = 1usize;
        while depth > 0 {
            match self.peek_kind() {
                TokenKind::Eof => return Err(self.error_here("'}'")),
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            self.advance();
        }

        log::debug!("skipped variant set");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
