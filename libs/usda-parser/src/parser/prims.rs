//! # Prim Specs
//!
//! Parsing of prim specs and the properties inside their bodies.

use super::Parser;
use crate::error::ParseError;
use crate::layer::{
    Attribute, ListOp, Metadata, PrimSpec, PropertySpec, Relationship, Specifier, Value,
    Variability,
};
use crate::lexer::TokenKind;
use crate::span::Position;

impl Parser {
    /// Parse a prim spec.
    ///
    /// ```text
    /// ("def" | "over" | "class") [TypeName] "name" [( metadata )] { body }
    /// ```
    ///
    /// A prim nested past the depth limit is skipped whole and reported
    /// once.
    pub(super) fn parse_prim(&mut self) -> Result<PrimSpec, ParseError> {
        if self.at_depth_limit() {
            let error = self.too_deep();
            self.skip_prim();
            return Err(error);
        }
        self.nested(Self::parse_prim_spec)
    }

    fn parse_prim_spec(&mut self) -> Result<PrimSpec, ParseError> {
        let start = self.current_position();
        let specifier = match self.peek_kind() {
            TokenKind::Def => Specifier::Def,
            TokenKind::Over => Specifier::Over,
            TokenKind::Class => Specifier::Class,
            _ => return Err(self.error_here("'def', 'over' or 'class'")),
        };
        self.advance();

        let type_name = if self.check(TokenKind::Identifier) {
            Some(self.advance().text.clone())
        } else {
            None
        };
        let name = self.expect(TokenKind::String)?.text.clone();

        let metadata = if self.check(TokenKind::LParen) {
            self.parse_metadata()?
        } else {
            Metadata::default()
        };

        self.expect(TokenKind::LBrace)?;
        let (properties, children) = self.parse_prim_body();
        self.expect(TokenKind::RBrace)?;

        Ok(PrimSpec {
            specifier,
            type_name,
            name,
            metadata,
            properties,
            children,
            span: self.span_from(start),
        })
    }

    /// Parse prim body items up to (not including) the closing brace.
    ///
    /// Errors inside the body are recorded and parsing resumes at the next
    /// prim specifier or closing brace, so one bad property does not lose
    /// the rest of the prim.
    fn parse_prim_body(&mut self) -> (Vec<PropertySpec>, Vec<PrimSpec>) {
        let mut properties = Vec::new();
        let mut children = Vec::new();

        loop {
            let result = match self.peek_kind() {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.advance();
                    Ok(())
                }
                kind if kind.is_specifier() => self.parse_prim().map(|prim| children.push(prim)),
                TokenKind::VariantSet => self.skip_variant_set(),
                _ => self.parse_property(&mut properties),
            };

            if let Err(e) = result {
                self.errors.push(e);
                self.synchronize();
            }
        }

        (properties, children)
    }

    /// Skip a prim spec without descending into it.
    ///
    /// Stops on the closing brace of the prim body so that recovery resumes
    /// after it. Braces inside the metadata parentheses are not counted.
    fn skip_prim(&mut self) {
        let mut parens = 0usize;
        let mut braces = 0usize;

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LParen => parens += 1,
                TokenKind::RParen => parens = parens.saturating_sub(1),
                TokenKind::LBrace if parens == 0 => braces += 1,
                TokenKind::RBrace if parens == 0 => {
                    braces = braces.saturating_sub(1);
                    if braces == 0 {
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Parse an optional list-op prefix.
    pub(super) fn parse_list_op(&mut self) -> Option<ListOp> {
        let op = match self.peek_kind() {
            TokenKind::Prepend => ListOp::Prepend,
            TokenKind::Append => ListOp::Append,
            TokenKind::Add => ListOp::Add,
            TokenKind::Delete => ListOp::Delete,
            TokenKind::Reorder => ListOp::Reorder,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    /// Consume a name: an identifier, or a keyword used as a name.
    pub(super) fn expect_name(&mut self, expected: &str) -> Result<String, ParseError> {
        let kind = self.peek_kind();
        if kind == TokenKind::Identifier || kind.is_keyword() {
            Ok(self.advance().text.clone())
        } else {
            Err(self.error_here(expected))
        }
    }

    /// Parse an attribute or relationship statement.
    ///
    /// Repeated statements for the same attribute (default, `.timeSamples`,
    /// `.connect`) are merged into the existing entry.
    fn parse_property(&mut self, properties: &mut Vec<PropertySpec>) -> Result<(), ParseError> {
        let start = self.current_position();
        let list_op = self.parse_list_op();

        if list_op == Some(ListOp::Reorder) {
            // `reorder nameChildren = [...]` only affects ordering opinions.
            self.expect_name("'nameChildren' or 'properties'")?;
            self.expect(TokenKind::Eq)?;
            self.parse_value()?;
            return Ok(());
        }

        let custom = self.match_token(TokenKind::Custom);

        if self.match_token(TokenKind::Rel) {
            let relationship = self.parse_relationship_rest(custom, list_op, start)?;
            properties.push(PropertySpec::Relationship(relationship));
            return Ok(());
        }
        if list_op.is_some() {
            return Err(self.error_here("'rel'"));
        }

        let variability = if self.match_token(TokenKind::Uniform) {
            Variability::Uniform
        } else {
            self.match_token(TokenKind::Varying);
            Variability::Varying
        };

        let type_name = self.expect(TokenKind::Identifier)?.text.clone();
        let is_array = if self.match_token(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket)?;
            true
        } else {
            false
        };
        let name = self.expect_name("attribute name")?;

        let field = if self.match_token(TokenKind::Dot) {
            Some(self.expect_name("'timeSamples' or 'connect'")?)
        } else {
            None
        };

        let mut attribute = Attribute::new(name, type_name, self.span_from(start));
        attribute.is_array = is_array;
        attribute.variability = variability;
        attribute.custom = custom;

        match field.as_deref() {
            None => {
                if self.match_token(TokenKind::Eq) {
                    attribute.default = Some(self.parse_value()?);
                }
            }
            Some("timeSamples") => {
                self.expect(TokenKind::Eq)?;
                attribute.time_samples = self.parse_time_samples()?;
            }
            Some("connect") => {
                self.expect(TokenKind::Eq)?;
                attribute.connections = collect_paths(&self.parse_value()?);
            }
            Some(other) => {
                return Err(ParseError::unexpected_token(other, "'timeSamples' or 'connect'")
                    .with_span(self.previous().span));
            }
        }

        if self.check(TokenKind::LParen) {
            attribute.metadata = self.parse_metadata()?;
        }

        merge_attribute(properties, attribute);
        Ok(())
    }

    /// Parse the remainder of `rel name [= targets] [( metadata )]`.
    fn parse_relationship_rest(
        &mut self,
        custom: bool,
        list_op: Option<ListOp>,
        start: Position,
    ) -> Result<Relationship, ParseError> {
        let name = self.expect_name("relationship name")?;
        let targets = if self.match_token(TokenKind::Eq) {
            collect_paths(&self.parse_value()?)
        } else {
            Vec::new()
        };
        let metadata = if self.check(TokenKind::LParen) {
            self.parse_metadata()?
        } else {
            Metadata::default()
        };

        Ok(Relationship {
            name,
            custom,
            list_op,
            targets,
            metadata,
            span: self.span_from(start),
        })
    }
}

/// Fold a freshly parsed attribute statement into the property list.
fn merge_attribute(properties: &mut Vec<PropertySpec>, attribute: Attribute) {
    let existing = properties.iter_mut().find_map(|p| match p {
        PropertySpec::Attribute(a) if a.name == attribute.name => Some(a),
        _ => None,
    });

    match existing {
        Some(a) => {
            if attribute.default.is_some() {
                a.default = attribute.default;
            }
            if !attribute.time_samples.is_empty() {
                a.time_samples = attribute.time_samples;
            }
            if !attribute.connections.is_empty() {
                a.connections = attribute.connections;
            }
            a.metadata.entries.extend(attribute.metadata.entries);
        }
        None => properties.push(PropertySpec::Attribute(attribute)),
    }
}

/// Paths named by a target value: a single path, or an array of paths.
fn collect_paths(value: &Value) -> Vec<String> {
    match value {
        Value::Path(path) => vec![path.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Path(path) => Some(path.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
