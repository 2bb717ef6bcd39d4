//! # Tokens
//!
//! Token types for the USDA lexer.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::lexer::{Token, TokenKind};
//! use usda_parser::span::Span;
//!
//! let token = Token::new(TokenKind::Number, Span::from_bytes(0, 3), "0.5".to_string());
//! assert_eq!(token.kind, TokenKind::Number);
//! ```

use crate::span::{Span, Spanned};

// =============================================================================
// TOKEN
// =============================================================================

/// One lexeme with its kind and location.
///
/// For strings, paths and asset paths `text` holds the content without the
/// surrounding delimiters (string escapes already resolved). For every other
/// kind it is the exact source slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token type.
    pub kind: TokenKind,
    /// Source span.
    pub span: Span,
    /// Token text.
    pub text: String,
}

impl Token {
    /// Create a new token.
    ///
    /// ## Parameters
    ///
    /// - `kind`: Token type
    /// - `span`: Source location
    /// - `text`: Token text
    pub fn new(kind: TokenKind, span: Span, text: String) -> Self {
        Self { kind, span, text }
    }

    /// End-of-input marker.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Text the lexer could not classify.
    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

// =============================================================================
// TOKEN KIND
// =============================================================================

/// Types of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Header
    /// `#usda 1.0` on the first line
    Header,

    // Literals
    /// Number literal like `10`, `-0.5` or `1e-3`
    Number,
    /// String literal in single, double or triple quotes
    String,
    /// Asset path like `@./texture.png@`
    AssetPath,
    /// Scene path like `</World/Cube>`
    Path,

    // Identifiers
    /// Identifier, type name or namespaced property name like `xformOp:translate`
    Identifier,

    // Keywords
    /// `def` specifier
    Def,
    /// `over` specifier
    Over,
    /// `class` specifier
    Class,
    /// `uniform` variability
    Uniform,
    /// `varying` variability
    Varying,
    /// `custom` property qualifier
    Custom,
    /// `rel` relationship
    Rel,
    /// `None` value
    None,
    /// `prepend` list op
    Prepend,
    /// `append` list op
    Append,
    /// `add` list op
    Add,
    /// `delete` list op
    Delete,
    /// `reorder` list op
    Reorder,
    /// `variantSet` block
    VariantSet,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=`
    Eq,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `.`
    Dot,

    // Meta
    /// End of file
    Eof,
    /// Error token
    Error,
}

impl TokenKind {
    /// Check if this token starts a prim spec.
    pub const fn is_specifier(&self) -> bool {
        matches!(self, Self::Def | Self::Over | Self::Class)
    }

    /// Check if this token is a list-op prefix.
    pub const fn is_list_op(&self) -> bool {
        matches!(
            self,
            Self::Prepend | Self::Append | Self::Add | Self::Delete | Self::Reorder
        )
    }

    /// Reserved words, which may still be used as property names.
    pub const fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Def
                | Self::Over
                | Self::Class
                | Self::Uniform
                | Self::Varying
                | Self::Custom
                | Self::Rel
                | Self::None
                | Self::Prepend
                | Self::Append
                | Self::Add
                | Self::Delete
                | Self::Reorder
                | Self::VariantSet
        )
    }

    /// Look up the keyword for an identifier, if any.
    pub fn keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "def" => Self::Def,
            "over" => Self::Over,
            "class" => Self::Class,
            "uniform" => Self::Uniform,
            "varying" => Self::Varying,
            "custom" => Self::Custom,
            "rel" => Self::Rel,
            "None" => Self::None,
            "prepend" => Self::Prepend,
            "append" => Self::Append,
            "add" => Self::Add,
            "delete" => Self::Delete,
            "reorder" => Self::Reorder,
            "variantSet" => Self::VariantSet,
            _ => return None,
        };
        Some(kind)
    }

    /// Name shown in "expected ..." messages.
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Header => "'#usda' header",
            Self::Number => "number",
            Self::String => "string",
            Self::AssetPath => "asset path",
            Self::Path => "path",
            Self::Identifier => "identifier",
            Self::Def => "'def'",
            Self::Over => "'over'",
            Self::Class => "'class'",
            Self::Uniform => "'uniform'",
            Self::Varying => "'varying'",
            Self::Custom => "'custom'",
            Self::Rel => "'rel'",
            Self::None => "'None'",
            Self::Prepend => "'prepend'",
            Self::Append => "'append'",
            Self::Add => "'add'",
            Self::Delete => "'delete'",
            Self::Reorder => "'reorder'",
            Self::VariantSet => "'variantSet'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Eq => "'='",
            Self::Comma => "','",
            Self::Semicolon => "';'",
            Self::Colon => "':'",
            Self::Dot => "'.'",
            Self::Eof => "end of file",
            Self::Error => "error",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
