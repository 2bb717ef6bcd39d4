//! # USDA Parser (Pure Rust)
//!
//! A pure Rust parser for USD text layers (`.usda`).
//!
//! ## Architecture
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Layer
//! ```
//!
//! The result is the layer exactly as authored: prim specs, properties and
//! metadata. Composition arcs are recorded but never followed.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::parse;
//!
//! let result = parse("#usda 1.0\ndef Cube \"Box\" {}");
//! assert!(result.errors.is_empty());
//! ```
//!
//! ## Pipeline Integration
//!
//! This crate is the first layer in the conversion pipeline:
//!
//! ```text
//! usda-parser → usd-scene → cube-mesh → speckle-sink
//! ```

pub mod error;
pub mod layer;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export public API
pub use error::{ParseError, ParseErrorKind};
pub use layer::{
    Attribute, Layer, ListOp, Metadata, MetadataEntry, Parsed, PrimSpec, PropertySpec,
    Relationship, Specifier, Value, Variability,
};
pub use span::{Position, Span, Spanned};

// =============================================================================
// PUBLIC API
// =============================================================================

/// Parse USDA source text into a [`Layer`].
///
/// This is the main entry point for the parser.
///
/// ## Error Handling
///
/// The parser recovers at property and prim boundaries and keeps going.
/// Errors are collected in `parsed.errors`; use [`Parsed::into_result`]
/// to treat any error as fatal.
///
/// ```rust
/// let parsed = usda_parser::parse("#usda 1.0\ndef Cube \"Box\" { double = }");
/// assert!(!parsed.is_ok());
/// assert_eq!(parsed.layer.prims.len(), 1);
/// ```
pub fn parse(source: &str) -> Parsed {
    let tokens = lexer::Lexer::new(source).tokenize();
    parser::Parser::new(tokens).parse()
}

// =============================================================================
// TESTS
// =============================================================================
