//! # Source Span
//!
//! Positions and ranges in USDA source text, used by tokens, layer specs and
//! parse errors.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::span::{Position, Span};
//!
//! let span = Span::new(Position::new(0, 0, 0), Position::new(3, 0, 3));
//! assert_eq!(span.len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// POSITION
// =============================================================================

/// A point in the source text.
///
/// `line` and `column` are 0-indexed; `column` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset from the start of the source.
    pub byte: usize,
    /// Line number (0-indexed).
    pub line: usize,
    /// Column number (0-indexed).
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub const fn new(byte: usize, line: usize, column: usize) -> Self {
        Self { byte, line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

// =============================================================================
// SPAN
// =============================================================================

/// A half-open range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive).
    pub start: Position,
    /// End position (exclusive).
    pub end: Position,
}

impl Span {
    /// Create a span between two positions.
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from byte offsets only (line/column left at 0).
    ///
    /// ## Example
    ///
    /// ```rust
    /// use usda_parser::span::Span;
    ///
    /// let span = Span::from_bytes(5, 9);
    /// assert_eq!(span.len(), 4);
    /// ```
    pub const fn from_bytes(start: usize, end: usize) -> Self {
        Self {
            start: Position::new(start, 0, 0),
            end: Position::new(end, 0, 0),
        }
    }

    /// Empty span at the origin.
    pub const fn zero() -> Self {
        Self::from_bytes(0, 0)
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.end.byte.saturating_sub(self.start.byte)
    }

    /// True if the span covers no bytes.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let start = if self.start.byte <= other.start.byte { self.start } else { other.start };
        let end = if self.end.byte >= other.end.byte { self.end } else { other.end };
        Span::new(start, end)
    }
}

// =============================================================================
// SPANNED
// =============================================================================

/// Anything that knows where it came from in the source.
pub trait Spanned {
    /// Source span of this item.
    fn span(&self) -> Span;
}

// =============================================================================
// TESTS
// =============================================================================
