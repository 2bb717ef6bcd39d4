//! # Character Cursor
//!
//! Walks USDA source one `char` at a time, keeping the byte offset, line
//! and column of the next unread character.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::lexer::Cursor;
//!
//! let mut cursor = Cursor::new("over");
//! assert_eq!(cursor.advance(), Some('o'));
//! assert_eq!(cursor.peek(), Some('v'));
//! ```

use crate::span::Position;

// =============================================================================
// CURSOR
// =============================================================================

/// Read head over a source string.
///
/// Lines and columns count from zero; [`Position`] adds one when displayed.
pub struct Cursor<'a> {
    /// Source text.
    source: &'a str,
    /// Current byte offset.
    byte: usize,
    /// Line of the next character.
    line: usize,
    /// Column of the next character, in chars.
    column: usize,
}

impl<'a> Cursor<'a> {
    /// Start at the first character of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            byte: 0,
            line: 0,
            column: 0,
        }
    }

    /// Where the next character sits.
    pub fn position(&self) -> Position {
        Position::new(self.byte, self.line, self.column)
    }

    /// True once every character has been consumed.
    pub fn is_eof(&self) -> bool {
        self.rest().is_empty()
    }

    /// Remaining, unconsumed source text.
    pub fn rest(&self) -> &'a str {
        &self.source[self.byte..]
    }

    /// Next character, left unconsumed.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character after [`peek`](Self::peek).
    pub fn peek_next(&self) -> Option<char> {
        self.peek_nth(1)
    }

    /// Peek `n` characters ahead (`peek_nth(0)` is `peek()`).
    ///
    /// ## Example
    ///
    /// ```rust
    /// use usda_parser::lexer::Cursor;
    ///
    /// let cursor = Cursor::new("1e-3");
    /// assert_eq!(cursor.peek_nth(2), Some('-'));
    /// assert_eq!(cursor.peek_nth(4), None);
    /// ```
    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Check whether the unconsumed text starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consume one character. `None` at end of input.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;

        self.byte += c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            _ => self.column += 1,
        }

        Some(c)
    }

    /// Advance over `count` characters.
    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Consume characters as long as `predicate` accepts them.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use usda_parser::lexer::Cursor;
    ///
    /// let mut cursor = Cursor::new("xformOp:translate = (1, 2, 3)");
    /// cursor.advance_while(|c| c.is_alphanumeric() || c == ':');
    /// assert_eq!(cursor.peek(), Some(' '));
    /// ```
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Source text between a previous position and the cursor.
    pub fn slice_from(&self, start: Position) -> &'a str {
        &self.source[start.byte..self.byte]
    }
}

// =============================================================================
// TESTS
// =============================================================================
