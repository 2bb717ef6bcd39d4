//! # USDA Lexer
//!
//! Tokenizes USD text layers into tokens.
//!
//! ## Example
//!
//! ```rust
//! use usda_parser::lexer::{Lexer, TokenKind};
//!
//! let tokens = Lexer::new("#usda 1.0\ndef Cube \"Box\" {}").tokenize();
//! assert_eq!(tokens[0].kind, TokenKind::Header);
//! assert_eq!(tokens[1].kind, TokenKind::Def);
//! ```

mod cursor;
mod token;

pub use cursor::Cursor;
pub use token::{Token, TokenKind};

use crate::span::{Position, Span};
use config::constants::USDA_HEADER;

// =============================================================================
// LEXER
// =============================================================================

/// USDA lexer.
///
/// Converts source text into a stream of tokens. Lexical problems
/// (unterminated strings, paths or asset paths, stray characters) become
/// [`TokenKind::Error`] tokens whose text is the offending source slice; the
/// parser turns them into diagnostics.
pub struct Lexer<'a> {
    /// Character cursor.
    cursor: Cursor<'a>,
    /// Collected tokens.
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Lexer positioned at the start of `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    /// Split the whole source into tokens, ending with `Eof`.
    ///
    /// ## Returns
    ///
    /// Vector of tokens ending with an EOF token. A `#usda` first line is
    /// emitted as a [`TokenKind::Header`] token instead of being skipped as a
    /// comment.
    pub fn tokenize(mut self) -> Vec<Token> {
        if self.cursor.starts_with(USDA_HEADER) {
            self.scan_header();
        }

        while !self.cursor.is_eof() {
            self.skip_whitespace_and_comments();
            if self.cursor.is_eof() {
                break;
            }
            self.scan_token();
        }

        let eof_pos = self.cursor.position();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(eof_pos, eof_pos),
            String::new(),
        ));

        self.tokens
    }

    /// Push a token spanning from `start` to the cursor.
    fn push(&mut self, kind: TokenKind, start: Position, text: String) {
        let end = self.cursor.position();
        self.tokens.push(Token::new(kind, Span::new(start, end), text));
    }

    /// Push a token whose text is the raw source slice.
    fn push_raw(&mut self, kind: TokenKind, start: Position) {
        let text = self.cursor.slice_from(start).to_string();
        self.push(kind, start, text);
    }

    /// Scan the `#usda 1.0` header line.
    fn scan_header(&mut self) {
        let start = self.cursor.position();
        self.cursor.advance_while(|c| c != '\n');
        let text = self.cursor.slice_from(start).trim_end().to_string();
        self.push(TokenKind::Header, start, text);
    }

    /// Skip whitespace and `#` line comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.cursor.advance_while(char::is_whitespace);

            if self.cursor.peek() == Some('#') {
                self.cursor.advance_while(|c| c != '\n');
                continue;
            }

            break;
        }
    }

    /// Scan a single token.
    fn scan_token(&mut self) {
        let start = self.cursor.position();
        let c = match self.cursor.peek() {
            Some(c) => c,
            None => return,
        };

        match c {
            '"' | '\'' => return self.scan_string(start, c),
            '<' => return self.scan_delimited(start, '>', TokenKind::Path),
            '@' => return self.scan_asset_path(start),
            '0'..='9' => return self.scan_number(start),
            '-' | '+' | '.' if self.starts_number_after_sign() => return self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' => return self.scan_identifier(start),
            _ => {}
        }

        self.cursor.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '=' => TokenKind::Eq,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            _ => TokenKind::Error,
        };
        self.push_raw(kind, start);
    }

    /// Check whether a sign or dot at the cursor begins a number (`-1`, `.5`, `-inf`).
    fn starts_number_after_sign(&self) -> bool {
        match (self.cursor.peek(), self.cursor.peek_next()) {
            (Some('.'), Some(d)) => d.is_ascii_digit(),
            (Some('-') | Some('+'), Some(d)) => d.is_ascii_digit() || d == '.' || d == 'i',
            _ => false,
        }
    }

    /// Scan a string literal in single, double, or triple quotes.
    fn scan_string(&mut self, start: Position, quote: char) {
        let triple: String = std::iter::repeat(quote).take(3).collect();
        let is_triple = self.cursor.starts_with(&triple);
        self.cursor.advance_by(if is_triple { 3 } else { 1 });

        let mut content = String::new();
        loop {
            if is_triple && self.cursor.starts_with(&triple) {
                self.cursor.advance_by(3);
                return self.push(TokenKind::String, start, content);
            }

            match self.cursor.peek() {
                None => break,
                Some('\n') if !is_triple => break,
                Some(c) if c == quote && !is_triple => {
                    self.cursor.advance();
                    return self.push(TokenKind::String, start, content);
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('n') => content.push('\n'),
                        Some('t') => content.push('\t'),
                        Some('r') => content.push('\r'),
                        Some(other) => content.push(other),
                        None => break,
                    }
                }
                Some(c) => {
                    content.push(c);
                    self.cursor.advance();
                }
            }
        }

        self.push_raw(TokenKind::Error, start);
    }

    /// Scan a single-line token delimited by its first character and `close`.
    fn scan_delimited(&mut self, start: Position, close: char, kind: TokenKind) {
        self.cursor.advance();
        let content_start = self.cursor.position();
        self.cursor.advance_while(|c| c != close && c != '\n');

        if self.cursor.peek() == Some(close) {
            let content = self.cursor.slice_from(content_start).to_string();
            self.cursor.advance();
            self.push(kind, start, content);
        } else {
            self.push_raw(TokenKind::Error, start);
        }
    }

    /// Scan an asset path: `@path@` or `@@@path@@@`.
    fn scan_asset_path(&mut self, start: Position) {
        if !self.cursor.starts_with("@@@") {
            return self.scan_delimited(start, '@', TokenKind::AssetPath);
        }

        self.cursor.advance_by(3);
        let content_start = self.cursor.position();
        while !self.cursor.is_eof() && !self.cursor.starts_with("@@@") {
            self.cursor.advance();
        }

        if self.cursor.is_eof() {
            self.push_raw(TokenKind::Error, start);
        } else {
            let content = self.cursor.slice_from(content_start).to_string();
            self.cursor.advance_by(3);
            self.push(TokenKind::AssetPath, start, content);
        }
    }

    /// Scan a number literal, including signed `inf`.
    fn scan_number(&mut self, start: Position) {
        if matches!(self.cursor.peek(), Some('-') | Some('+')) {
            self.cursor.advance();
            if self.cursor.starts_with("inf") {
                self.cursor.advance_by(3);
                return self.push_raw(TokenKind::Number, start);
            }
        }

        let mut has_dot = false;
        let mut has_exponent = false;

        while let Some(c) = self.cursor.peek() {
            match c {
                '0'..='9' => {
                    self.cursor.advance();
                }
                '.' if !has_dot && !has_exponent => {
                    has_dot = true;
                    self.cursor.advance();
                }
                'e' | 'E' if !has_exponent => {
                    has_exponent = true;
                    self.cursor.advance();
                    if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }

        self.push_raw(TokenKind::Number, start);
    }

    /// Identifier or keyword.
    ///
    /// Namespaced names (`xformOp:rotateXYZ`) are one identifier; a colon is
    /// only absorbed when an identifier character follows it.
    fn scan_identifier(&mut self, start: Position) {
        loop {
            self.cursor.advance_while(|c| c.is_alphanumeric() || c == '_');
            let continues_namespace = self.cursor.peek() == Some(':')
                && self
                    .cursor
                    .peek_next()
                    .map_or(false, |c| c.is_alphabetic() || c == '_');
            if !continues_namespace {
                break;
            }
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(start);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.push_raw(kind, start);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_header_and_prim() {
        let tokens = Lexer::new("#usda 1.0\ndef Xform \"World\" {}").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Header);
        assert_eq!(tokens[0].text, "#usda 1.0");
        assert_eq!(tokens[1].kind, TokenKind::Def);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].text, "Xform");
        assert_eq!(tokens[3].kind, TokenKind::String);
        assert_eq!(tokens[3].text, "World");
        assert_eq!(tokens[4].kind, TokenKind::LBrace);
        assert_eq!(tokens[5].kind, TokenKind::RBrace);
        assert_eq!(tokens[6].kind, TokenKind::Eof);
    }

    #[test]
    fn test_comments_are_skipped() {
        let tokens = Lexer::new("#usda 1.0\n# a comment\ndef").tokenize();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Def);
    }

    #[test]
    fn test_hash_without_header_is_comment() {
        assert_eq!(kinds("# not a header\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_namespaced_identifier() {
        let tokens = Lexer::new("xformOp:translate.timeSamples").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "xformOp:translate");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].text, "timeSamples");
    }

    #[test]
    fn test_colon_before_number_is_separate() {
        assert_eq!(
            kinds("1: (0, 0, 0)")[..3],
            [TokenKind::Number, TokenKind::Colon, TokenKind::LParen]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("10 -0.5 .25 1e-3 -inf +2").tokenize();
        let texts: Vec<&str> = tokens[..6].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["10", "-0.5", ".25", "1e-3", "-inf", "+2"]);
        assert!(tokens[..6].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_strings() {
        let tokens = Lexer::new(r#""a\"b" 'single' """multi
line""""#).tokenize();
        assert_eq!(tokens[0].text, "a\"b");
        assert_eq!(tokens[1].text, "single");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "multi\nline");
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let tokens = Lexer::new("\"open\n").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].text, "\"open");
    }

    #[test]
    fn test_paths_and_asset_paths() {
        let tokens = Lexer::new("</World/Cube> @./tex.png@ @@@weird@name@@@").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Path);
        assert_eq!(tokens[0].text, "/World/Cube");
        assert_eq!(tokens[1].kind, TokenKind::AssetPath);
        assert_eq!(tokens[1].text, "./tex.png");
        assert_eq!(tokens[2].kind, TokenKind::AssetPath);
        assert_eq!(tokens[2].text, "weird@name");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("def over class uniform custom rel None prepend")[..8],
            [
                TokenKind::Def,
                TokenKind::Over,
                TokenKind::Class,
                TokenKind::Uniform,
                TokenKind::Custom,
                TokenKind::Rel,
                TokenKind::None,
                TokenKind::Prepend,
            ]
        );
    }

    #[test]
    fn test_punctuation_and_stray_character() {
        assert_eq!(
            kinds("( ) [ ] { } = , ; $"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eq,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Error,
                TokenKind::Eof,
            ]
        );
    }
}
