use std::ops::Deref;

use serde::Serialize;

use crate::position::Position;
use crate::source::Source;

/// A captured slice of source text with its start and end positions.
///
/// Tokens are produced only by elementary matches. They deref to `str`, so
/// they can be compared and printed like the text they hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    text: String,
    start: Position,
    end: Position,
}

impl Token {
    /// Creates a token from already-computed parts.
    pub fn new<S: Into<String>>(text: S, start: Position, end: Position) -> Self {
        debug_assert!(start <= end);
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Captures `len` characters of `source` starting at `start`.
    pub fn capture<S: Source + ?Sized>(source: &S, start: Position, len: usize) -> Self {
        let end = start.advance(source, len);
        let text = source.slice(start.offset, end.offset);
        Self { text, start, end }
    }

    /// A zero-width token at `at`.
    pub fn empty(at: Position) -> Self {
        Self {
            text: String::new(),
            start: at,
            end: at,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn start_line(&self) -> usize {
        self.start.line
    }

    pub fn start_column(&self) -> usize {
        self.start.column
    }

    pub fn end_line(&self) -> usize {
        self.end.line
    }

    pub fn end_column(&self) -> usize {
        self.end.column
    }

    pub fn offset(&self) -> usize {
        self.start.offset
    }

    pub fn end_offset(&self) -> usize {
        self.end.offset
    }

    /// Returns the length in characters.
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    /// Returns `true` if the token is zero-width.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the token and returns its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Deref for Token {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.text
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl PartialEq<Token> for &str {
    fn eq(&self, other: &Token) -> bool {
        *self == other.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StrSource;

    #[test]
    fn test_capture_single_line() {
        let source = StrSource::new("abcde");
        let token = Token::capture(&source, Position::new(), 3);
        assert_eq!(token, "abc");
        assert_eq!(token.offset(), 0);
        assert_eq!(token.end_offset(), 3);
        assert_eq!(token.start_column(), 1);
        assert_eq!(token.end_column(), 4);
        assert_eq!(token.len(), 3);
    }

    #[test]
    fn test_capture_spanning_lines() {
        let source = StrSource::new("x\nyz\nw");
        let start = Position::new().advance(&source, 1);
        let token = Token::capture(&source, start, 4);
        assert_eq!(token.text(), "\nyz\n");
        assert_eq!(token.start_line(), 1);
        assert_eq!(token.end_line(), 3);
        assert_eq!(token.end_column(), 1);
    }

    #[test]
    fn test_empty_token() {
        let token = Token::empty(Position::at(2, 5, 9));
        assert!(token.is_empty());
        assert_eq!(token.start(), token.end());
        assert_eq!(token.to_string(), "");
    }
}
