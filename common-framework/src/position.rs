use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::source::Source;

/// An immutable cursor into a [`Source`].
///
/// `offset` counts characters from the start of the input. `line` and
/// `column` are always derived from the characters between two positions,
/// never tracked on their own, so two positions with the same offset compare
/// equal no matter how they were reached.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Character offset from the start of the input
    pub offset: usize,
}

impl Position {
    /// Creates a new position at the start of the input.
    pub fn new() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Creates a position with the given values.
    pub fn at(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Returns the position reached after consuming `n` characters of
    /// `source` starting at this position.
    ///
    /// Callers must only advance over characters the source actually holds;
    /// every content combinator checks bounds before it advances.
    #[must_use]
    pub fn advance<S: Source + ?Sized>(&self, source: &S, n: usize) -> Position {
        let mut line = self.line;
        let mut column = self.column;
        for offset in self.offset..self.offset + n {
            match source.char_at(offset) {
                Some('\n') => {
                    line += 1;
                    column = 1;
                }
                Some(_) => column += 1,
                None => {
                    debug_assert!(false, "advanced past end of source at offset {offset}");
                    break;
                }
            }
        }
        Position {
            line,
            column,
            offset: self.offset + n,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
