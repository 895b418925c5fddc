use std::sync::Arc;

/// An indexable, length-queryable character sequence.
///
/// Offsets count characters. Implementations may grow on demand: asking for a
/// character beyond what is buffered is allowed to fetch more input, which is
/// why every query goes through [`Source::char_at`] rather than a slice.
pub trait Source {
    /// Returns the character at `offset`, or `None` at end of input.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Returns the already-buffered characters in `start..end`.
    ///
    /// Both offsets must have been reached through [`Source::char_at`].
    fn slice(&self, start: usize, end: usize) -> String;

    /// Number of characters buffered so far.
    fn buffered_len(&self) -> usize;

    /// Returns `true` if a character exists at `offset`.
    fn has(&self, offset: usize) -> bool {
        self.char_at(offset).is_some()
    }

    /// Returns `true` if `offset` is exactly the end of the input.
    fn is_end(&self, offset: usize) -> bool {
        !self.has(offset)
    }

    /// Returns `true` if the input holds `pattern` starting at `offset`.
    ///
    /// Stops at the first mismatching character, so a growable source never
    /// fetches more than it needs to decide.
    fn starts_with(&self, offset: usize, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, expected)| self.char_at(offset + i) == Some(expected))
    }
}

/// A fixed, fully in-memory source.
#[derive(Clone, Debug)]
pub struct StrSource {
    text: Arc<str>,
    chars: Vec<char>,
}

impl StrSource {
    /// Creates a source over the given text.
    pub fn new<S: Into<String>>(text: S) -> Self {
        let owned = text.into();
        let chars = owned.chars().collect();
        Self {
            text: Arc::from(owned),
            chars,
        }
    }

    /// Returns the full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the shared text buffer.
    pub fn buffer(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// Returns the length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if the source is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Source for StrSource {
    fn char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    fn buffered_len(&self) -> usize {
        self.chars.len()
    }
}

impl From<&str> for StrSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StrSource {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
