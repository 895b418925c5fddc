//! Error types for the combinator engine.
//!
//! Soft failures are never errors: they are `Ok(None)` results. What lives
//! here is the hard tier. [`SyntaxError`] is a positioned diagnostic about the
//! input; [`GrammarError`] reports a bug in how a grammar was put together.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use common_framework::{Position, Source};
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Any failure that aborts a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),
}

impl Error {
    /// Returns the syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(err) => Some(err),
            Error::Grammar(_) => None,
        }
    }
}

/// Why a [`SyntaxError`] was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A mandatory match failed.
    Expected,
    /// The start rule stopped before the end of the input.
    Unconsumed,
    /// The input ended where the start rule needed more.
    UnexpectedEnd,
}

/// A hard, positioned parse failure.
///
/// `Display` is exactly the message, so templated messages reach the user
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic()]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Character offset into the source
    pub offset: usize,
    /// Byte span of the offending character, for rendering with miette.
    #[label("here")]
    pub span: SourceSpan,
}

impl SyntaxError {
    /// Builds a diagnostic at `position`.
    pub fn new(
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        position: Position,
        source: &dyn Source,
    ) -> Self {
        let byte_start = source.slice(0, position.offset).len();
        let width = source.char_at(position.offset).map_or(0, char::len_utf8);
        Self {
            kind,
            message: message.into(),
            line: position.line,
            column: position.column,
            offset: position.offset,
            span: SourceSpan::new(byte_start.into(), width),
        }
    }

    /// A failed mandatory match.
    pub fn expected(message: impl Into<String>, position: Position, source: &dyn Source) -> Self {
        Self::new(SyntaxErrorKind::Expected, message, position, source)
    }

    /// Input left over at `position` after the start rule finished (or
    /// failed to match at all).
    pub fn unconsumed(position: Position, source: &dyn Source) -> Self {
        match source.char_at(position.offset) {
            Some(found) => Self::new(
                SyntaxErrorKind::Unconsumed,
                format!(
                    "unexpected character {found:?} at line {}, column {}",
                    position.line, position.column
                ),
                position,
                source,
            ),
            None => Self::new(
                SyntaxErrorKind::UnexpectedEnd,
                format!(
                    "unexpected end of input at line {}, column {}",
                    position.line, position.column
                ),
                position,
                source,
            ),
        }
    }

    /// Renders the message with the offending line and a caret under the
    /// column.
    pub fn render(&self, text: &str) -> String {
        let mut out = format!("error: {}\n --> {}:{}\n", self.message, self.line, self.column);
        if let Some(line) = text.lines().nth(self.line.saturating_sub(1)) {
            let gutter = self.line.to_string();
            let pad = " ".repeat(gutter.len());
            let caret: String = line
                .chars()
                .take(self.column.saturating_sub(1))
                .map(|ch| if ch == '\t' { '\t' } else { ' ' })
                .collect();
            out.push_str(&format!("{pad} |\n{gutter} | {line}\n{pad} | {caret}^\n"));
        }
        out
    }
}

/// A grammar construction bug, raised as soon as it is hit.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GrammarError {
    #[error("undefined name '{name}'")]
    UndefinedName { name: String },

    #[error("'{name}' is bound to a {found}, which cannot be parsed")]
    NotParsable { name: String, found: &'static str },

    #[error("{what} must be text, found {found}")]
    NotText { what: String, found: &'static str },

    #[error("'{name}' names a rule where a value was expected")]
    NotAValue { name: String },

    #[error("repeat bound must be a non-negative integer, found {found}")]
    InvalidBound { found: String },

    #[error("repeat minimum {min} exceeds maximum {max}")]
    EmptyRange { min: usize, max: usize },

    #[error("cannot apply '{op}' to {left} and {right}")]
    InvalidOperand {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("projection index {index} is out of range for a sequence of {len}")]
    InvalidProjection { index: usize, len: usize },

    #[error("no rule named '{name}'")]
    UnknownRule { name: String },
}
