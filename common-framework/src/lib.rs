//! Common Framework
//!
//! Leaf primitives shared by the combinator engine and the grammars built on
//! it: source positions, captured tokens, the character source abstraction and
//! the input protocol used by interactive sources.

pub mod position;
pub mod source;
pub mod streaming;
pub mod token;

pub use position::Position;
pub use source::{Source, StrSource};
pub use streaming::{InputChunk, InputProducer, PromptState};
pub use token::Token;
