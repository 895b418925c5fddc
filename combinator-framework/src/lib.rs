//! Combinator Framework
//!
//! A backtracking parser-combinator engine. Grammars are built from small
//! combinators composed with `+` (sequence), `|` (ordered choice) and fluent
//! modifiers, bound by name in a [`Grammar`], and run against any [`Source`].
//!
//! Every parse call threads an immutable [`Namespace`] through the grammar.
//! Rules find each other through it, and grammar parameters such as the
//! current indentation depth live in it, so context-sensitive rules can be
//! written without side state.
//!
//! # Example
//!
//! ```
//! use combinator_framework::{one_of, var, Grammar, Value};
//!
//! let grammar = Grammar::builder()
//!     .rule("NUMBER", one_of("0123456789").at_least(1))
//!     .rule("start", var("NUMBER").join(",").map(|items| {
//!         Value::Int(items.into_list().len() as i64)
//!     }))
//!     .build()
//!     .unwrap();
//! assert_eq!(grammar.parse("1,22,333").unwrap(), Value::Int(3));
//! ```

pub mod builder;
pub mod combinator;
pub mod error;
pub mod grammar;
#[cfg(feature = "interactive")]
pub mod interactive;
pub mod namespace;
pub mod param;
pub mod template;
pub mod value;

pub use builder::{any_char, choice, end, lit, lit_param, none_of, one_of, reference, seq, var};
pub use combinator::{Combinator, Factory, ParseResult, Success};
pub use error::{Error, GrammarError, SyntaxError, SyntaxErrorKind};
pub use grammar::{Grammar, GrammarBuilder, Run, DEFAULT_START};
#[cfg(feature = "interactive")]
pub use interactive::{InteractiveSource, PromptConfig, Transcript};
pub use namespace::{Binding, Namespace};
pub use param::{Param, Var};
pub use template::Template;
pub use value::{Node, Value};

pub use common_framework::{InputChunk, InputProducer, Position, PromptState, Source, StrSource, Token};
