//! Grammar Example
//!
//! Grammars built on the combinator framework: a JSON reader, an
//! indentation outline and the croco statement language, plus a small REPL
//! driver that feeds any of them line by line.

pub mod croco;
pub mod json;
pub mod outline;
pub mod repl;
