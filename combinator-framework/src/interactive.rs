//! A [`Source`] that pulls its input on demand from an [`InputProducer`].
//!
//! Parsing reads the buffer through `char_at` like any other source. A read
//! past the buffered region asks the producer for more, prompting with
//! [`PromptState::Primary`] the first time and [`PromptState::Continuation`]
//! after that. The buffer only ever grows, so backtracking over fetched input
//! never triggers a second request for it.

use std::cell::{Cell, RefCell};

use common_framework::{InputChunk, InputProducer, PromptState, Source};
use tracing::debug;

use crate::error::Error;
use crate::grammar::Grammar;
use crate::value::Value;

/// Prompt strings shown by interactive front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    pub primary: String,
    pub continuation: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            primary: ">>> ".to_string(),
            continuation: "... ".to_string(),
        }
    }
}

impl PromptConfig {
    pub fn prompt(&self, state: PromptState) -> &str {
        match state {
            PromptState::Primary => &self.primary,
            PromptState::Continuation => &self.continuation,
        }
    }
}

pub struct InteractiveSource<P: InputProducer> {
    producer: RefCell<P>,
    buffer: RefCell<Vec<char>>,
    finished: Cell<bool>,
    requests: Cell<usize>,
}

impl<P: InputProducer> InteractiveSource<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer: RefCell::new(producer),
            buffer: RefCell::new(Vec::new()),
            finished: Cell::new(false),
            requests: Cell::new(0),
        }
    }

    /// Everything received so far.
    pub fn buffered_text(&self) -> String {
        self.buffer.borrow().iter().collect()
    }

    /// A copy of the received input, for rendering diagnostics.
    pub fn source_code(&self) -> String {
        self.buffered_text()
    }

    /// How many times the producer has been asked for input.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Returns `true` once the producer has signalled the end of input.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn into_producer(self) -> P {
        self.producer.into_inner()
    }

    /// Requests chunks until `offset` is buffered or the input ends.
    fn fill_to(&self, offset: usize) {
        while !self.finished.get() && self.buffer.borrow().len() <= offset {
            let prompt = if self.requests.get() == 0 {
                PromptState::Primary
            } else {
                PromptState::Continuation
            };
            self.requests.set(self.requests.get() + 1);
            let chunk = self.producer.borrow_mut().request(prompt);
            match chunk {
                InputChunk::Data(text) if !text.is_empty() => {
                    debug!(?prompt, chars = text.chars().count(), "input received");
                    self.buffer.borrow_mut().extend(text.chars());
                }
                // An empty chunk means the same as an explicit end.
                InputChunk::Data(_) | InputChunk::End => {
                    debug!(?prompt, buffered = self.buffer.borrow().len(), "input finished");
                    self.finished.set(true);
                }
            }
        }
    }
}

impl<P: InputProducer> Source for InteractiveSource<P> {
    fn char_at(&self, offset: usize) -> Option<char> {
        self.fill_to(offset);
        self.buffer.borrow().get(offset).copied()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let buffer = self.buffer.borrow();
        let end = end.min(buffer.len());
        buffer[start.min(end)..end].iter().collect()
    }

    fn buffered_len(&self) -> usize {
        self.buffer.borrow().len()
    }
}

/// The outcome of one interactive parse, with the input it consumed.
pub struct Transcript<P> {
    pub result: Result<Value, Error>,
    /// The text received while parsing, for rendering diagnostics.
    pub input: String,
    pub requests: usize,
    /// The producer, handed back so the next statement can reuse it.
    pub producer: P,
}

impl Grammar {
    /// Parses one complete input pulled from `producer`.
    ///
    /// A successful parse must also reach the end of the input, so after the
    /// last complete statement the producer is asked for one more chunk. An
    /// interactive front end therefore ends each input with an empty line (or
    /// end of input); a non-empty chunk at that point is trailing input and
    /// fails the parse.
    pub fn parse_interactive<P: InputProducer>(&self, producer: P) -> Transcript<P> {
        let source = InteractiveSource::new(producer);
        let result = self.parse_source(&source);
        Transcript {
            result,
            input: source.source_code(),
            requests: source.requests(),
            producer: source.into_producer(),
        }
    }
}
