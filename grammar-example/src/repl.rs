//! A line-oriented read-eval-print loop over any grammar.
//!
//! Each statement is parsed from lines read on demand: the primary prompt is
//! shown for its first line and the continuation prompt for every line after
//! that. An empty line ends a statement the grammar still wants more of.

use std::io::{self, BufRead, Write};

use combinator_framework::{Grammar, InputChunk, InputProducer, PromptConfig, PromptState, Value};
use tracing::{debug, warn};

/// Reads lines from `input`, writing the matching prompt to `output` before
/// each one.
pub struct LineProducer<R, W> {
    input: R,
    output: W,
    prompts: PromptConfig,
    eof: bool,
}

impl<R: BufRead, W: Write> LineProducer<R, W> {
    pub fn new(input: R, output: W, prompts: PromptConfig) -> Self {
        Self {
            input,
            output,
            prompts,
            eof: false,
        }
    }

    /// Whether the underlying input is exhausted.
    pub fn at_eof(&self) -> bool {
        self.eof
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> InputProducer for LineProducer<R, W> {
    fn request(&mut self, state: PromptState) -> InputChunk {
        if self.eof {
            return InputChunk::End;
        }
        let prompt = self.prompts.prompt(state);
        if let Err(err) = write!(self.output, "{prompt}").and_then(|()| self.output.flush()) {
            warn!(error = %err, "failed to write prompt");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                self.eof = true;
                InputChunk::End
            }
            Ok(_) if line.trim().is_empty() => InputChunk::End,
            Ok(_) => {
                if !line.ends_with('\n') {
                    line.push('\n');
                }
                InputChunk::Data(line)
            }
            Err(err) => {
                warn!(error = %err, "failed to read input");
                self.eof = true;
                InputChunk::End
            }
        }
    }
}

/// Runs the loop until `input` is exhausted, printing each parsed statement
/// with `render` and each error as a diagnostic. Returns the output stream.
pub fn run<R, W, F>(
    grammar: &Grammar,
    input: R,
    output: W,
    prompts: PromptConfig,
    render: F,
) -> io::Result<W>
where
    R: BufRead,
    W: Write,
    F: Fn(&Value) -> String,
{
    let mut producer = LineProducer::new(input, output, prompts);
    loop {
        let transcript = grammar.parse_interactive(producer);
        producer = transcript.producer;
        if transcript.input.trim().is_empty() {
            if producer.at_eof() {
                break;
            }
            continue;
        }

        let out = producer.output();
        match transcript.result {
            Ok(value) => writeln!(out, "{}", render(&value))?,
            Err(err) => {
                debug!(requests = transcript.requests, "statement rejected");
                match err.as_syntax() {
                    Some(syntax) => write!(out, "{}", syntax.render(&transcript.input))?,
                    None => writeln!(out, "error: {err}")?,
                }
            }
        }
        if producer.at_eof() {
            break;
        }
    }
    let mut output = producer.into_output();
    writeln!(output)?;
    Ok(output)
}
