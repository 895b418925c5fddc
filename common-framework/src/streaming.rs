/// One reply from an interactive input producer.
///
/// Modelled on a message protocol: the source asks for more input with a
/// [`PromptState`] and the producer answers with either a chunk of text or a
/// permanent end-of-input marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputChunk {
    /// More characters, appended to the source buffer.
    Data(String),
    /// No more input will ever arrive.
    End,
}

/// Which prompt an interactive producer should show for the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// The first request of a statement.
    Primary,
    /// Any later request while the same statement is still being read.
    Continuation,
}

/// Implemented by anything that can supply input on demand.
///
/// Calls are blocking: the source waits for the reply before parsing resumes.
pub trait InputProducer {
    fn request(&mut self, prompt: PromptState) -> InputChunk;
}

impl<F> InputProducer for F
where
    F: FnMut(PromptState) -> InputChunk,
{
    fn request(&mut self, prompt: PromptState) -> InputChunk {
        self(prompt)
    }
}
